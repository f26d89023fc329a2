//! Cancellation primitives shared by the probe workers of a tester.

pub mod shutdown;
pub mod signal;
