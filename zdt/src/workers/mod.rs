//! Probe workers and the traits describing how workers are started and awaited.
//!
//! A worker runs in its own task, loops over its probe until it is asked to stop or the probe
//! fails, and hands back exactly one terminal result through its handle.

pub mod base;
pub mod probe;
