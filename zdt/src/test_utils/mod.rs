//! Utilities for testing the probe engine.
//!
//! Provides a scriptable probe that can be told to fail or panic on a given call of a given
//! worker, and a factory handing such probes out per target.

pub mod factory;
pub mod probe;
