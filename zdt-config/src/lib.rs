//! Configuration management for zero-downtime checks.
//!
//! Provides environment detection, configuration loading from YAML files and
//! shared configuration types for the probe engine and the drivers that use it.

mod environment;
mod load;
pub mod shared;

pub use environment::*;
pub use load::*;
