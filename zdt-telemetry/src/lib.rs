//! Telemetry for zero-downtime checks.
//!
//! Sets up structured logging that writes pretty console output during development and JSON
//! into rotating files in production, with the run identifier attached to every entry.

mod logging;

pub use logging::*;
