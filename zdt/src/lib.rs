//! Continuous probing of targets while a disruptive operation runs.
//!
//! The engine verifies that an operation, typically the upgrade of a service mesh, does not
//! interrupt traffic. For every target a [`tester::Tester`] runs a pool of workers, each calling
//! a caller-supplied [`probe::Probe`] in a loop. A worker stops at the first failure, since that
//! failure is the downtime being looked for. The [`runner::Runner`] groups the testers of one
//! check and turns their results into a single pass/fail report.
//!
//! ```no_run
//! use zdt::runner::Runner;
//! # use zdt::error::ZdtResult;
//! # use zdt::probe::ProbeFactory;
//! # use zdt_config::shared::ProbeConfig;
//! # async fn upgrade_mesh() {}
//! # async fn check<F: ProbeFactory>(factory: F) -> ZdtResult<()> {
//! let mut runner = Runner::new(ProbeConfig::default(), factory)?;
//! runner.start_probe("httpbin.local").await?;
//!
//! upgrade_mesh().await;
//!
//! runner.finish().await?;
//! # Ok(())
//! # }
//! ```

pub mod concurrency;
pub mod error;
mod macros;
pub mod metrics;
pub mod probe;
pub mod runner;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod tester;
pub mod workers;
