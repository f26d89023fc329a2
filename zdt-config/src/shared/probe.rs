use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Probe engine configuration shared by every target of a run.
///
/// All values are construction-time parameters; changing them requires starting a new run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ProbeConfig {
    /// Number of concurrent workers probing each target.
    pub workers_per_target: usize,
    /// Pause, in milliseconds, taken by a worker after every successful probe.
    ///
    /// Zero makes workers probe back to back, so even an immediate stop may report several
    /// attempts per worker.
    pub settle_delay_ms: u64,
    /// Timeout, in milliseconds, the probe transport should apply to a single request.
    pub request_timeout_ms: u64,
}

impl ProbeConfig {
    /// Default number of workers per target.
    pub const DEFAULT_WORKERS_PER_TARGET: usize = 5;

    /// Default settle delay after a successful probe.
    pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

    /// Default timeout for a single probe request.
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

    /// Returns the settle delay as a [`Duration`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Returns the request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validates the [`ProbeConfig`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workers_per_target == 0 {
            return Err(ValidationError::WorkersPerTargetZero);
        }

        if self.request_timeout_ms == 0 {
            return Err(ValidationError::RequestTimeoutZero);
        }

        Ok(())
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            workers_per_target: Self::DEFAULT_WORKERS_PER_TARGET,
            settle_delay_ms: Self::DEFAULT_SETTLE_DELAY_MS,
            request_timeout_ms: Self::DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}
