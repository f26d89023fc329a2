use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Worker pool size per target cannot be zero.
    #[error("`workers_per_target` cannot be zero")]
    WorkersPerTargetZero,
    /// Probe requests need a bounded transport timeout.
    #[error("`request_timeout_ms` cannot be zero")]
    RequestTimeoutZero,
    /// A target was configured without a host.
    #[error("Invalid target config: `host` cannot be empty")]
    EmptyTargetHost,
    /// Two targets share the same host, which would make tester names ambiguous.
    #[error("Invalid target config: host `{0}` is configured more than once")]
    DuplicateTargetHost(String),
}
