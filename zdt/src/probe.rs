//! The seam between the engine and the caller-supplied checks.
//!
//! The engine never builds requests or resolves addresses itself. It only drives a [`Probe`],
//! obtained for each target from a [`ProbeFactory`].

use std::future::Future;
use std::sync::Arc;

use zdt_config::shared::{ProbeConfig, TargetConfig};

use crate::error::ZdtResult;

tokio::task_local! {
    static CURRENT_WORKER: Arc<str>;
}

/// A single, idempotent check whose success or failure is sampled continuously.
///
/// The same probe instance is shared by every worker of a tester and may be invoked
/// concurrently, so implementations may only share state that is safe to use from many tasks,
/// like an HTTP client. Implementations are responsible for bounding the duration of a call,
/// since an in-flight probe is never interrupted.
pub trait Probe: Send + Sync + 'static {
    /// Performs one unit of work.
    fn probe(&self) -> impl Future<Output = ZdtResult<()>> + Send;
}

impl<F, Fut> Probe for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ZdtResult<()>> + Send,
{
    fn probe(&self) -> impl Future<Output = ZdtResult<()>> + Send {
        self()
    }
}

/// Builds the probe used for a target.
///
/// Implementations own everything the engine treats as external: resolving the address the
/// target's host is reachable at and composing the request for its path, applying the timeout
/// from [`ProbeConfig::request_timeout`] to the transport.
pub trait ProbeFactory {
    /// The probe produced for each target.
    type Probe: Probe;

    /// Creates a probe for `target`.
    fn create(
        &self,
        target: &TargetConfig,
        config: &ProbeConfig,
    ) -> impl Future<Output = ZdtResult<Self::Probe>> + Send;
}

/// Returns the name of the probe worker running the current task.
///
/// Probes can use it to correlate their own logs or requests with the worker results. Returns
/// [`None`] outside of a probe worker.
pub fn current_worker_name() -> Option<Arc<str>> {
    CURRENT_WORKER.try_with(|name| name.clone()).ok()
}

/// Runs `fut` with `name` exposed through [`current_worker_name`].
pub(crate) async fn with_worker_name<F>(name: Arc<str>, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT_WORKER.scope(name, fut).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ZdtError};
    use crate::zdt_error;

    #[tokio::test]
    async fn closures_are_probes() {
        let probe = || async { Ok::<(), ZdtError>(()) };
        assert!(probe.probe().await.is_ok());

        let failing = || async {
            Err::<(), ZdtError>(zdt_error!(ErrorKind::ProbeFailed, "Probe attempt failed"))
        };
        assert_eq!(
            failing.probe().await.unwrap_err().kind(),
            ErrorKind::ProbeFailed
        );
    }

    #[tokio::test]
    async fn worker_name_is_scoped() {
        assert!(current_worker_name().is_none());

        let name = with_worker_name(Arc::from("host-a-0"), async { current_worker_name() }).await;
        assert_eq!(name.as_deref(), Some("host-a-0"));

        assert!(current_worker_name().is_none());
    }
}
