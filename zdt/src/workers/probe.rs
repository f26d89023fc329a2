use futures::FutureExt;
use metrics::{counter, gauge};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, warn};

use crate::concurrency::shutdown::{ShutdownRx, shutdown_requested};
use crate::error::{ErrorKind, ZdtError};
use crate::metrics::{
    TESTER, ZDT_ACTIVE_PROBE_WORKERS, ZDT_PROBE_ATTEMPTS_TOTAL, ZDT_PROBE_FAILURES_TOTAL,
};
use crate::probe::{Probe, with_worker_name};
use crate::workers::base::{Worker, WorkerHandle};
use crate::zdt_error;

/// The terminal outcome of a single probe worker.
///
/// Exactly one [`TestResult`] is produced per started worker.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    /// Name of the worker, `<tester>-<index>`.
    pub worker_name: String,
    /// Number of probe invocations started by the worker, including the failing one.
    pub attempt_count: u64,
    /// The failure that stopped the worker, if any.
    pub error: Option<ZdtError>,
}

impl TestResult {
    /// Returns `true` when the worker stopped without observing a failure.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// State a probe worker accumulates while running.
///
/// The result is published when this value is dropped, so a worker delivers its result however
/// its task ends, including when the task is dropped before completing.
struct TerminalResult {
    worker_name: Arc<str>,
    tester_name: Arc<str>,
    attempt_count: u64,
    error: Option<ZdtError>,
    completed: bool,
    result_tx: Option<oneshot::Sender<TestResult>>,
}

impl TerminalResult {
    fn new(
        worker_name: Arc<str>,
        tester_name: Arc<str>,
        result_tx: oneshot::Sender<TestResult>,
    ) -> Self {
        Self {
            worker_name,
            tester_name,
            attempt_count: 0,
            error: None,
            completed: false,
            result_tx: Some(result_tx),
        }
    }

    fn record_attempt(&mut self) -> u64 {
        self.attempt_count += 1;
        counter!(ZDT_PROBE_ATTEMPTS_TOTAL, TESTER => self.tester_name.to_string()).increment(1);

        self.attempt_count
    }

    fn record_failure(&mut self, error: ZdtError) {
        counter!(ZDT_PROBE_FAILURES_TOTAL, TESTER => self.tester_name.to_string()).increment(1);
        self.error = Some(error);
    }

    fn complete(&mut self) {
        self.completed = true;
    }
}

impl Drop for TerminalResult {
    fn drop(&mut self) {
        if !self.completed && self.error.is_none() {
            self.error = Some(zdt_error!(
                ErrorKind::ProbeWorkerLost,
                "Probe worker stopped before completing",
                format!(
                    "worker {} of tester {} was dropped after {} attempts",
                    self.worker_name, self.tester_name, self.attempt_count
                )
            ));
        }

        gauge!(ZDT_ACTIVE_PROBE_WORKERS).decrement(1.0);

        if let Some(result_tx) = self.result_tx.take() {
            let result = TestResult {
                worker_name: self.worker_name.to_string(),
                attempt_count: self.attempt_count,
                error: self.error.take(),
            };

            // The handle may already be gone, in which case nobody is interested in the result.
            let _ = result_tx.send(result);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}

/// Runs a [`Probe`] in a loop until shutdown is requested or the probe fails once.
///
/// A single failure is the signal being measured, so it is never retried.
#[derive(Debug)]
pub struct ProbeWorker<P> {
    name: Arc<str>,
    tester_name: Arc<str>,
    probe: Arc<P>,
    settle_delay: Duration,
    shutdown_rx: ShutdownRx,
}

impl<P> ProbeWorker<P> {
    pub fn new(
        name: String,
        tester_name: Arc<str>,
        probe: Arc<P>,
        settle_delay: Duration,
        shutdown_rx: ShutdownRx,
    ) -> Self {
        Self {
            name: Arc::from(name),
            tester_name,
            probe,
            settle_delay,
            shutdown_rx,
        }
    }
}

impl<P> ProbeWorker<P>
where
    P: Probe,
{
    async fn run(mut self, mut terminal: TerminalResult) {
        debug!("probe worker {} started", self.name);

        loop {
            if shutdown_requested(&self.shutdown_rx) {
                debug!("shutdown requested, stopping probe worker {}", self.name);
                break;
            }

            let attempt = terminal.record_attempt();

            // A panicking probe must not take the result of the worker down with it.
            match AssertUnwindSafe(self.probe.probe()).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(
                        "probe attempt {} of worker {} failed: {}",
                        attempt, self.name, err
                    );

                    terminal.record_failure(zdt_error!(
                        ErrorKind::ProbeFailed,
                        "Probe attempt failed",
                        format!(
                            "test {attempt} done by worker {} of tester {} failed with error: {err}",
                            self.name, self.tester_name
                        )
                    ));
                    break;
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(
                        "probe attempt {} of worker {} panicked: {}",
                        attempt, self.name, message
                    );

                    terminal.record_failure(zdt_error!(
                        ErrorKind::ProbeWorkerPanic,
                        "Probe panicked",
                        format!(
                            "test {attempt} done by worker {} of tester {} panicked: {message}",
                            self.name, self.tester_name
                        )
                    ));
                    break;
                }
            }

            if self.settle_delay.is_zero() {
                // Probes that complete without suspending would otherwise starve the runtime.
                tokio::task::yield_now().await;
                continue;
            }

            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    debug!("shutdown requested while settling, stopping probe worker {}", self.name);
                    break;
                }

                _ = tokio::time::sleep(self.settle_delay) => {}
            }
        }

        terminal.complete();

        debug!(
            "probe worker {} finished after {} attempts",
            self.name, terminal.attempt_count
        );
    }
}

impl<P> Worker<ProbeWorkerHandle> for ProbeWorker<P>
where
    P: Probe,
{
    fn start(self) -> ProbeWorkerHandle {
        let (result_tx, result_rx) = oneshot::channel();
        let terminal = TerminalResult::new(self.name.clone(), self.tester_name.clone(), result_tx);
        gauge!(ZDT_ACTIVE_PROBE_WORKERS).increment(1.0);

        let name = self.name.clone();
        let probe_worker_span = tracing::info_span!(
            "probe_worker",
            tester = %self.tester_name,
            worker = %self.name
        );
        let probe_worker = with_worker_name(name.clone(), self.run(terminal));
        let handle = tokio::spawn(probe_worker.instrument(probe_worker_span));

        ProbeWorkerHandle {
            name,
            handle,
            result_rx,
        }
    }
}

/// Handle to a running [`ProbeWorker`].
#[derive(Debug)]
pub struct ProbeWorkerHandle {
    name: Arc<str>,
    handle: JoinHandle<()>,
    result_rx: oneshot::Receiver<TestResult>,
}

impl WorkerHandle for ProbeWorkerHandle {
    type Output = TestResult;

    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    async fn wait(self) -> TestResult {
        let ProbeWorkerHandle {
            name,
            handle,
            mut result_rx,
        } = self;

        if let Err(err) = handle.await {
            error!("probe worker {} terminated abnormally: {}", name, err);
        }

        // The task has been joined, so the result is either there or will never be.
        match result_rx.try_recv() {
            Ok(result) => result,
            Err(_) => TestResult {
                worker_name: name.to_string(),
                attempt_count: 0,
                error: Some(zdt_error!(
                    ErrorKind::ProbeWorkerLost,
                    "Probe worker exited without publishing a result",
                    format!("worker {name} published no result")
                )),
            },
        }
    }
}
