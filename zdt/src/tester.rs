use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use zdt_config::shared::ProbeConfig;

use crate::concurrency::shutdown::{ShutdownTx, create_shutdown_channel};
use crate::metrics::register_metrics;
use crate::probe::Probe;
use crate::workers::base::{Worker, WorkerHandle};
use crate::workers::probe::{ProbeWorker, ProbeWorkerHandle, TestResult};

/// A pool of probe workers continuously checking one target.
///
/// Starting a [`Tester`] consumes it and returns a [`TesterHandle`], which is the only way to
/// stop the workers and collect their results. Stopping consumes the handle in turn, so a tester
/// can neither be stopped before it was started nor stopped twice.
#[derive(Debug)]
pub struct Tester<P> {
    name: String,
    probe: Arc<P>,
    workers: usize,
    settle_delay: Duration,
}

impl<P> Tester<P>
where
    P: Probe,
{
    /// Creates a tester running `workers` concurrent workers that pause for `settle_delay`
    /// after every successful probe.
    ///
    /// A worker checks for shutdown once per probe, so a stop right after start observes at most
    /// one attempt per worker only when `settle_delay` is non-zero. With a zero delay the workers
    /// only yield between probes and keep probing until the stop request reaches them.
    pub fn new(name: impl Into<String>, probe: P, workers: usize, settle_delay: Duration) -> Self {
        Self {
            name: name.into(),
            probe: Arc::new(probe),
            workers,
            settle_delay,
        }
    }

    /// Creates a tester sized and paced according to `config`.
    pub fn with_config(name: impl Into<String>, probe: P, config: &ProbeConfig) -> Self {
        Self::new(
            name,
            probe,
            config.workers_per_target,
            config.settle_delay(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawns the workers in the background and returns immediately.
    ///
    /// Worker `i` is named `<tester>-<i>`. The workers keep probing until the returned handle is
    /// stopped or dropped; there is no internal bound on how long they run.
    pub fn start(self) -> TesterHandle {
        register_metrics();

        let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
        let tester_name: Arc<str> = Arc::from(self.name.as_str());

        let workers = (0..self.workers)
            .map(|i| {
                ProbeWorker::new(
                    format!("{}-{i}", self.name),
                    tester_name.clone(),
                    self.probe.clone(),
                    self.settle_delay,
                    shutdown_rx.clone(),
                )
                .start()
            })
            .collect::<Vec<_>>();

        info!(
            "started zero downtime tester {} with {} workers",
            self.name,
            workers.len()
        );

        TesterHandle {
            name: self.name,
            shutdown_tx,
            workers,
        }
    }
}

/// Handle to a started [`Tester`].
///
/// Dropping the handle without calling [`TesterHandle::stop`] still stops the workers, but
/// their results are lost.
#[derive(Debug)]
pub struct TesterHandle {
    name: String,
    shutdown_tx: ShutdownTx,
    workers: Vec<ProbeWorkerHandle>,
}

impl TesterHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of workers started by the tester.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns the number of workers that already exited.
    ///
    /// Before [`TesterHandle::stop`] a worker only exits after its probe failed, so a non-zero
    /// value means downtime was already observed.
    pub fn finished_workers(&self) -> usize {
        self.workers
            .iter()
            .filter(|worker| worker.is_finished())
            .count()
    }

    /// Signals every worker to stop, waits until all of them terminated and returns their
    /// results in worker creation order.
    ///
    /// A worker that is in the middle of a probe finishes that call before it observes the
    /// shutdown.
    pub async fn stop(self) -> Vec<TestResult> {
        info!("stopping zero downtime tester {}", self.name);

        if self.shutdown_tx.shutdown().is_err() {
            debug!(
                "all workers of zero downtime tester {} already exited",
                self.name
            );
        }

        let results = join_all(self.workers.into_iter().map(WorkerHandle::wait)).await;

        debug!(
            "all {} workers of zero downtime tester {} terminated",
            results.len(),
            self.name
        );

        results
    }
}
