use futures::future::join_all;
use std::mem;
use tracing::{error, info, warn};
use zdt_config::shared::{ProbeConfig, TargetConfig, ZeroDowntimeConfig};

use crate::error::{ErrorKind, ZdtError, ZdtResult};
use crate::probe::ProbeFactory;
use crate::tester::{Tester, TesterHandle};
use crate::workers::probe::TestResult;

/// Coordinates the testers of one zero-downtime check.
///
/// Every scenario owns its own [`Runner`], so independent scenarios can run in parallel. Targets
/// are started with [`Runner::start_probe`] or [`Runner::start_probes`] before the disruptive
/// operation begins; once it is over, [`Runner::finish`] stops every tester and reports whether
/// any probe failed.
///
/// Dropping a runner stops its testers without reporting anything.
#[derive(Debug)]
pub struct Runner<F> {
    config: ProbeConfig,
    factory: F,
    testers: Vec<TesterHandle>,
}

impl<F> Runner<F>
where
    F: ProbeFactory,
{
    /// Creates a runner with no testers.
    ///
    /// Fails when `config` is invalid.
    pub fn new(config: ProbeConfig, factory: F) -> ZdtResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            factory,
            testers: Vec::new(),
        })
    }

    /// Creates a runner for a loaded [`ZeroDowntimeConfig`].
    ///
    /// The whole configuration is validated, including the targets, but nothing is started. Pass
    /// `config.targets` to [`Runner::start_probes`] to start probing them.
    pub fn from_config(config: &ZeroDowntimeConfig, factory: F) -> ZdtResult<Self> {
        config.validate()?;

        Self::new(config.probe.clone(), factory)
    }

    /// Returns the names of the running testers in start order.
    pub fn tester_names(&self) -> Vec<&str> {
        self.testers.iter().map(TesterHandle::name).collect()
    }

    /// Starts probing `target` in the background.
    ///
    /// A plain host converts into a target probing `/`. The tester is named after the host, so
    /// its workers are named `<host>-<i>`. If the target is invalid or the factory cannot produce
    /// a probe for it, the error is returned and nothing is started.
    pub async fn start_probe(&mut self, target: impl Into<TargetConfig>) -> ZdtResult<()> {
        let target = target.into();
        target.validate()?;

        if self
            .testers
            .iter()
            .any(|tester| tester.name() == target.host)
        {
            warn!(
                "a zero downtime tester for host {} is already running",
                target.host
            );
        }

        let probe = self.factory.create(&target, &self.config).await?;
        let tester = Tester::with_config(target.host, probe, &self.config);

        info!("starting zero downtime tester {}", tester.name());
        self.testers.push(tester.start());

        Ok(())
    }

    /// Starts probing every target in order.
    ///
    /// Stops at the first target that cannot be started and returns its error. Testers started
    /// before it keep running until [`Runner::finish`] or [`Runner::abort`].
    pub async fn start_probes(&mut self, targets: &[TargetConfig]) -> ZdtResult<()> {
        for target in targets {
            self.start_probe(target.clone()).await?;
        }

        Ok(())
    }

    /// Stops every tester and reports the outcome of the check.
    ///
    /// Returns all results, in tester start order and then worker creation order, if no worker
    /// failed. Otherwise returns a single [`ErrorKind::DowntimeDetected`] error grouping every
    /// worker failure. The runner is left without testers either way.
    pub async fn finish(&mut self) -> ZdtResult<Vec<TestResult>> {
        let results = self.stop_all().await;

        let errors = results
            .iter()
            .filter_map(|result| result.error.clone())
            .collect::<Vec<_>>();

        if !errors.is_empty() {
            return Err(ZdtError::grouped(
                ErrorKind::DowntimeDetected,
                "Errors happened during zero downtime tests",
                errors,
            ));
        }

        Ok(results)
    }

    /// Stops every tester, only logging the results.
    ///
    /// Meant for cleanup paths where reporting a failure would hide the error that caused the
    /// cleanup in the first place.
    pub async fn abort(&mut self) {
        let results = self.stop_all().await;
        let failed = results.iter().filter(|result| !result.is_success()).count();

        info!(
            "aborted zero downtime tests, {} of {} workers had failures",
            failed,
            results.len()
        );
    }

    async fn stop_all(&mut self) -> Vec<TestResult> {
        let testers = mem::take(&mut self.testers);

        // Testers are stopped together, so no target keeps being probed while another is joined.
        let results = join_all(testers.into_iter().map(TesterHandle::stop)).await;

        let results = results.into_iter().flatten().collect::<Vec<_>>();
        for result in &results {
            log_result(result);
        }

        results
    }
}

fn log_result(result: &TestResult) {
    match &result.error {
        Some(err) => error!(
            "got result from worker {}: requests: {}, error: {}",
            result.worker_name, result.attempt_count, err
        ),
        None => info!(
            "got result from worker {}: requests: {}",
            result.worker_name, result.attempt_count
        ),
    }
}
