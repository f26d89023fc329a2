use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use crate::error::{ErrorKind, ZdtResult};
use crate::probe::{Probe, current_worker_name};
use crate::zdt_error;

#[derive(Debug, Clone, Default)]
struct Script {
    fail_always: bool,
    failures: Vec<(String, u64)>,
    panics: Vec<(String, u64)>,
    latency: Duration,
}

impl Script {
    fn matches(entries: &[(String, u64)], worker: &str, call: u64) -> bool {
        entries
            .iter()
            .any(|(name, nth)| name == worker && *nth == call)
    }
}

#[derive(Debug, Default)]
struct Stats {
    calls: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls_per_worker: Mutex<HashMap<String, u64>>,
    calls_changed: Notify,
}

/// Decrements the in-flight counter when a probe call ends, however it ends.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let current = counter.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(current, Ordering::SeqCst);

        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A [`Probe`] whose outcome is scripted per worker and per call.
///
/// Calls are counted per worker using [`current_worker_name`], so a script like "fail the third
/// call of `host-b-2`" leaves every other worker of the tester untouched. Clones share the script
/// and the call statistics.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProbe {
    script: Arc<Script>,
    stats: Arc<Stats>,
}

impl ScriptedProbe {
    /// A probe that always succeeds.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// A probe that fails on every call.
    pub fn failing() -> Self {
        let mut probe = Self::default();
        Arc::make_mut(&mut probe.script).fail_always = true;

        probe
    }

    /// Makes call number `call` (starting at 1) of `worker` fail.
    pub fn failing_on(mut self, worker: impl Into<String>, call: u64) -> Self {
        Arc::make_mut(&mut self.script)
            .failures
            .push((worker.into(), call));

        self
    }

    /// Makes call number `call` (starting at 1) of `worker` panic.
    pub fn panicking_on(mut self, worker: impl Into<String>, call: u64) -> Self {
        Arc::make_mut(&mut self.script)
            .panics
            .push((worker.into(), call));

        self
    }

    /// Makes every call take `latency` before completing.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        Arc::make_mut(&mut self.script).latency = latency;

        self
    }

    /// Total number of calls started across all workers.
    pub fn calls(&self) -> u64 {
        self.stats.calls.load(Ordering::SeqCst)
    }

    /// Number of calls started by `worker`.
    pub fn calls_by(&self, worker: &str) -> u64 {
        let calls_per_worker = self.stats.calls_per_worker.lock().unwrap();
        calls_per_worker.get(worker).copied().unwrap_or(0)
    }

    /// Number of calls currently running.
    pub fn in_flight(&self) -> usize {
        self.stats.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.stats.max_in_flight.load(Ordering::SeqCst)
    }

    /// Waits until at least `calls` calls were started across all workers.
    pub async fn wait_for_calls(&self, calls: u64) {
        loop {
            // Registered before checking so that no notification is missed in between.
            let notified = self.stats.calls_changed.notified();
            if self.calls() >= calls {
                return;
            }

            notified.await;
        }
    }

    fn register_call(&self, worker: &str) -> u64 {
        let call = {
            let mut calls_per_worker = self.stats.calls_per_worker.lock().unwrap();
            let calls = calls_per_worker.entry(worker.to_string()).or_default();
            *calls += 1;
            *calls
        };

        self.stats.calls.fetch_add(1, Ordering::SeqCst);
        self.stats.calls_changed.notify_waiters();

        call
    }
}

impl Probe for ScriptedProbe {
    async fn probe(&self) -> ZdtResult<()> {
        let worker = current_worker_name()
            .map(|name| name.to_string())
            .unwrap_or_default();
        let call = self.register_call(&worker);
        let _in_flight = InFlight::enter(&self.stats.in_flight, &self.stats.max_in_flight);

        if !self.script.latency.is_zero() {
            tokio::time::sleep(self.script.latency).await;
        }

        if Script::matches(&self.script.panics, &worker, call) {
            panic!("scripted panic on call {call} of worker {worker}");
        }

        if self.script.fail_always || Script::matches(&self.script.failures, &worker, call) {
            return Err(zdt_error!(
                ErrorKind::IoError,
                "Request failed",
                format!("status code 503 on call {call}")
            ));
        }

        Ok(())
    }
}
