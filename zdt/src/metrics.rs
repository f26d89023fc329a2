use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge};

static REGISTER_METRICS: Once = Once::new();

pub const ZDT_PROBE_ATTEMPTS_TOTAL: &str = "zdt_probe_attempts_total";
pub const ZDT_PROBE_FAILURES_TOTAL: &str = "zdt_probe_failures_total";
pub const ZDT_ACTIVE_PROBE_WORKERS: &str = "zdt_active_probe_workers";
pub const TESTER: &str = "tester";

/// Register metrics emitted by the probe engine. This should be called before starting a tester.
/// It is safe to call this method multiple times, the metrics are registered only once.
pub(crate) fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            ZDT_PROBE_ATTEMPTS_TOTAL,
            Unit::Count,
            "Total number of probe invocations started by probe workers"
        );

        describe_counter!(
            ZDT_PROBE_FAILURES_TOTAL,
            Unit::Count,
            "Total number of probe invocations that failed or panicked"
        );

        describe_gauge!(
            ZDT_ACTIVE_PROBE_WORKERS,
            Unit::Count,
            "Number of probe workers currently running"
        );
    });
}
