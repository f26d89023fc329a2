use std::sync::Arc;
use std::time::Duration;

use zdt::error::{ErrorKind, ZdtResult};
use zdt::test_utils::probe::ScriptedProbe;
use zdt::tester::Tester;
use zdt::workers::probe::TestResult;
use zdt_telemetry::init_test_tracing;

#[tokio::test(flavor = "multi_thread")]
async fn succeeding_probe_yields_clean_results_for_every_worker() {
    init_test_tracing();

    let probe = ScriptedProbe::succeeding();
    let handle = Tester::new("host-a", probe.clone(), 5, Duration::from_millis(5)).start();

    // Every worker gets a few calls in before we stop.
    probe.wait_for_calls(20).await;
    let results = handle.stop().await;

    assert_eq!(results.len(), 5);
    for result in &results {
        assert!(result.is_success(), "unexpected failure: {result:?}");
        assert!(result.attempt_count >= 1);
    }
    assert_eq!(
        results.iter().map(|result| result.attempt_count).sum::<u64>(),
        probe.calls()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn failure_on_nth_call_only_stops_that_worker() {
    init_test_tracing();

    let probe = ScriptedProbe::succeeding().failing_on("host-a-1", 3);
    let handle = Tester::new("host-a", probe.clone(), 3, Duration::from_millis(2)).start();

    probe.wait_for_calls(30).await;
    let results = handle.stop().await;

    assert_eq!(results[1].worker_name, "host-a-1");
    assert_eq!(results[1].attempt_count, 3);
    let err = results[1].error.as_ref().unwrap();
    assert_eq!(err.kind(), ErrorKind::ProbeFailed);
    assert!(err.to_string().contains("test 3 done by worker host-a-1"));

    // The other workers keep their own counts and keep going after host-a-1 stopped.
    for result in [&results[0], &results[2]] {
        assert!(result.is_success());
        assert_eq!(result.attempt_count, probe.calls_by(&result.worker_name));
    }
    assert!(results[0].attempt_count + results[2].attempt_count > 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_returns_only_after_every_worker_terminated() {
    init_test_tracing();

    let probe = ScriptedProbe::succeeding().with_latency(Duration::from_millis(50));
    let handle = Tester::new("host-a", probe.clone(), 4, Duration::ZERO).start();

    probe.wait_for_calls(8).await;
    assert!(probe.max_in_flight() >= 1);

    let results = handle.stop().await;
    assert_eq!(probe.in_flight(), 0);

    // Nothing probes anymore once stop returned.
    let calls_after_stop = probe.calls();
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(probe.calls(), calls_after_stop);

    assert_eq!(results.len(), 4);
    assert_eq!(
        results.iter().map(|result| result.attempt_count).sum::<u64>(),
        calls_after_stop
    );
}

#[tokio::test]
async fn immediate_stop_yields_one_result_per_worker() {
    init_test_tracing();

    let probe = ScriptedProbe::succeeding();
    let handle = Tester::new("host-a", probe.clone(), 5, Duration::from_millis(100)).start();
    let results = handle.stop().await;

    assert_eq!(results.len(), 5);
    for result in &results {
        assert!(result.is_success());
        assert!(result.attempt_count <= 1);
    }
    assert!(probe.calls() <= 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn panicking_probe_is_contained_in_its_worker() {
    init_test_tracing();

    let probe = ScriptedProbe::succeeding().panicking_on("host-a-0", 2);
    let handle = Tester::new("host-a", probe.clone(), 2, Duration::from_millis(2)).start();

    probe.wait_for_calls(10).await;
    let results = handle.stop().await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].attempt_count, 2);
    assert_eq!(
        results[0].error.as_ref().map(|err| err.kind()),
        Some(ErrorKind::ProbeWorkerPanic)
    );
    assert!(results[1].is_success());
    assert_eq!(probe.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_releases_every_worker() {
    init_test_tracing();

    // Each worker holds the probe, and with it this token, until its task is gone.
    let token = Arc::new(());
    let worker_token = token.clone();
    let probe = move || {
        let _token = &worker_token;
        async { ZdtResult::Ok(()) }
    };

    let handle = Tester::new("host-a", probe, 5, Duration::from_millis(1)).start();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(Arc::strong_count(&token) > 1);

    let results = handle.stop().await;

    assert_eq!(results.len(), 5);
    assert_eq!(Arc::strong_count(&token), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_settle_delay_stop_still_joins_every_worker() {
    init_test_tracing();

    let probe = ScriptedProbe::succeeding();
    let handle = Tester::new("host-a", probe.clone(), 5, Duration::ZERO).start();
    let results = handle.stop().await;

    // Back to back probing may run several attempts before the stop request lands.
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(TestResult::is_success));
    assert_eq!(probe.in_flight(), 0);
    assert_eq!(
        results.iter().map(|result| result.attempt_count).sum::<u64>(),
        probe.calls()
    );
}
