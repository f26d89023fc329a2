use std::time::Duration;

use zdt::error::ErrorKind;
use zdt::runner::Runner;
use zdt::test_utils::factory::ScriptedProbeFactory;
use zdt::test_utils::probe::ScriptedProbe;
use zdt_config::load_config_from;
use zdt_config::shared::{ProbeConfig, TargetConfig, ZeroDowntimeConfig};
use zdt_telemetry::init_test_tracing;

fn config(workers_per_target: usize, settle_delay_ms: u64) -> ProbeConfig {
    ProbeConfig {
        workers_per_target,
        settle_delay_ms,
        ..ProbeConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn healthy_targets_report_every_worker() {
    init_test_tracing();

    let host_a = ScriptedProbe::succeeding();
    let host_b = ScriptedProbe::succeeding();
    let factory = ScriptedProbeFactory::new()
        .with_target("host-a", host_a.clone())
        .with_target("host-b", host_b.clone());
    let mut runner = Runner::new(config(5, 500), factory).unwrap();

    runner.start_probe("host-a").await.unwrap();
    runner.start_probe("host-b").await.unwrap();
    assert_eq!(runner.tester_names(), vec!["host-a", "host-b"]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let results = runner.finish().await.unwrap();

    assert_eq!(results.len(), 10);
    for result in &results {
        assert!(result.is_success());
        assert!(result.attempt_count > 0);
    }

    let names = results
        .iter()
        .map(|result| result.worker_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "host-a-0", "host-a-1", "host-a-2", "host-a-3", "host-a-4", "host-b-0", "host-b-1",
            "host-b-2", "host-b-3", "host-b-4",
        ]
    );
    assert_eq!(host_a.in_flight(), 0);
    assert_eq!(host_b.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_worker_is_reported_as_downtime() {
    init_test_tracing();

    let factory = ScriptedProbeFactory::new()
        .with_target("host-a", ScriptedProbe::succeeding())
        .with_target("host-b", ScriptedProbe::succeeding().failing_on("host-b-2", 3));
    let mut runner = Runner::new(config(5, 100), factory).unwrap();

    runner.start_probe("host-a").await.unwrap();
    runner.start_probe("host-b").await.unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    let err = runner.finish().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DowntimeDetected);
    assert_eq!(err.errors().len(), 1);
    assert_eq!(err.errors()[0].kind(), ErrorKind::ProbeFailed);

    let message = err.to_string();
    assert!(message.contains("Errors happened during zero downtime tests"));
    assert!(message.contains("test 3 done by worker host-b-2 of tester host-b failed"));
    assert!(message.contains("status code 503 on call 3"));

    assert!(runner.tester_names().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn every_failure_is_grouped_in_the_report() {
    init_test_tracing();

    let factory = ScriptedProbeFactory::new()
        .with_target("host-a", ScriptedProbe::failing())
        .with_target("host-b", ScriptedProbe::succeeding().panicking_on("host-b-0", 1));
    let mut runner = Runner::new(config(2, 10), factory).unwrap();

    runner.start_probe("host-a").await.unwrap();
    runner.start_probe("host-b").await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let err = runner.finish().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DowntimeDetected);
    assert_eq!(
        err.errors().iter().map(|err| err.kind()).collect::<Vec<_>>(),
        vec![
            ErrorKind::ProbeFailed,
            ErrorKind::ProbeFailed,
            ErrorKind::ProbeWorkerPanic,
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn targets_can_be_added_while_others_run() {
    init_test_tracing();

    let host_a = ScriptedProbe::succeeding();
    let factory = ScriptedProbeFactory::new()
        .with_target("host-a", host_a.clone())
        .with_target("host-b", ScriptedProbe::succeeding());
    let mut runner = Runner::new(config(2, 5), factory).unwrap();

    runner.start_probe("host-a").await.unwrap();
    host_a.wait_for_calls(10).await;

    runner.start_probe("host-b").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let results = runner.finish().await.unwrap();
    assert_eq!(results.len(), 4);
    assert!(results[0].attempt_count + results[1].attempt_count >= 10);
}

#[tokio::test(flavor = "multi_thread")]
async fn independent_runners_do_not_interfere() {
    init_test_tracing();

    let healthy = ScriptedProbeFactory::new().with_target("host-a", ScriptedProbe::succeeding());
    let broken = ScriptedProbeFactory::new().with_target("host-a", ScriptedProbe::failing());
    let mut healthy_runner = Runner::new(config(2, 10), healthy).unwrap();
    let mut broken_runner = Runner::new(config(2, 10), broken).unwrap();

    healthy_runner.start_probe("host-a").await.unwrap();
    broken_runner.start_probe("host-a").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (healthy_report, broken_report) =
        tokio::join!(healthy_runner.finish(), broken_runner.finish());

    assert_eq!(healthy_report.unwrap().len(), 2);
    assert_eq!(
        broken_report.unwrap_err().kind(),
        ErrorKind::DowntimeDetected
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn runner_probes_every_configured_target() {
    init_test_tracing();

    let dir = std::env::temp_dir().join(format!("zdt-runner-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("base.yaml"),
        r#"
probe:
  workers_per_target: 2
  settle_delay_ms: 10
targets:
  - host: httpbin.local
    path: /headers
  - nginx.local
"#,
    )
    .unwrap();
    let config: ZeroDowntimeConfig = load_config_from(&dir).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    let httpbin = ScriptedProbe::succeeding();
    let factory = ScriptedProbeFactory::new()
        .with_target("httpbin.local", httpbin.clone())
        .with_target("nginx.local", ScriptedProbe::succeeding());
    let mut runner = Runner::from_config(&config, factory.clone()).unwrap();

    runner.start_probes(&config.targets).await.unwrap();
    assert_eq!(runner.tester_names(), vec!["httpbin.local", "nginx.local"]);
    assert_eq!(
        factory.requested_targets(),
        vec![
            TargetConfig {
                host: "httpbin.local".to_string(),
                path: "/headers".to_string(),
            },
            TargetConfig::from("nginx.local"),
        ]
    );

    httpbin.wait_for_calls(4).await;
    let results = runner.finish().await.unwrap();

    let names = results
        .iter()
        .map(|result| result.worker_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["httpbin.local-0", "httpbin.local-1", "nginx.local-0", "nginx.local-1"]
    );
}
