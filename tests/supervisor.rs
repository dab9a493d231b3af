use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use svcvisor::{
    DrainOutcome, Event, EventKind, ExitReason, RuntimeError, ServiceError, ServiceSpec,
    Subscribe, Supervisor, SupervisorConfig,
};

#[derive(Default)]
struct Recorder(Mutex<Vec<Event>>);

impl Recorder {
    fn kinds(&self) -> Vec<EventKind> {
        self.0.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    fn of(&self, kind: EventKind) -> Vec<Event> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.0.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

fn reference_specs() -> Vec<ServiceSpec> {
    vec![
        ServiceSpec::new("a", Duration::from_secs(3)),
        ServiceSpec::new("b", Duration::from_secs(2)),
        ServiceSpec::new("c", Duration::from_secs(5)),
    ]
}

fn supervisor(retries: u32, never_fail: bool, recorder: &Arc<Recorder>) -> Supervisor {
    let cfg = SupervisorConfig {
        retries,
        never_fail,
        ..SupervisorConfig::default()
    };
    Supervisor::builder(cfg)
        .with_subscriber(recorder.clone())
        .build()
}

fn timeout_of(service: &str, secs: u64) -> ServiceError {
    ServiceError::Timeout {
        service: service.into(),
        timeout: Duration::from_secs(secs),
    }
}

#[tokio::test(start_paused = true)]
async fn budget_of_two_restarts_twice_then_drains() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(2, false, &rec);
    let started = Instant::now();

    let report = sup
        .run(reference_specs(), CancellationToken::new())
        .await
        .expect("run");

    assert_eq!(report.exit, ExitReason::BudgetExhausted);
    let observed: Vec<(&str, bool, u32)> = report
        .completions
        .iter()
        .map(|c| (&*c.service, c.restarted, c.remaining))
        .collect();
    assert_eq!(observed, vec![("b", true, 1), ("a", true, 0), ("b", false, 0)]);
    assert_eq!(report.completions[0].error, Some(timeout_of("b", 2)));
    assert_eq!(report.completions[1].error, Some(timeout_of("a", 3)));
    assert_eq!(report.completions[2].error, Some(timeout_of("b", 2)));
    assert_eq!(report.restarts(), 2);

    // b failed twice by t=4; the restarted a and the original c were still running.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));

    assert_eq!(report.drain_of("a"), Some(&DrainOutcome::Clean));
    assert_eq!(report.drain_of("b"), Some(&DrainOutcome::AlreadyObserved));
    assert_eq!(report.drain_of("c"), Some(&DrainOutcome::Clean));
    assert!(report.drained.iter().all(|(_, d)| !d.is_error()));
}

#[tokio::test(start_paused = true)]
async fn zero_budget_stops_after_first_completion() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(0, false, &rec);

    let report = sup
        .run(reference_specs(), CancellationToken::new())
        .await
        .expect("run");

    assert_eq!(report.exit, ExitReason::BudgetExhausted);
    assert_eq!(report.completions.len(), 1);
    assert_eq!(&*report.completions[0].service, "b");
    assert!(!report.completions[0].restarted);
    assert_eq!(report.restarts(), 0);
    assert_eq!(report.drain_of("a"), Some(&DrainOutcome::Clean));
    assert_eq!(report.drain_of("b"), Some(&DrainOutcome::AlreadyObserved));
}

#[tokio::test(start_paused = true)]
async fn budget_counts_completions_of_every_service() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(4, false, &rec);
    let specs = vec![ServiceSpec::new("flaky", Duration::from_millis(100))];

    let report = sup.run(specs, CancellationToken::new()).await.expect("run");

    assert_eq!(report.completions.len(), 5);
    assert_eq!(report.restarts(), 4);
    assert!(report.completions.iter().all(|c| &*c.service == "flaky"));
    assert_eq!(report.drain_of("flaky"), Some(&DrainOutcome::AlreadyObserved));
}

#[tokio::test(start_paused = true)]
async fn never_fail_ends_only_on_shutdown() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(2, true, &rec);
    let token = CancellationToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let report = sup.run(reference_specs(), token).await.expect("run");

    assert_eq!(report.exit, ExitReason::ShutdownRequested("cancelled".into()));
    assert!(report.completions.is_empty());
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_secs(2));
    for name in ["a", "b", "c"] {
        assert_eq!(report.drain_of(name), Some(&DrainOutcome::Clean));
    }
    assert!(rec.of(EventKind::BudgetRemaining).is_empty());
}

#[tokio::test(start_paused = true)]
async fn never_fail_outlives_every_configured_timeout() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(0, true, &rec);
    let token = CancellationToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        time::sleep(Duration::from_secs(3600)).await;
        trigger.cancel();
    });

    let report = sup.run(reference_specs(), token).await.expect("run");

    assert!(matches!(report.exit, ExitReason::ShutdownRequested(_)));
    assert!(report.completions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_before_start_wins_over_everything() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(2, false, &rec);
    let token = CancellationToken::new();
    token.cancel();

    let report = sup.run(reference_specs(), token).await.expect("run");

    assert_eq!(report.exit, ExitReason::ShutdownRequested("cancelled".into()));
    assert!(report.completions.is_empty());
    assert_eq!(report.drained.len(), 3);
    assert!(
        report
            .drained
            .iter()
            .all(|(_, d)| *d == DrainOutcome::Clean)
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_mid_run_keeps_earlier_completions() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(5, false, &rec);
    let token = CancellationToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        time::sleep(Duration::from_millis(2500)).await;
        trigger.cancel();
    });

    let report = sup.run(reference_specs(), token).await.expect("run");

    assert!(matches!(report.exit, ExitReason::ShutdownRequested(_)));
    assert_eq!(report.completions.len(), 1);
    assert_eq!(&*report.completions[0].service, "b");
    assert!(report.completions[0].restarted);
    for name in ["a", "b", "c"] {
        assert_eq!(report.drain_of(name), Some(&DrainOutcome::Clean));
    }
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(2, false, &rec);
    let specs = vec![
        ServiceSpec::new("a", Duration::from_secs(1)),
        ServiceSpec::new("a", Duration::from_secs(2)),
    ];

    let err = sup
        .run(specs, CancellationToken::new())
        .await
        .expect_err("duplicate");

    assert!(matches!(err, RuntimeError::DuplicateService { ref name } if name == "a"));
    assert!(rec.kinds().is_empty());
}

#[tokio::test]
async fn empty_service_set_returns_immediately() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(2, false, &rec);

    let report = sup
        .run(Vec::new(), CancellationToken::new())
        .await
        .expect("run");

    assert_eq!(report.exit, ExitReason::NothingToSupervise);
    assert!(report.drained.is_empty());
    assert_eq!(
        rec.kinds(),
        vec![EventKind::ShuttingDown, EventKind::AllDrained]
    );
}

#[tokio::test(start_paused = true)]
async fn every_event_is_delivered_before_run_returns() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(2, false, &rec);

    sup.run(reference_specs(), CancellationToken::new())
        .await
        .expect("run");

    let kinds = rec.kinds();
    assert_eq!(kinds.last(), Some(&EventKind::AllDrained));

    // 3 initial starts + 2 restarts.
    assert_eq!(rec.of(EventKind::ServiceStarting).len(), 5);
    assert_eq!(rec.of(EventKind::ServiceTimedOut).len(), 3);
    assert_eq!(rec.of(EventKind::ServiceFailed).len(), 3);
    assert_eq!(rec.of(EventKind::ServiceRestarted).len(), 2);
    assert_eq!(rec.of(EventKind::ServiceStopped).len(), 2);
    assert!(rec.of(EventKind::DrainFailed).is_empty());

    let remaining: Vec<Option<u32>> = rec
        .of(EventKind::BudgetRemaining)
        .iter()
        .map(|e| e.remaining)
        .collect();
    assert_eq!(remaining, vec![Some(1), Some(0), Some(0)]);

    let exhausted = rec.of(EventKind::BudgetExhausted);
    assert_eq!(exhausted.len(), 1);
    assert_eq!(exhausted[0].service.as_deref(), Some("b"));

    let timed_out = rec.of(EventKind::ServiceTimedOut);
    assert_eq!(timed_out[0].service.as_deref(), Some("b"));
    assert_eq!(timed_out[0].timeout, Some(Duration::from_secs(2)));

    let shutting = kinds
        .iter()
        .position(|k| *k == EventKind::ShuttingDown)
        .expect("shutting down");
    let exhausted_at = kinds
        .iter()
        .position(|k| *k == EventKind::BudgetExhausted)
        .expect("exhausted");
    assert!(exhausted_at < shutting);
}

#[tokio::test(start_paused = true)]
async fn shutdown_request_is_published_with_cause() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(2, true, &rec);
    let token = CancellationToken::new();
    token.cancel();

    sup.run(reference_specs(), token).await.expect("run");

    let requested = rec.of(EventKind::ShutdownRequested);
    assert_eq!(requested.len(), 1);
    assert_eq!(requested[0].reason.as_deref(), Some("cancelled"));
}

#[tokio::test(start_paused = true)]
async fn shutdown_wins_over_completion_ready_at_same_instant() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(2, false, &rec);
    let token = CancellationToken::new();

    let trigger = token.clone();
    tokio::spawn(async move {
        time::sleep(Duration::from_secs(2)).await;
        trigger.cancel();
    });

    let specs = vec![
        ServiceSpec::new("b", Duration::from_secs(2)),
        ServiceSpec::new("c", Duration::from_secs(5)),
    ];
    let report = sup.run(specs, token).await.expect("run");

    assert_eq!(report.exit, ExitReason::ShutdownRequested("cancelled".into()));
    assert!(report.completions.is_empty());
    assert_eq!(
        report.drain_of("b"),
        Some(&DrainOutcome::Failed(timeout_of("b", 2)))
    );
    assert_eq!(report.drain_of("c"), Some(&DrainOutcome::Clean));
    assert!(rec.of(EventKind::ServiceRestarted).is_empty());
    assert!(rec.of(EventKind::BudgetRemaining).is_empty());
}

#[tokio::test(start_paused = true)]
async fn unobserved_failure_surfaces_during_drain() {
    let rec = Arc::new(Recorder::default());
    let sup = supervisor(0, false, &rec);
    let specs = vec![
        ServiceSpec::new("x", Duration::from_secs(2)),
        ServiceSpec::new("y", Duration::from_secs(2)),
    ];

    let report = sup.run(specs, CancellationToken::new()).await.expect("run");

    assert_eq!(report.exit, ExitReason::BudgetExhausted);
    assert_eq!(report.completions.len(), 1);
    assert_eq!(&*report.completions[0].service, "x");
    assert_eq!(report.drain_of("x"), Some(&DrainOutcome::AlreadyObserved));
    assert_eq!(
        report.drain_of("y"),
        Some(&DrainOutcome::Failed(timeout_of("y", 2)))
    );
    assert!(report.drained[1].1.is_error());
    assert!(report.events_flushed);

    let drain_failed = rec.of(EventKind::DrainFailed);
    assert_eq!(drain_failed.len(), 1);
    assert_eq!(drain_failed[0].service.as_deref(), Some("y"));
    assert_eq!(
        drain_failed[0].reason.as_deref(),
        Some("service y timed out after 2s")
    );

    let kinds = rec.kinds();
    let drain_at = kinds
        .iter()
        .position(|k| *k == EventKind::DrainFailed)
        .expect("drain failed");
    let shutting = kinds
        .iter()
        .position(|k| *k == EventKind::ShuttingDown)
        .expect("shutting down");
    assert!(shutting < drain_at);
    assert_eq!(kinds.last(), Some(&EventKind::AllDrained));
}

#[tokio::test(start_paused = true)]
async fn panicking_subscriber_does_not_block_the_run() {
    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_event(&self, event: &Event) {
            if event.kind == EventKind::ShuttingDown {
                panic!("cannot handle shutdown");
            }
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    let rec = Arc::new(Recorder::default());
    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_subscriber(Arc::new(Exploder))
        .with_subscriber(rec.clone())
        .build();
    let specs = vec![ServiceSpec::new("a", Duration::from_secs(60))];
    let token = CancellationToken::new();
    token.cancel();

    let report = sup.run(specs, token).await.expect("run");

    assert!(report.events_flushed);
    assert_eq!(rec.of(EventKind::AllDrained).len(), 1);
}
