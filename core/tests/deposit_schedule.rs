//! Recurring deposit scheduling tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use pension_desk_core::{
    config::FraudThresholds,
    deposit_schedule::{DepositScheduler, Frequency, ScheduleAction, ScheduleOutcome, ScheduleRequest},
    fraud_detection::VELOCITY_CHECK,
    seed,
    store::DeskStore,
};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 20)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .expect("valid test timestamp")
}

fn seeded() -> DeskStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = DeskStore::in_memory().expect("open in-memory store");
    store.migrate().expect("migrate");
    seed::seed_if_empty(&store, now()).expect("seed");
    store
}

fn schedule(store: &DeskStore, request: ScheduleRequest, at: NaiveDateTime) -> ScheduleOutcome {
    let thresholds = FraudThresholds::default();
    DepositScheduler::new(store, &thresholds)
        .schedule(request, at)
        .expect("schedule call")
}

#[test]
fn first_schedule_creates_row_and_pending_transaction() {
    let store = seeded();
    let outcome = schedule(&store, ScheduleRequest::new("C001").pension("P001").amount(2500.0), now());

    let conf = match outcome {
        ScheduleOutcome::Scheduled(conf) => conf,
        other => panic!("expected a schedule, got {other:?}"),
    };
    assert_eq!(conf.action, ScheduleAction::Created);
    assert_eq!(conf.customer_name, "John Doe");
    assert_eq!(conf.pension_type, "Government Pension");
    assert_eq!(conf.bank_account.as_deref(), Some("ACC1001"));
    assert_eq!(conf.frequency, Frequency::Monthly);
    assert_eq!(conf.next_deposit_date, "2026-04-19");
    assert_eq!(conf.status, "active");
    assert_eq!(
        conf.message,
        "Successfully created monthly pension deposit schedule for John Doe"
    );
    assert!(conf.schedule_id.starts_with('S') && conf.schedule_id.len() == 9);
    assert!(conf.transaction_id.starts_with('T'));

    assert_eq!(store.active_schedule_count("C001", "P001").unwrap(), 1);
    let txns = store.recent_transactions("C001", 5).unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].transaction_id, conf.transaction_id);
    assert_eq!(txns[0].status, "scheduled");
    assert_eq!(txns[0].transaction_type, "deposit");
    assert!(!txns[0].is_fraudulent);
    assert_eq!(txns[0].scheduled_date.as_deref(), Some("2026-04-19"));
}

#[test]
fn second_schedule_updates_the_active_row() {
    let store = seeded();
    let first = schedule(&store, ScheduleRequest::new("C001").amount(2500.0), now());
    let first = match first {
        ScheduleOutcome::Scheduled(first) => first,
        other => panic!("first call should schedule, got {other:?}"),
    };

    let second = schedule(
        &store,
        ScheduleRequest::new("C001")
            .amount(2450.0)
            .frequency(Frequency::Weekly),
        now() + Duration::hours(1),
    );
    let second = match second {
        ScheduleOutcome::Scheduled(second) => second,
        other => panic!("second call should schedule, got {other:?}"),
    };

    assert_eq!(second.action, ScheduleAction::Updated);
    assert_eq!(second.schedule_id, first.schedule_id);
    assert_eq!(second.next_deposit_date, "2026-03-27");
    assert!(second.message.starts_with("Successfully updated weekly"));

    assert_eq!(store.active_schedule_count("C001", "P001").unwrap(), 1);
    let listings = store.schedule_listings(Some("C001")).unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].amount, 2450.0);
    assert_eq!(listings[0].frequency, "weekly");
    assert_eq!(listings[0].next_deposit_date, "2026-03-27");
    // one ledger entry per successful call
    assert_eq!(store.transaction_count("C001").unwrap(), 2);
}

#[test]
fn rejected_schedule_writes_nothing() {
    let store = seeded();
    let outcome = schedule(&store, ScheduleRequest::new("C001").pension("P001").amount(50.0), now());

    let (request, verdict) = match outcome {
        ScheduleOutcome::Rejected { request, verdict } => (request, verdict),
        other => panic!("expected a fraud reject, got {other:?}"),
    };
    assert_eq!(request.amount, 50.0);
    assert!(verdict.is_rejected());
    assert_eq!(store.schedule_count().unwrap(), 0);
    assert_eq!(store.transaction_count("C001").unwrap(), 0);
    // the reject itself is on file
    assert_eq!(store.fraud_indicator_count("C001").unwrap(), 2);
}

#[test]
fn defaults_resolve_from_active_pension() {
    let store = seeded();
    let outcome = schedule(&store, ScheduleRequest::new("C002"), now());
    let conf = match outcome {
        ScheduleOutcome::Scheduled(conf) => conf,
        other => panic!("expected a schedule, got {other:?}"),
    };
    assert_eq!(conf.pension_id, "P002");
    assert_eq!(conf.amount, 3200.0);
    assert_eq!(conf.customer_name, "Jane Smith");
}

#[test]
fn unknown_customer_is_not_found() {
    let store = seeded();
    let thresholds = FraudThresholds::default();
    let err = DepositScheduler::new(&store, &thresholds)
        .schedule(ScheduleRequest::new("C999"), now())
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert!(err.to_string().contains("C999"));
}

#[test]
fn unrecognized_frequency_is_stored_verbatim() {
    let store = seeded();
    let outcome = schedule(
        &store,
        ScheduleRequest::new("C003").frequency(Frequency::parse("quarterly")),
        now(),
    );
    let conf = match outcome {
        ScheduleOutcome::Scheduled(conf) => conf,
        other => panic!("expected a schedule, got {other:?}"),
    };
    assert_eq!(conf.next_deposit_date, "2026-04-19");

    let listings = store.schedule_listings(Some("C003")).unwrap();
    assert_eq!(listings[0].frequency, "quarterly");
}

#[test]
fn fifth_schedule_in_a_day_is_a_velocity_reject() {
    let store = seeded();
    for i in 0..4 {
        let outcome = schedule(&store, ScheduleRequest::new("C001"), now() + Duration::minutes(i));
        assert!(
            matches!(outcome, ScheduleOutcome::Scheduled(_)),
            "call {i} should schedule: {outcome:?}"
        );
    }

    let outcome = schedule(&store, ScheduleRequest::new("C001"), now() + Duration::minutes(10));
    let verdict = match outcome {
        ScheduleOutcome::Rejected { verdict, .. } => verdict,
        other => panic!("fifth call should be rejected, got {other:?}"),
    };
    assert!(verdict
        .indicators
        .iter()
        .any(|i| i.indicator_type == VELOCITY_CHECK));
    assert_eq!(store.transaction_count("C001").unwrap(), 4);
    assert_eq!(store.active_schedule_count("C001", "P001").unwrap(), 1);
}

#[test]
fn ledger_failure_rolls_back_the_schedule() {
    let store = seeded();
    store
        .execute_batch(
            "CREATE TRIGGER ledger_offline BEFORE INSERT ON transactions
             BEGIN SELECT RAISE(ABORT, 'ledger offline'); END;",
        )
        .unwrap();

    let thresholds = FraudThresholds::default();
    let err = DepositScheduler::new(&store, &thresholds)
        .schedule(ScheduleRequest::new("C001"), now())
        .unwrap_err();
    assert_eq!(err.kind(), "database");
    assert!(err.to_string().contains("ledger offline"), "unexpected error: {err}");
    assert_eq!(store.schedule_count().unwrap(), 0);
}
