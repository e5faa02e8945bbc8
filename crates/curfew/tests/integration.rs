//! Integration tests for curfew
//!
//! These tests drive the engine end to end: TOML config, SQLite usage
//! ledger and a recording host.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use curfew_api::EnforcementReason;
use curfew_config::{PolicyTable, parse_config};
use curfew_core::{CoreError, DailyAggregator, EngineOptions, LimitEngine, WARNING_TITLE};
use curfew_host_api::{HostCall, MockHost};
use curfew_store::{DailyTotal, SqliteStore, StoreResult, UsageStore};
use curfew_util::UserId;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const CONFIG: &str = r#"
config_version = 1

[settings]
grace_period_seconds = 0

[[users]]
name = "alice"

[[users.limits]]
days = "weekdays"
max_duration = "5 hours"
cutoff = "9:30 pm"

[[users.limits]]
days = ["sat", "sun"]
max_duration = "1 hour 30 minutes"
cutoff = "22:00"
"#;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn engine(store: Arc<dyn UsageStore>, host: Arc<MockHost>) -> LimitEngine {
    let policy = parse_config(CONFIG).unwrap();
    let options = EngineOptions::from(&policy.settings);
    assert_eq!(options.grace_period, Duration::ZERO);
    LimitEngine::new(policy.table, store, host, options)
}

/// Wraps a store and counts writes
struct CountingStore {
    inner: SqliteStore,
    writes: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: SqliteStore::in_memory().unwrap(),
            writes: AtomicUsize::new(0),
        }
    }
}

impl UsageStore for CountingStore {
    fn ensure_schema(&self) -> StoreResult<()> {
        self.inner.ensure_schema()
    }

    fn record_tick_at(&self, user: &UserId, at: DateTime<Local>) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.record_tick_at(user, at)
    }

    fn count_on(&self, user: &UserId, day: NaiveDate) -> StoreResult<u32> {
        self.inner.count_on(user, day)
    }

    fn daily_totals(&self, user: &UserId) -> StoreResult<Vec<DailyTotal>> {
        self.inner.daily_totals(user)
    }

    fn is_healthy(&self) -> bool {
        self.inner.is_healthy()
    }
}

#[test]
fn test_warning_one_minute_before_cutoff() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let host = Arc::new(MockHost::new("alice"));
    let engine = engine(store, host.clone());

    // Monday 2025-12-29
    let report = engine.update(at(2025, 12, 29, 21, 29)).unwrap();

    assert_eq!(report.warning(), Some(1));
    assert!(report.enforcement().is_none());
    assert!(host.calls().contains(&HostCall::Notify {
        title: WARNING_TITLE.into(),
        message: "1 minutes remaining".into(),
    }));
    assert!(!host
        .calls()
        .iter()
        .any(|c| matches!(c, HostCall::ForceLogout { .. })));
}

#[test]
fn test_logout_at_cutoff() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let host = Arc::new(MockHost::new("alice"));
    let engine = engine(store, host.clone());

    let report = engine.update(at(2025, 12, 29, 21, 30)).unwrap();

    assert!(matches!(
        report.enforcement(),
        Some(EnforcementReason::CutoffPassed { .. })
    ));
    assert!(host.calls().contains(&HostCall::ForceLogout {
        user: UserId::new("alice")
    }));
}

#[test]
fn test_unlisted_user_writes_nothing() {
    let store = Arc::new(CountingStore::new());
    let host = Arc::new(MockHost::new("bob"));
    let engine = engine(store.clone(), host.clone());

    for minute in 0..10 {
        let report = engine.update(at(2025, 12, 29, 21, 20 + minute)).unwrap();
        assert!(report.is_idle());
    }

    assert_eq!(store.writes.load(Ordering::SeqCst), 0);

    // Only the status line is cleared
    let cleared = HostCall::StatusLine {
        message: String::new(),
    };
    assert!(host.action_calls().iter().all(|c| *c == cleared));
}

#[test]
fn test_session_user_change_switches_ledger() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let host = Arc::new(MockHost::new("alice"));
    let engine = engine(store.clone(), host.clone());

    for minute in 0..3 {
        let report = engine.update(at(2025, 12, 29, 15, minute)).unwrap();
        assert_eq!(report.user, UserId::new("alice"));
    }

    // Bob takes over the seat; he has no limits
    host.set_user(Some(UserId::new("bob")));
    for minute in 3..6 {
        let report = engine.update(at(2025, 12, 29, 15, minute)).unwrap();
        assert!(report.is_idle());
        assert_eq!(report.user, UserId::new("bob"));
    }

    host.set_user(Some(UserId::new("alice")));
    let report = engine.update(at(2025, 12, 29, 15, 6)).unwrap();

    let day = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
    assert_eq!(report.snapshot.unwrap().usage_minutes_today, 4);
    assert_eq!(store.count_on(&UserId::new("alice"), day).unwrap(), 4);
    assert_eq!(store.count_on(&UserId::new("bob"), day).unwrap(), 0);

    // Nobody logged in at all
    host.set_user(None);
    let result = engine.update(at(2025, 12, 29, 15, 7));
    assert!(matches!(result, Err(CoreError::Capability(_))));
    assert_eq!(store.count_on(&UserId::new("alice"), day).unwrap(), 4);
}

#[test]
fn test_bad_limits_for_one_user_leave_others_enforced() {
    let config = format!(
        "{}{}",
        CONFIG,
        r#"
[[users]]
name = "bob"

[[users.limits]]
days = "all"
max_duration = "5 hourz"
cutoff = "9:30 pm"
"#
    );
    let policy = parse_config(&config).unwrap();
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let host = Arc::new(MockHost::new("alice"));
    let engine = LimitEngine::new(
        policy.table,
        store.clone(),
        host.clone(),
        EngineOptions::from(&policy.settings),
    );

    let report = engine.update(at(2025, 12, 29, 21, 30)).unwrap();
    assert!(matches!(
        report.enforcement(),
        Some(EnforcementReason::CutoffPassed { .. })
    ));
    assert!(host.calls().contains(&HostCall::ForceLogout {
        user: UserId::new("alice")
    }));

    host.set_user(Some(UserId::new("bob")));
    host.clear_calls();
    match engine.update(at(2025, 12, 29, 21, 31)) {
        Err(CoreError::Config { user, message }) => {
            assert_eq!(user, UserId::new("bob"));
            assert!(message.contains("hourz"));
        }
        other => panic!("expected config error for bob, got {:?}", other),
    }

    let day = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
    assert_eq!(store.count_on(&UserId::new("bob"), day).unwrap(), 0);
    assert!(host.action_calls().is_empty());
}

#[test]
fn test_warnings_follow_the_countdown() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let host = Arc::new(MockHost::new("alice"));
    let engine = engine(store, host);

    // Cutoff is the tighter bound for the last 35 minutes before 21:30
    let mut warned = Vec::new();
    for minute in 55..=89 {
        let now = at(2025, 12, 29, 20, 0) + chrono::Duration::minutes(minute);
        let report = engine.update(now).unwrap();
        if let Some(remaining) = report.warning() {
            warned.push(remaining);
        }
        assert!(report.enforcement().is_none());
    }

    assert_eq!(warned, vec![30, 25, 20, 15, 10, 5, 1]);
}

#[test]
fn test_weekend_budget_is_enforced() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let host = Arc::new(MockHost::new("alice"));
    let engine = engine(store.clone(), host.clone());

    // Saturday 2026-01-03, one check a minute from 10:00
    let start = at(2026, 1, 3, 10, 0);
    let mut enforced_at = None;
    for minute in 0..120 {
        let report = engine.update(start + chrono::Duration::minutes(minute)).unwrap();
        if report.enforcement().is_some() {
            enforced_at = Some(minute);
            break;
        }
    }

    // 90 minutes allowed: the 90th tick ends the session
    assert_eq!(enforced_at, Some(89));
    let day = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();
    assert_eq!(store.count_on(&UserId::new("alice"), day).unwrap(), 90);
}

#[test]
fn test_usage_resets_next_day() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let alice = UserId::new("alice");

    // Friday is spent
    for minute in 0..300 {
        store
            .record_tick_at(&alice, at(2026, 1, 2, 8, 0) + chrono::Duration::minutes(minute))
            .unwrap();
    }

    let host = Arc::new(MockHost::new("alice"));
    let engine = engine(store, host);

    assert!(engine.update(at(2026, 1, 2, 14, 0)).unwrap().enforcement().is_some());

    // Saturday starts from zero
    let report = engine.update(at(2026, 1, 3, 9, 0)).unwrap();
    assert!(report.enforcement().is_none());
    assert_eq!(report.snapshot.unwrap().usage_minutes_today, 1);
}

#[test]
fn test_failed_logout_is_an_error() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let host = Arc::new(MockHost::new("alice"));
    host.set_fail_enforcement(true);
    let engine = engine(store, host);

    let result = engine.update(at(2025, 12, 29, 23, 0));
    assert!(matches!(result, Err(CoreError::Enforcement(_))));
}

#[test]
fn test_report_series_after_checks() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let host = Arc::new(MockHost::new("alice"));
    let engine = engine(store.clone(), host);

    // Monday: 3 checks, Thursday: 2 checks
    for minute in 0..3 {
        engine.update(at(2025, 12, 29, 15, minute)).unwrap();
    }
    for minute in 0..2 {
        engine.update(at(2026, 1, 1, 15, minute)).unwrap();
    }

    let series = DailyAggregator::new(store)
        .build_series(&UserId::new("alice"))
        .unwrap();

    let days: Vec<_> = series.iter().map(|(_, minutes)| minutes).collect();
    assert_eq!(days, vec![3, 0, 0, 2]);
    assert_eq!(series.total_minutes(), 5);
}

#[test]
fn test_empty_policy_is_idle_for_everyone() {
    let store = Arc::new(CountingStore::new());
    let host = Arc::new(MockHost::new("alice"));
    let engine = LimitEngine::new(
        PolicyTable::new(),
        store.clone(),
        host,
        EngineOptions::default(),
    );

    assert!(engine.update(at(2025, 12, 29, 12, 0)).unwrap().is_idle());
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}
