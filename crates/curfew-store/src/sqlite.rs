//! SQLite-based store implementation

use chrono::{DateTime, Local, NaiveDate};
use curfew_util::UserId;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{DailyTotal, StoreError, StoreResult, UsageStore};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Schema objects, created individually when missing
const SCHEMA: &[(&str, &str, &str)] = &[
    (
        "table",
        "usage",
        r#"
        CREATE TABLE usage (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user TEXT NOT NULL,
            day TEXT NOT NULL,
            timestamp TEXT NOT NULL
        )
        "#,
    ),
    (
        "index",
        "idx_usage_user",
        "CREATE INDEX idx_usage_user ON usage(user)",
    ),
    (
        "index",
        "idx_usage_day",
        "CREATE INDEX idx_usage_day ON usage(day)",
    ),
];

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn object_exists(conn: &Connection, kind: &str, name: &str) -> StoreResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = ? AND name = ?",
            params![kind, name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

impl UsageStore for SqliteStore {
    fn ensure_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        for (kind, name, ddl) in SCHEMA {
            if object_exists(&conn, kind, name)? {
                continue;
            }
            conn.execute_batch(ddl)?;
            debug!(kind, name, "Schema object created");
        }

        Ok(())
    }

    fn record_tick_at(&self, user: &UserId, at: DateTime<Local>) -> StoreResult<()> {
        let conn = self.conn()?;
        let day_str = at.date_naive().format(DAY_FORMAT).to_string();

        conn.execute(
            "INSERT INTO usage (user, day, timestamp) VALUES (?, ?, ?)",
            params![user.as_str(), day_str, at.to_rfc3339()],
        )?;

        debug!(
            user = %user,
            day = %day_str,
            event_id = conn.last_insert_rowid(),
            "Usage tick recorded"
        );
        Ok(())
    }

    fn count_on(&self, user: &UserId, day: NaiveDate) -> StoreResult<u32> {
        let conn = self.conn()?;
        let day_str = day.format(DAY_FORMAT).to_string();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM usage WHERE user = ? AND day = ?",
            params![user.as_str(), day_str],
            |row| row.get(0),
        )?;

        Ok(count.max(0) as u32)
    }

    fn daily_totals(&self, user: &UserId) -> StoreResult<Vec<DailyTotal>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT day, COUNT(*) FROM usage WHERE user = ? GROUP BY day ORDER BY day ASC",
        )?;

        let rows = stmt.query_map([user.as_str()], |row| {
            let day: String = row.get(0)?;
            let ticks: i64 = row.get(1)?;
            Ok((day, ticks))
        })?;

        let mut totals = Vec::new();
        for row in rows {
            let (day_str, ticks) = row?;
            let day = NaiveDate::parse_from_str(&day_str, DAY_FORMAT)
                .map_err(|e| StoreError::InvalidRow(format!("day '{}': {}", day_str, e)))?;
            totals.push(DailyTotal {
                day,
                ticks: ticks.max(0) as u32,
            });
        }

        Ok(totals)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();

        let conn = store.conn().unwrap();
        assert!(object_exists(&conn, "table", "usage").unwrap());
        assert!(object_exists(&conn, "index", "idx_usage_user").unwrap());
        assert!(object_exists(&conn, "index", "idx_usage_day").unwrap());
    }

    #[test]
    fn test_ensure_schema_adds_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE usage (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user TEXT NOT NULL,
                    day TEXT NOT NULL,
                    timestamp TEXT NOT NULL
                );
                INSERT INTO usage (user, day, timestamp)
                    VALUES ('alice', '2025-12-29', '2025-12-29T10:00:00+00:00');",
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let conn = store.conn().unwrap();
        assert!(object_exists(&conn, "index", "idx_usage_user").unwrap());
        drop(conn);

        let day = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
        assert_eq!(store.count_on(&UserId::new("alice"), day).unwrap(), 1);
    }

    #[test]
    fn test_count_after_ticks() {
        let store = SqliteStore::in_memory().unwrap();
        let alice = UserId::new("alice");
        let day = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();

        assert_eq!(store.count_on(&alice, day).unwrap(), 0);

        for minute in 0..7 {
            store.record_tick_at(&alice, at(2025, 12, 29, 15, minute)).unwrap();
        }

        assert_eq!(store.count_on(&alice, day).unwrap(), 7);
    }

    #[test]
    fn test_counts_are_per_user_and_day() {
        let store = SqliteStore::in_memory().unwrap();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        store.record_tick_at(&alice, at(2025, 12, 29, 23, 59)).unwrap();
        store.record_tick_at(&alice, at(2025, 12, 30, 0, 0)).unwrap();
        store.record_tick_at(&bob, at(2025, 12, 29, 12, 0)).unwrap();

        let mon = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
        let tue = NaiveDate::from_ymd_opt(2025, 12, 30).unwrap();
        assert_eq!(store.count_on(&alice, mon).unwrap(), 1);
        assert_eq!(store.count_on(&alice, tue).unwrap(), 1);
        assert_eq!(store.count_on(&bob, mon).unwrap(), 1);
        assert_eq!(store.count_on(&bob, tue).unwrap(), 0);
    }

    #[test]
    fn test_record_tick_uses_today() {
        let store = SqliteStore::in_memory().unwrap();
        let alice = UserId::new("alice");

        store.record_tick(&alice).unwrap();
        store.record_tick(&alice).unwrap();

        // Two ticks moments apart; allow for the test straddling midnight
        let today = store.count_today(&alice).unwrap();
        assert!(today == 1 || today == 2);
    }

    #[test]
    fn test_daily_totals_ascending() {
        let store = SqliteStore::in_memory().unwrap();
        let alice = UserId::new("alice");

        store.record_tick_at(&alice, at(2025, 12, 31, 9, 0)).unwrap();
        store.record_tick_at(&alice, at(2025, 12, 27, 9, 0)).unwrap();
        store.record_tick_at(&alice, at(2025, 12, 27, 9, 1)).unwrap();
        store.record_tick_at(&alice, at(2025, 12, 29, 9, 0)).unwrap();
        store
            .record_tick_at(&UserId::new("bob"), at(2025, 12, 28, 9, 0))
            .unwrap();

        let totals = store.daily_totals(&alice).unwrap();
        let days: Vec<_> = totals.iter().map(|t| t.day.to_string()).collect();
        assert_eq!(days, vec!["2025-12-27", "2025-12-29", "2025-12-31"]);
        assert_eq!(totals[0].ticks, 2);
        assert_eq!(totals[0].minutes(), 2);
    }

    #[test]
    fn test_daily_totals_empty_for_unknown_user() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.daily_totals(&UserId::new("nobody")).unwrap().is_empty());
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.db");
        let alice = UserId::new("alice");
        let day = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();

        {
            let store = SqliteStore::open(&path).unwrap();
            store.record_tick_at(&alice, at(2025, 12, 29, 10, 0)).unwrap();
            store.record_tick_at(&alice, at(2025, 12, 29, 10, 1)).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count_on(&alice, day).unwrap(), 2);
    }

    #[test]
    fn test_invalid_day_row_is_reported() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO usage (user, day, timestamp) VALUES ('alice', 'garbage', 'x')",
                [],
            )
            .unwrap();

        let result = store.daily_totals(&UserId::new("alice"));
        assert!(matches!(result, Err(StoreError::InvalidRow(_))));
    }
}
