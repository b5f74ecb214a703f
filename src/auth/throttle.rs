use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Failed login bookkeeping for one client address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    pub count: u32,
    pub window_start: DateTime<Utc>,
    pub locked_until: Option<DateTime<Utc>>,
}

/// Where attempt records live. The in-process map is enough for a single
/// instance; several instances behind a balancer need a shared store.
pub trait AttemptStore: Send + Sync {
    fn get(&self, key: &str) -> Option<AttemptRecord>;
    fn put(&self, key: &str, record: AttemptRecord);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemoryAttemptStore {
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl MemoryAttemptStore {
    fn records(&self) -> std::sync::MutexGuard<'_, HashMap<String, AttemptRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AttemptStore for MemoryAttemptStore {
    fn get(&self, key: &str) -> Option<AttemptRecord> {
        self.records().get(key).copied()
    }

    fn put(&self, key: &str, record: AttemptRecord) {
        self.records().insert(key.to_string(), record);
    }

    fn remove(&self, key: &str) {
        self.records().remove(key);
    }
}

/// Per-address lockout after repeated failed logins.
#[derive(Clone)]
pub struct LoginThrottle {
    store: Arc<dyn AttemptStore>,
    max_attempts: u32,
    window: Duration,
}

impl LoginThrottle {
    pub fn new(store: Arc<dyn AttemptStore>, max_attempts: u32, window: Duration) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
            window,
        }
    }

    pub fn in_memory(max_attempts: u32, window: Duration) -> Self {
        Self::new(Arc::new(MemoryAttemptStore::default()), max_attempts, window)
    }

    /// `Err(remaining)` while the address is locked. An expired lock is
    /// forgotten so the next failure starts a fresh window.
    pub fn check(&self, key: &str, now: DateTime<Utc>) -> Result<(), Duration> {
        let Some(record) = self.store.get(key) else {
            return Ok(());
        };
        match record.locked_until {
            Some(until) if until > now => Err(until - now),
            Some(_) => {
                self.store.remove(key);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Counts one failure; returns true when this failure locked the address.
    pub fn record_failure(&self, key: &str, now: DateTime<Utc>) -> bool {
        let mut record = match self.store.get(key) {
            Some(r) if now - r.window_start <= self.window => r,
            _ => AttemptRecord {
                count: 0,
                window_start: now,
                locked_until: None,
            },
        };

        record.count += 1;
        let locked = record.count >= self.max_attempts;
        if locked {
            record.locked_until = Some(now + self.window);
        }
        self.store.put(key, record);
        locked
    }

    pub fn reset(&self, key: &str) {
        self.store.remove(key);
    }
}

/// Whole minutes shown to the user, rounded up.
pub fn minutes_left(remaining: Duration) -> i64 {
    let secs = remaining.num_seconds().max(0);
    ((secs + 59) / 60).max(1)
}
