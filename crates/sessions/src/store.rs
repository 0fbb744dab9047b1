//! The key–value store contract and its in-memory adapter.
//!
//! The orchestrator needs exactly three atomic operations — `get`, `setex`,
//! `exists` — and no multi-key transactions.  Networked backends implement
//! [`KvStore`] out of tree; [`MemoryStore`] backs development and tests.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use cadena_domain::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// KvStore contract
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Minimal TTL'd key–value store contract.
///
/// Implementations must make each operation atomic; errors are surfaced
/// as [`cadena_domain::Error::Store`]-class failures and retried by the
/// job layer.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value at `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` at `key` with a TTL in seconds.
    async fn setex(&self, key: &str, ttl_secs: u64, value: &str) -> Result<()>;

    /// Whether a live value exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory adapter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process [`KvStore`] with per-key TTL.  Expired entries are dropped
/// lazily on read and swept opportunistically when the map grows large.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

/// Sweep threshold: entry count above which writes trigger a cleanup pass.
const SWEEP_THRESHOLD: usize = 10_000;

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn setex(&self, key: &str, ttl_secs: u64, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();

        if entries.len() >= SWEEP_THRESHOLD {
            let now = Instant::now();
            entries.retain(|_, e| e.expires_at > now);
        }

        entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
