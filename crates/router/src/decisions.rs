//! Ring buffer of recent routing decisions, for observability.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use cadena_domain::Lane;

/// A single recorded routing decision.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub timestamp: DateTime<Utc>,
    /// Leading characters of the routed user message.
    pub message_snippet: String,
    pub lane: Lane,
    pub intent: String,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub latency_ms: u64,
    /// Whether this decision came from the fallback path.
    pub fallback: bool,
}

/// Thread-safe ring buffer of recent routing decisions.
///
/// The buffer evicts the oldest entry at capacity, keeping only the most
/// recent decisions.
pub struct DecisionLog {
    inner: Mutex<VecDeque<DecisionRecord>>,
    capacity: usize,
}

impl DecisionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record a decision, evicting the oldest entry at capacity.
    pub fn record(&self, record: DecisionRecord) {
        let mut buf = self.inner.lock();
        if buf.len() >= self.capacity {
            buf.pop_front();
        }
        buf.push_back(record);
    }

    /// The `limit` most recent decisions, newest first.
    pub fn recent(&self, limit: usize) -> Vec<DecisionRecord> {
        let buf = self.inner.lock();
        buf.iter().rev().take(limit).cloned().collect()
    }
}

/// Char-boundary-safe snippet of `text`, at most `max_chars` characters.
pub(crate) fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
