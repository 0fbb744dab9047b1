use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Worker pool configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parallel worker and retry settings for the orchestration job layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkersConfig {
    /// Number of parallel workers draining the ingest queue.
    #[serde(default = "d_count")]
    pub count: usize,

    /// Maximum attempts per message on retryable (infrastructure) errors.
    #[serde(default = "d_max_attempts")]
    pub max_attempts: u32,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            count: d_count(),
            max_attempts: d_max_attempts(),
        }
    }
}

fn d_count() -> usize {
    4
}

fn d_max_attempts() -> u32 {
    3
}
