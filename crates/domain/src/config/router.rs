use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Intent router configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration for the LLM-backed intent router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Base URL of an OpenAI-compatible chat completions endpoint.
    #[serde(default = "d_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key.  When unset, routing
    /// degrades to the deterministic fallback on every turn.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,

    /// Model used for intent classification.
    #[serde(default = "d_model")]
    pub model: String,

    /// Per-call timeout.  The router must answer fast; on timeout the
    /// fallback decision is used.
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,

    /// Capacity of the in-memory ring buffer of recent routing decisions.
    #[serde(default = "d_decision_log_capacity")]
    pub decision_log_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_key_env: d_api_key_env(),
            model: d_model(),
            timeout_ms: d_timeout_ms(),
            decision_log_capacity: d_decision_log_capacity(),
        }
    }
}

fn d_base_url() -> String {
    "http://localhost:11434/v1".into()
}

fn d_api_key_env() -> String {
    "CADENA_ROUTER_API_KEY".into()
}

fn d_model() -> String {
    "gpt-4o-mini".into()
}

fn d_timeout_ms() -> u64 {
    1_000
}

fn d_decision_log_capacity() -> usize {
    256
}
