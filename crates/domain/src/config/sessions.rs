use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session orchestration limits & localization defaults
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Session persistence and baton-chain limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// TTL of the per-session state blob, refreshed on every persist.
    #[serde(default = "d_session_ttl")]
    pub session_ttl_secs: u64,

    /// TTL of the `turn:processed:<message_id>` idempotency marker.
    #[serde(default = "d_idempotency_ttl")]
    pub idempotency_ttl_secs: u64,

    /// Maximum baton handoffs after the initial agent invocation
    /// (2 hops = up to 3 agent calls per turn).
    #[serde(default = "d_max_baton_hops")]
    pub max_baton_hops: u32,

    /// Locale assigned to freshly created sessions.
    #[serde(default = "d_locale")]
    pub default_locale: String,

    /// Timezone assigned to freshly created sessions.
    #[serde(default = "d_timezone")]
    pub default_timezone: String,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: d_session_ttl(),
            idempotency_ttl_secs: d_idempotency_ttl(),
            max_baton_hops: d_max_baton_hops(),
            default_locale: d_locale(),
            default_timezone: d_timezone(),
        }
    }
}

fn d_session_ttl() -> u64 {
    86_400
}

fn d_idempotency_ttl() -> u64 {
    3_600
}

fn d_max_baton_hops() -> u32 {
    2
}

fn d_locale() -> String {
    "es-CO".into()
}

fn d_timezone() -> String {
    "America/Bogota".into()
}
