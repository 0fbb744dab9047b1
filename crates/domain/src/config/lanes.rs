use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Lane definition
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One configured lane entry (`[lanes.<id>]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneDef {
    /// Name of the agent implementation backing this lane.  Resolved by
    /// the agent registry at startup; unknown handlers are fatal.
    pub handler: String,

    /// Human-readable description, surfaced to the intent router so the
    /// model knows what each lane covers.
    #[serde(default)]
    pub description: String,

    /// Marks the default lane.  Exactly one lane must set this.
    #[serde(default)]
    pub default: bool,

    /// Optional model override for LLM-backed agents.
    #[serde(default)]
    pub model: Option<String>,
}
