//! The routing decision value.

use cadena_domain::Lane;
use serde::Serialize;

/// Maximum number of reasons carried on a decision.
const MAX_REASONS: usize = 5;

/// An immutable routing decision: which lane handles the turn, the
/// classified intent, and how confident the router is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterDecision {
    pub lane: Lane,
    pub intent: String,
    pub confidence: f64,
    pub reasons: Vec<String>,
}

impl RouterDecision {
    /// Build a decision, normalizing the numeric and list fields:
    /// confidence is clamped into `[0, 1]` (non-finite values collapse to
    /// zero) and reasons are truncated to five entries.
    pub fn new(
        lane: Lane,
        intent: impl Into<String>,
        confidence: f64,
        mut reasons: Vec<String>,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        reasons.truncate(MAX_REASONS);

        Self {
            lane,
            intent: intent.into(),
            confidence,
            reasons,
        }
    }
}
