//! The intent router — total routing with a deterministic fallback.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::Value;

use cadena_domain::{Lane, LaneSet, Turn};
use cadena_sessions::SessionState;

use crate::decision::RouterDecision;
use crate::decisions::{snippet, DecisionLog, DecisionRecord};
use crate::prompt;
use crate::traits::{DecisionModel, DecisionRequest};

/// Intent used by the fallback decision.
const FALLBACK_INTENT: &str = "general_info";

/// Confidence reported by the fallback decision.
const FALLBACK_CONFIDENCE: f64 = 0.2;

/// Routes turns to lanes.  `route` never fails: any model or
/// configuration problem collapses into a fallback decision on the
/// default lane, with the error kind recorded in the reasons.
pub struct IntentRouter {
    model: Option<Arc<dyn DecisionModel>>,
    lanes: LaneSet,
    timeout: Duration,
    log: DecisionLog,
}

impl IntentRouter {
    /// `model = None` means the router is not wired to an LLM (missing
    /// credentials); every turn then takes the `config_error` fallback.
    pub fn new(
        model: Option<Arc<dyn DecisionModel>>,
        lanes: LaneSet,
        timeout: Duration,
        log_capacity: usize,
    ) -> Self {
        Self {
            model,
            lanes,
            timeout,
            log: DecisionLog::new(log_capacity),
        }
    }

    /// Route one turn.  Total: always returns a decision with a
    /// configured lane and a confidence in `[0, 1]`.
    pub async fn route(&self, turn: &Turn, state: &SessionState) -> RouterDecision {
        let started = Instant::now();

        let (decision, fallback) = match &self.model {
            None => (
                self.fallback_decision("config_error:router model not configured".into()),
                true,
            ),
            Some(model) => {
                let req = DecisionRequest {
                    system_prompt: prompt::system_prompt(&self.lanes),
                    user_message: prompt::user_message(turn, state),
                    schema: prompt::decision_schema(),
                    model: None,
                };
                match tokio::time::timeout(self.timeout, model.decide(req)).await {
                    Ok(Ok(raw)) => (self.assemble(&raw), false),
                    Ok(Err(e)) => {
                        tracing::warn!(
                            error_kind = e.kind(),
                            model = model.model_id(),
                            "intent model failed, using fallback decision"
                        );
                        (
                            self.fallback_decision(format!("router_error:{}", e.kind())),
                            true,
                        )
                    }
                    Err(_) => {
                        tracing::warn!(
                            model = model.model_id(),
                            timeout_ms = self.timeout.as_millis() as u64,
                            "intent model timed out, using fallback decision"
                        );
                        (self.fallback_decision("router_error:Timeout".into()), true)
                    }
                }
            }
        };

        self.log.record(DecisionRecord {
            timestamp: Utc::now(),
            message_snippet: snippet(&turn.text, 80),
            lane: decision.lane.clone(),
            intent: decision.intent.clone(),
            confidence: decision.confidence,
            reasons: decision.reasons.clone(),
            latency_ms: started.elapsed().as_millis() as u64,
            fallback,
        });

        decision
    }

    /// Recent routing decisions, for ops surfaces.
    pub fn decision_log(&self) -> &DecisionLog {
        &self.log
    }

    /// Assemble a decision from raw structured output, normalizing every
    /// field: unknown lanes snap to the default, reasons are
    /// string-coerced and truncated, confidence is clamped.
    fn assemble(&self, raw: &Value) -> RouterDecision {
        let mut lane = Lane::new(raw.get("lane").and_then(Value::as_str).unwrap_or_default());
        if !self.lanes.contains(&lane) {
            tracing::debug!(
                lane = %lane,
                default = %self.lanes.default_lane(),
                "model chose an unknown lane, substituting the default"
            );
            lane = self.lanes.default_lane().clone();
        }

        let intent = raw
            .get("intent")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_INTENT)
            .to_owned();

        let confidence = raw.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);

        let reasons = raw
            .get("reasoning")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        RouterDecision::new(lane, intent, confidence, reasons)
    }

    fn fallback_decision(&self, reason: String) -> RouterDecision {
        RouterDecision::new(
            self.lanes.default_lane().clone(),
            FALLBACK_INTENT,
            FALLBACK_CONFIDENCE,
            vec![reason],
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
