//! Scripted decision model for tests.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;

use cadena_domain::{Error, Result};

use crate::traits::{DecisionModel, DecisionRequest};

/// A [`DecisionModel`] that replays a queue of canned responses.
///
/// Each call pops the next queued `Result`; an exhausted queue yields a
/// model error, which exercises the router's fallback path.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<Value>>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    /// A model that fails every call with a timeout.
    pub fn always_timeout() -> Self {
        Self::new(vec![])
    }

    /// Queue one decision object built from plain parts.
    pub fn decision(lane: &str, intent: &str, confidence: f64, reasoning: &[&str]) -> Result<Value> {
        Ok(serde_json::json!({
            "lane": lane,
            "intent": intent,
            "confidence": confidence,
            "reasoning": reasoning,
        }))
    }
}

#[async_trait::async_trait]
impl DecisionModel for ScriptedModel {
    async fn decide(&self, _req: DecisionRequest) -> Result<Value> {
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Timeout("scripted model exhausted".into())))
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}
