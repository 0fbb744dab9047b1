//! The support lane — case intake and escalation.

use serde_json::json;

use cadena_domain::{Result, Turn};
use cadena_sessions::SessionState;

use super::{AgentResponse, LaneAgent};

pub struct SupportAgent;

impl SupportAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SupportAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LaneAgent for SupportAgent {
    async fn handle(
        &self,
        turn: &Turn,
        state: &SessionState,
        intent: &str,
    ) -> Result<AgentResponse> {
        match intent {
            "escalate" => {
                let mut support = state.support.clone();
                support.escalation_level += 1;
                support.case_status = Some("escalated".into());
                support.case_history.push(json!({
                    "event": "escalated",
                    "level": support.escalation_level,
                    "at": turn.timestamp,
                }));

                Ok(AgentResponse::reply(
                    "Entiendo, escalé tu caso con nuestro equipo. Te contactaremos pronto.",
                )
                .with_patch("support", serde_json::to_value(&support)?)
                .with_patch("flags", json!({ "human_handoff": true })))
            }

            _ => {
                // Reuse the open case when there is one; otherwise mint a
                // case id from the message that opened it.
                if let Some(case_id) = &state.support.active_case_id {
                    return Ok(AgentResponse::reply(format!(
                        "Tu caso {case_id} sigue {}.",
                        state.support.case_status.as_deref().unwrap_or("abierto")
                    )));
                }

                let case_id = format!("case-{}", turn.message_id);
                let mut support = state.support.clone();
                support.active_case_id = Some(case_id.clone());
                support.case_status = Some("open".into());
                support.case_history.push(json!({
                    "event": "opened",
                    "case_id": case_id,
                    "at": turn.timestamp,
                }));

                Ok(AgentResponse::reply(format!(
                    "Lamento el inconveniente. Abrí el caso {case_id}; cuéntame más detalles."
                ))
                .with_patch("support", serde_json::to_value(&support)?))
            }
        }
    }
}
