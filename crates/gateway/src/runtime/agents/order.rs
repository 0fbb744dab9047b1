//! The order lane — order lookup behind a verification gate.

use serde_json::json;

use cadena_domain::{Result, Turn};
use cadena_sessions::SessionState;

use super::{AgentResponse, LaneAgent};

pub struct OrderAgent;

impl OrderAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OrderAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LaneAgent for OrderAgent {
    async fn handle(
        &self,
        turn: &Turn,
        state: &SessionState,
        intent: &str,
    ) -> Result<AgentResponse> {
        match intent {
            "verify_order" => {
                let mut order = state.order.clone();
                order.verified = true;
                order.verified_at = Some(turn.timestamp.clone());

                Ok(AgentResponse::reply(
                    "¡Listo! Verifiqué tus datos. ¿Qué pedido quieres consultar?",
                )
                .with_patch("order", serde_json::to_value(&order)?)
                .with_patch("phone_verified", json!(true)))
            }

            _ => {
                if !state.order.verified {
                    return Ok(AgentResponse::reply(
                        "Por seguridad, confírmame el número de tu pedido y el teléfono de la compra.",
                    ));
                }

                let lookup = json!({ "query": turn.text, "at": turn.timestamp });
                let mut order = state.order.clone();
                order.last_lookup = Some(lookup.clone());
                order.lookup_history.push(lookup);

                Ok(AgentResponse::reply(
                    "Tu pedido está en camino, llega en las próximas 48 horas.",
                )
                .with_patch("order", serde_json::to_value(&order)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn() -> Turn {
        Turn {
            tenant_id: "T1".into(),
            wa_id: "U1".into(),
            message_id: "m5".into(),
            text: "¿Dónde está mi pedido 1234?".into(),
            payload: None,
            timestamp: "2025-01-01T00:00:00Z".into(),
        }
    }

    #[tokio::test]
    async fn unverified_lookup_asks_for_verification() {
        let agent = OrderAgent::new();
        let response = agent
            .handle(&turn(), &SessionState::default(), "order_status")
            .await
            .unwrap();
        assert!(response.state_patch.is_empty());
        assert!(response.messages[0]
            .body
            .as_deref()
            .unwrap()
            .contains("seguridad"));
    }

    #[tokio::test]
    async fn verification_marks_the_order_slice() {
        let agent = OrderAgent::new();
        let response = agent
            .handle(&turn(), &SessionState::default(), "verify_order")
            .await
            .unwrap();
        let order = response.state_patch.get("order").unwrap();
        assert_eq!(order["verified"], true);
        assert_eq!(order["verified_at"], "2025-01-01T00:00:00Z");
        assert_eq!(response.state_patch.get("phone_verified"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn verified_lookup_records_history() {
        let agent = OrderAgent::new();
        let mut state = SessionState::default();
        state.order.verified = true;

        let response = agent.handle(&turn(), &state, "order_status").await.unwrap();
        let order = response.state_patch.get("order").unwrap();
        assert_eq!(order["lookup_history"].as_array().unwrap().len(), 1);
        assert!(order["last_lookup"]["query"]
            .as_str()
            .unwrap()
            .contains("1234"));
    }
}
