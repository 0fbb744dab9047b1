//! The info lane — greetings and general business information.

use cadena_domain::{Lane, Result, Turn};
use cadena_sessions::SessionState;

use super::{AgentResponse, Baton, LaneAgent};

/// Handles greetings and catch-all questions.  When the user wants to
/// start an order, hands the turn off to the commerce lane.
pub struct InfoAgent {
    commerce_lane: Option<Lane>,
}

impl InfoAgent {
    pub fn new(commerce_lane: Option<Lane>) -> Self {
        Self { commerce_lane }
    }
}

#[async_trait::async_trait]
impl LaneAgent for InfoAgent {
    async fn handle(
        &self,
        _turn: &Turn,
        state: &SessionState,
        intent: &str,
    ) -> Result<AgentResponse> {
        match intent {
            "greeting" => {
                let name_hint = if state.customer_id.is_some() {
                    " de nuevo"
                } else {
                    ""
                };
                Ok(AgentResponse::reply(format!(
                    "¡Hola{name_hint}! Soy el asistente virtual. ¿En qué puedo ayudarte hoy?"
                )))
            }
            "start_order" => {
                let response = AgentResponse::reply(
                    "Con gusto te ayudo con tu pedido, dame un momento.",
                );
                match &self.commerce_lane {
                    Some(lane) => Ok(response
                        .with_baton(Baton::to(lane.clone()).with_intent("start_order"))),
                    // No commerce lane configured: answer in place.
                    None => Ok(response),
                }
            }
            "hours" => Ok(AgentResponse::reply(
                "Atendemos de lunes a sábado, de 9:00 a 19:00.",
            )),
            _ => Ok(AgentResponse::reply(
                "Puedo ayudarte con pedidos, estado de órdenes y soporte. ¿Qué necesitas?",
            )),
        }
    }
}
