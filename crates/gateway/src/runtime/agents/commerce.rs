//! The commerce lane — catalog, cart and quoting.

use serde_json::json;

use cadena_domain::{Result, Turn};
use cadena_sessions::SessionState;

use super::{AgentResponse, LaneAgent};

pub struct CommerceAgent;

impl CommerceAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CommerceAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LaneAgent for CommerceAgent {
    async fn handle(
        &self,
        turn: &Turn,
        state: &SessionState,
        intent: &str,
    ) -> Result<AgentResponse> {
        match intent {
            "start_order" => Ok(AgentResponse::reply(
                "Perfecto, empecemos tu pedido. ¿Qué productos te interesan?",
            )
            .with_patch("commerce_state", json!("browsing"))),

            "add_to_cart" => {
                // Interactive payloads carry the selected item; plain text
                // falls back to the message itself as a free-form line.
                let item = turn
                    .payload
                    .clone()
                    .unwrap_or_else(|| json!({ "freeform": turn.text }));

                let mut cart = state.cart.clone();
                cart.items.push(item);

                Ok(AgentResponse::reply(format!(
                    "Agregado al carrito. Llevas {} producto(s).",
                    cart.items.len()
                ))
                .with_patch("cart", serde_json::to_value(&cart)?)
                .with_patch("commerce_state", json!("carting")))
            }

            "quote" => {
                let quote = json!({
                    "subtotal_cents": state.cart.subtotal_cents,
                    "currency": state.cart.currency,
                    "items": state.cart.items.len(),
                });
                Ok(AgentResponse::reply(format!(
                    "Tu cotización: {} producto(s), subtotal {} {}.",
                    state.cart.items.len(),
                    state.cart.subtotal_cents as f64 / 100.0,
                    state.cart.currency,
                ))
                .with_patch("last_quote", quote)
                .with_patch("commerce_state", json!("quoted")))
            }

            _ => Ok(AgentResponse::reply(
                "¿Te gustaría ver el catálogo o continuar con tu carrito?",
            )),
        }
    }
}
