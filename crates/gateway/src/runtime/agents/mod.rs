//! The agent contract and lane registry.
//!
//! Each lane is backed by one [`LaneAgent`].  Agents consume
//! `(turn, state, intent)` and return an [`AgentResponse`] — outbound
//! messages, a flat state patch, and optionally a [`Baton`] handing the
//! turn off to another lane.  Agents never write to the session store;
//! persistence belongs to the controller alone.

mod commerce;
mod info;
mod order;
mod support;

pub use commerce::CommerceAgent;
pub use info::InfoAgent;
pub use order::OrderAgent;
pub use support::SupportAgent;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cadena_domain::config::LaneDef;
use cadena_domain::{Error, Lane, OutboundMessage, Result, Turn};
use cadena_sessions::SessionState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AgentResponse & Baton
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What one agent invocation produced.  Must survive a JSON round-trip:
/// outbound messages are opaque to the engine but not to the Sender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub messages: Vec<OutboundMessage>,
    /// Flat patch shallow-merged into the session state by the controller.
    #[serde(default)]
    pub state_patch: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baton: Option<Baton>,
}

impl AgentResponse {
    /// A single text reply with no state changes.
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            messages: vec![OutboundMessage::text(text)],
            ..Self::default()
        }
    }

    pub fn with_patch(mut self, key: &str, value: Value) -> Self {
        self.state_patch.insert(key.to_owned(), value);
        self
    }

    pub fn with_baton(mut self, baton: Baton) -> Self {
        self.baton = Some(baton);
        self
    }
}

/// An in-band request to hand the current turn off to another lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baton {
    pub target: Lane,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<BatonPayload>,
}

impl Baton {
    pub fn to(target: Lane) -> Self {
        Self {
            target,
            payload: None,
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.payload
            .get_or_insert_with(BatonPayload::default)
            .intent = Some(intent.into());
        self
    }
}

/// Optional data carried on a baton: routing hints for the synthesized
/// decision and state to merge before the next agent runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatonPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasons: Option<Vec<String>>,
    /// Shallow-merged into the session state when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry_state: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LaneAgent trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The handler implementing one lane.
#[async_trait::async_trait]
pub trait LaneAgent: Send + Sync {
    /// Process one routed turn.  Agents read state but never persist it,
    /// and must keep their patches within the documented state contract.
    async fn handle(
        &self,
        turn: &Turn,
        state: &SessionState,
        intent: &str,
    ) -> Result<AgentResponse>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AgentRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Maps lanes to their agent instances.  Built once at startup; a
/// mis-wired configuration is fatal before any job runs.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<Lane, Arc<dyn LaneAgent>>,
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry").finish_non_exhaustive()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent for a lane (used by tests and custom wiring).
    pub fn register(&mut self, lane: Lane, agent: Arc<dyn LaneAgent>) {
        self.agents.insert(lane, agent);
    }

    /// Build the registry from the configured lane map, resolving each
    /// lane's `handler` to a built-in agent factory.
    pub fn from_config(lanes: &BTreeMap<String, LaneDef>) -> Result<Self> {
        // Lanes that built-in agents may hand off to, looked up by handler
        // so lane ids stay free-form.
        let commerce_lane = lanes
            .iter()
            .find(|(_, def)| def.handler == "commerce")
            .map(|(id, _)| Lane::new(id.as_str()));

        let mut registry = Self::new();
        for (id, def) in lanes {
            let agent: Arc<dyn LaneAgent> = match def.handler.as_str() {
                "info" => Arc::new(InfoAgent::new(commerce_lane.clone())),
                "commerce" => Arc::new(CommerceAgent::new()),
                "support" => Arc::new(SupportAgent::new()),
                "order" => Arc::new(OrderAgent::new()),
                other => {
                    return Err(Error::Config(format!(
                        "lanes.{id}: unknown handler `{other}`"
                    )));
                }
            };

            tracing::info!(
                lane = %id,
                handler = %def.handler,
                default = def.default,
                "registered lane agent"
            );
            registry.register(Lane::new(id.as_str()), agent);
        }

        Ok(registry)
    }

    /// Look up the agent for a lane.
    pub fn for_lane(&self, lane: &Lane) -> Option<Arc<dyn LaneAgent>> {
        self.agents.get(lane).cloned()
    }

    /// All registered lanes (sorted).
    pub fn lanes(&self) -> Vec<Lane> {
        let mut lanes: Vec<_> = self.agents.keys().cloned().collect();
        lanes.sort();
        lanes
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
