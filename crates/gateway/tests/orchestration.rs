//! End-to-end orchestration scenarios: the full controller loop against
//! the in-memory store, a scripted decision model, and real (or scripted)
//! lane agents.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use cadena_domain::config::{LaneDef, SessionsConfig};
use cadena_domain::{Error, Lane, LaneSet, Result, Turn};
use cadena_router::{IntentRouter, ScriptedModel};
use cadena_sessions::{KvStore, MemoryStore, StateBuilder, StateValidator};

use cadena_gateway::runtime::{
    AgentRegistry, AgentResponse, Baton, LaneAgent, TurnController,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Harness
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn lane_map() -> BTreeMap<String, LaneDef> {
    let mut map = BTreeMap::new();
    for (id, default) in [
        ("info", true),
        ("commerce", false),
        ("support", false),
        ("order", false),
    ] {
        map.insert(
            id.to_owned(),
            LaneDef {
                handler: id.to_owned(),
                description: format!("{id} lane"),
                default,
                model: None,
            },
        );
    }
    map
}

struct Harness {
    store: Arc<MemoryStore>,
    router: Arc<IntentRouter>,
    controller: TurnController,
}

fn harness(responses: Vec<Result<Value>>) -> Harness {
    let registry = AgentRegistry::from_config(&lane_map()).unwrap();
    harness_with_registry(responses, registry)
}

fn harness_with_registry(responses: Vec<Result<Value>>, registry: AgentRegistry) -> Harness {
    let lanes = LaneSet::from_config(&lane_map()).unwrap();
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn KvStore> = store.clone();

    let router = Arc::new(IntentRouter::new(
        Some(Arc::new(ScriptedModel::new(responses))),
        lanes.clone(),
        Duration::from_secs(1),
        16,
    ));

    let controller = TurnController::new(
        dyn_store,
        router.clone(),
        Arc::new(registry),
        StateBuilder::new(lanes.default_lane().clone(), "es-CO", "America/Bogota"),
        StateValidator::new(lanes.clone()),
        lanes,
        SessionsConfig::default(),
    );

    Harness {
        store,
        router,
        controller,
    }
}

fn turn(message_id: &str, text: &str) -> Turn {
    Turn {
        tenant_id: "T1".into(),
        wa_id: "U1".into(),
        message_id: message_id.into(),
        text: text.into(),
        payload: None,
        timestamp: "2025-01-01T00:00:00Z".into(),
    }
}

async fn session_json(store: &MemoryStore) -> Value {
    let raw = store.get("session:T1:U1").await.unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scripted agents for chain scenarios
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Replies once and always hands the baton to `target`.
struct ChainAgent {
    label: String,
    target: Lane,
    invocations: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl LaneAgent for ChainAgent {
    async fn handle(
        &self,
        _turn: &Turn,
        _state: &cadena_sessions::SessionState,
        _intent: &str,
    ) -> Result<AgentResponse> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(AgentResponse::reply(format!("hop from {}", self.label))
            .with_baton(Baton::to(self.target.clone())))
    }
}

/// Returns no messages and no patch.
struct SilentAgent;

#[async_trait::async_trait]
impl LaneAgent for SilentAgent {
    async fn handle(
        &self,
        _turn: &Turn,
        _state: &cadena_sessions::SessionState,
        _intent: &str,
    ) -> Result<AgentResponse> {
        Ok(AgentResponse::default())
    }
}

/// Always fails.
struct FailingAgent;

#[async_trait::async_trait]
impl LaneAgent for FailingAgent {
    async fn handle(
        &self,
        _turn: &Turn,
        _state: &cadena_sessions::SessionState,
        _intent: &str,
    ) -> Result<AgentResponse> {
        Err(Error::Agent {
            lane: "info".into(),
            message: "tool backend unreachable".into(),
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scenario: fresh greeting
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn fresh_greeting_creates_the_session() {
    let h = harness(vec![ScriptedModel::decision("info", "greeting", 0.9, &["hola"])]);

    let result = h.controller.handle_turn(&turn("m1", "Hola")).await.unwrap();

    assert!(result.success);
    assert_eq!(result.error, None);
    assert_eq!(result.lane.unwrap().as_str(), "info");
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.messages[0].kind, "text");
    assert!(result.messages[0].body.as_deref().unwrap().contains("Hola"));

    let session = session_json(&h.store).await;
    assert_eq!(session["current_lane"], "info");
    assert_eq!(session["turns"].as_array().unwrap().len(), 2);
    assert_eq!(session["turns"][0]["role"], "user");
    assert_eq!(session["turns"][0]["message_id"], "m1");
    assert_eq!(session["turns"][1]["role"], "assistant");
    assert_eq!(session["turns"][1]["lane"], "info");
    assert_eq!(session["last_user_msg_id"], "m1");

    assert!(h.store.exists("turn:processed:m1").await.unwrap());
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scenario: replay
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn replaying_a_message_is_a_pure_noop() {
    let h = harness(vec![ScriptedModel::decision("info", "greeting", 0.9, &["hola"])]);
    let t = turn("m1", "Hola");

    let first = h.controller.handle_turn(&t).await.unwrap();
    assert!(first.success);

    let raw_before = h.store.get("session:T1:U1").await.unwrap().unwrap();

    let second = h.controller.handle_turn(&t).await.unwrap();
    assert!(second.success);
    assert_eq!(second.error.as_deref(), Some("duplicate_turn"));
    assert!(second.messages.is_empty());
    assert_eq!(second.lane, None);

    let raw_after = h.store.get("session:T1:U1").await.unwrap().unwrap();
    assert_eq!(raw_before, raw_after, "replay must not touch the session");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scenario: baton hop info → commerce
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn info_hands_an_order_off_to_commerce() {
    let h = harness(vec![
        ScriptedModel::decision("info", "greeting", 0.9, &["hola"]),
        ScriptedModel::decision("info", "start_order", 0.7, &["wants to order"]),
    ]);

    h.controller.handle_turn(&turn("m1", "Hola")).await.unwrap();
    let result = h
        .controller
        .handle_turn(&turn("m2", "Quiero ordenar"))
        .await
        .unwrap();

    assert!(result.success);
    // One message from info, one from commerce, in emission order.
    assert_eq!(result.messages.len(), 2);
    assert!(result.messages[0].body.as_deref().unwrap().contains("pedido"));
    assert!(result.messages[1].body.as_deref().unwrap().contains("empecemos"));
    assert_eq!(result.lane.unwrap().as_str(), "commerce");

    let session = session_json(&h.store).await;
    assert_eq!(session["current_lane"], "commerce");
    // m1: user + assistant; m2: user + assistant(info) + assistant(commerce).
    let turns = session["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 5);
    assert_eq!(turns[3]["lane"], "info");
    assert_eq!(turns[4]["lane"], "commerce");
    assert_eq!(session["commerce_state"], "browsing");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scenario: baton cap
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn hop_limit_caps_the_chain_at_three_agent_calls() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::new();
    // Every lane's agent emits a valid baton to the next lane: without the
    // cap the chain would run forever around the cycle.
    for (lane, next) in [
        ("info", "commerce"),
        ("commerce", "support"),
        ("support", "order"),
        ("order", "info"),
    ] {
        registry.register(
            Lane::new(lane),
            Arc::new(ChainAgent {
                label: lane.into(),
                target: Lane::new(next),
                invocations: invocations.clone(),
            }),
        );
    }

    let h = harness_with_registry(
        vec![ScriptedModel::decision("info", "ping", 0.9, &[])],
        registry,
    );
    let result = h.controller.handle_turn(&turn("m1", "hola")).await.unwrap();

    assert!(result.success);
    assert_eq!(invocations.load(Ordering::SeqCst), 3);
    assert_eq!(result.messages.len(), 3);
    // hop 0 = info, hop 1 = commerce, hop 2 = support; support's baton to
    // order hits the limit.
    assert_eq!(result.lane.unwrap().as_str(), "support");

    let session = session_json(&h.store).await;
    assert_eq!(session["turns"].as_array().unwrap().len(), 4);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scenario: validator corruption
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn corrupt_session_is_reset_and_never_retried() {
    let h = harness(vec![ScriptedModel::decision("info", "greeting", 0.9, &[])]);
    h.store
        .setex("session:T1:U1", 3_600, r#"{"current_lane":"BOGUS"}"#)
        .await
        .unwrap();

    let result = h.controller.handle_turn(&turn("m9", "hola")).await.unwrap();

    assert!(!result.success);
    assert!(result
        .error
        .as_deref()
        .unwrap()
        .starts_with("Session validation failed"));
    assert!(result.messages.is_empty());

    // The session was overwritten with a fresh default state.
    let session = session_json(&h.store).await;
    assert_eq!(session["tenant_id"], "T1");
    assert_eq!(session["wa_id"], "U1");
    assert_eq!(session["current_lane"], "info");
    assert_eq!(session["turns"].as_array().unwrap().len(), 0);

    // Marked processed: no infinite retry loop.
    assert!(h.store.exists("turn:processed:m9").await.unwrap());
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scenario: router exception
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn router_failure_still_produces_a_turn_result() {
    // An exhausted scripted model fails every call.
    let h = harness(vec![]);

    let result = h.controller.handle_turn(&turn("m1", "Hola")).await.unwrap();

    // The default lane's agent handled the fallback intent.
    assert!(result.success);
    assert_eq!(result.lane.unwrap().as_str(), "info");
    assert_eq!(result.messages.len(), 1);

    let recent = h.router.decision_log().recent(1);
    assert!(recent[0].fallback);
    assert!(recent[0].reasons[0].starts_with("router_error:"));
    assert_eq!(recent[0].lane.as_str(), "info");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Boundary behaviors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn empty_agent_response_is_a_valid_turn() {
    let mut registry = AgentRegistry::new();
    registry.register(Lane::new("info"), Arc::new(SilentAgent));

    let h = harness_with_registry(
        vec![ScriptedModel::decision("info", "greeting", 0.9, &[])],
        registry,
    );
    let result = h.controller.handle_turn(&turn("m1", "hola")).await.unwrap();

    assert!(result.success);
    assert!(result.messages.is_empty());

    // Dialogue still gains a user entry and an (empty) assistant entry.
    let session = session_json(&h.store).await;
    let turns = session["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1]["messages"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn self_handoff_stops_the_chain() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::new();
    registry.register(
        Lane::new("info"),
        Arc::new(ChainAgent {
            label: "info".into(),
            target: Lane::new("info"),
            invocations: invocations.clone(),
        }),
    );

    let h = harness_with_registry(
        vec![ScriptedModel::decision("info", "ping", 0.9, &[])],
        registry,
    );
    let result = h.controller.handle_turn(&turn("m1", "hola")).await.unwrap();

    assert!(result.success);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(result.lane.unwrap().as_str(), "info");
}

#[tokio::test]
async fn baton_to_an_unconfigured_lane_stops_the_chain() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let mut registry = AgentRegistry::new();
    registry.register(
        Lane::new("info"),
        Arc::new(ChainAgent {
            label: "info".into(),
            target: Lane::new("billing"),
            invocations: invocations.clone(),
        }),
    );

    let h = harness_with_registry(
        vec![ScriptedModel::decision("info", "ping", 0.9, &[])],
        registry,
    );
    let result = h.controller.handle_turn(&turn("m1", "hola")).await.unwrap();

    assert!(result.success);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(result.lane.unwrap().as_str(), "info");
}

#[tokio::test]
async fn agent_failure_keeps_the_user_turn_and_marks_processed() {
    let mut registry = AgentRegistry::new();
    registry.register(Lane::new("info"), Arc::new(FailingAgent));

    let h = harness_with_registry(
        vec![ScriptedModel::decision("info", "greeting", 0.9, &[])],
        registry,
    );
    let t = turn("m1", "hola");
    let result = h.controller.handle_turn(&t).await.unwrap();

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("unreachable"));

    // The user's inbound entry was persisted before the agent ran.
    let session = session_json(&h.store).await;
    let turns = session["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0]["role"], "user");

    // Marked processed: the failure is final, replay is a no-op.
    assert!(h.store.exists("turn:processed:m1").await.unwrap());
    let replay = h.controller.handle_turn(&t).await.unwrap();
    assert_eq!(replay.error.as_deref(), Some("duplicate_turn"));
}

#[tokio::test]
async fn carry_state_is_merged_before_the_next_hop() {
    struct CarryAgent;

    #[async_trait::async_trait]
    impl LaneAgent for CarryAgent {
        async fn handle(
            &self,
            _turn: &Turn,
            _state: &cadena_sessions::SessionState,
            _intent: &str,
        ) -> Result<AgentResponse> {
            let mut carry = serde_json::Map::new();
            carry.insert("commerce_state".into(), serde_json::json!("handoff"));
            let mut payload = cadena_gateway::runtime::BatonPayload::default();
            payload.intent = Some("start_order".into());
            payload.carry_state = Some(carry);
            Ok(
                AgentResponse::reply("te paso con ventas").with_baton(Baton {
                    target: Lane::new("commerce"),
                    payload: Some(payload),
                }),
            )
        }
    }

    /// Echoes the commerce_state it observed when invoked.
    struct ObservingAgent;

    #[async_trait::async_trait]
    impl LaneAgent for ObservingAgent {
        async fn handle(
            &self,
            _turn: &Turn,
            state: &cadena_sessions::SessionState,
            intent: &str,
        ) -> Result<AgentResponse> {
            Ok(AgentResponse::reply(format!(
                "saw {} with intent {intent}",
                state.commerce_state.as_deref().unwrap_or("none"),
            )))
        }
    }

    let mut registry = AgentRegistry::new();
    registry.register(Lane::new("info"), Arc::new(CarryAgent));
    registry.register(Lane::new("commerce"), Arc::new(ObservingAgent));

    let h = harness_with_registry(
        vec![ScriptedModel::decision("info", "ping", 0.9, &[])],
        registry,
    );
    let result = h.controller.handle_turn(&turn("m1", "hola")).await.unwrap();

    assert!(result.success);
    assert_eq!(
        result.messages[1].body.as_deref(),
        Some("saw handoff with intent start_order")
    );
}
