//! The turn controller — `handle_turn` and the baton-bounded agent loop.
//!
//! Order of operations per turn: idempotency gate → load/create session →
//! validate → append user entry (persisted before any agent runs) →
//! route → invoke agent → apply patch → optional baton hops → mark
//! processed.  The user's inbound entry surviving downstream failures and
//! the bounded baton chain are the two load-bearing guarantees here.

use std::sync::Arc;

use tracing::Instrument;

use cadena_domain::config::SessionsConfig;
use cadena_domain::{Lane, LaneSet, OutboundMessage, Result, Turn};
use cadena_router::{IntentRouter, RouterDecision};
use cadena_sessions::{
    idempotency_key, session_key, DialogueEntry, KvStore, SessionState, StateBuilder,
    StateValidator,
};

use super::agents::{AgentRegistry, Baton};
use super::now_rfc3339;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TurnResult
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Outcome of one `handle_turn` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub success: bool,
    pub error: Option<String>,
    /// Messages accumulated across the whole baton chain, in emission
    /// order.  The Sender collaborator delivers these.
    pub messages: Vec<OutboundMessage>,
    /// The lane that handled the final hop.
    pub lane: Option<Lane>,
}

impl TurnResult {
    /// A replayed message: success, no work done.
    fn duplicate() -> Self {
        Self {
            success: true,
            error: Some("duplicate_turn".into()),
            messages: Vec::new(),
            lane: None,
        }
    }

    fn failed(error: String, lane: Option<Lane>) -> Self {
        Self {
            success: false,
            error: Some(error),
            messages: Vec::new(),
            lane,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TurnController
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Orchestrates one turn end to end.  All collaborators are injected at
/// construction; the controller owns every session-store write.
pub struct TurnController {
    store: Arc<dyn KvStore>,
    router: Arc<IntentRouter>,
    agents: Arc<AgentRegistry>,
    builder: StateBuilder,
    validator: StateValidator,
    lanes: LaneSet,
    cfg: SessionsConfig,
}

impl TurnController {
    pub fn new(
        store: Arc<dyn KvStore>,
        router: Arc<IntentRouter>,
        agents: Arc<AgentRegistry>,
        builder: StateBuilder,
        validator: StateValidator,
        lanes: LaneSet,
        cfg: SessionsConfig,
    ) -> Self {
        Self {
            store,
            router,
            agents,
            builder,
            validator,
            lanes,
            cfg,
        }
    }

    /// Process one turn.  `Err` is reserved for infrastructure failures
    /// (store I/O) that the job layer retries; every turn-level outcome —
    /// including duplicates, corrupt sessions, and agent failures — comes
    /// back as a [`TurnResult`].
    pub async fn handle_turn(&self, turn: &Turn) -> Result<TurnResult> {
        let span = tracing::info_span!(
            "turn",
            message_id = %turn.message_id,
            tenant_id = %turn.tenant_id,
            wa_id = %turn.wa_id,
        );
        self.handle_turn_inner(turn).instrument(span).await
    }

    async fn handle_turn_inner(&self, turn: &Turn) -> Result<TurnResult> {
        // ── 1. Idempotency gate ───────────────────────────────────
        // Inbound delivery is at-least-once; a marked message is done.
        if self.store.exists(&idempotency_key(&turn.message_id)).await? {
            tracing::debug!("duplicate turn, skipping");
            return Ok(TurnResult::duplicate());
        }

        // ── 2. Load or create the session ─────────────────────────
        let skey = session_key(&turn.tenant_id, &turn.wa_id);
        let mut state = match self.store.get(&skey).await? {
            Some(raw) => self.builder.from_json(&raw),
            None => {
                let mut fresh = self
                    .builder
                    .new_session(&turn.tenant_id, &turn.wa_id);
                self.persist(&skey, &mut fresh).await?;
                tracing::info!(session_key = %skey, "created new session");
                fresh
            }
        };

        // ── 3. Validate ───────────────────────────────────────────
        // Validation failure means local corruption: recover with a fresh
        // session and mark the message processed so it is never retried.
        if let Err(e) = self.validator.validate(&state) {
            tracing::error!(error = %e, session_key = %skey, "session failed validation, resetting");
            let mut fresh = self
                .builder
                .new_session(&turn.tenant_id, &turn.wa_id);
            self.persist(&skey, &mut fresh).await?;
            self.mark_processed(&turn.message_id).await?;
            return Ok(TurnResult::failed(
                format!("Session validation failed: {e}"),
                None,
            ));
        }

        // ── 4. Append the user turn ───────────────────────────────
        // Persisted before any agent runs so the user's message survives
        // downstream failures.
        state.turns.push(DialogueEntry::User {
            message_id: turn.message_id.clone(),
            text: turn.text.clone(),
            payload: turn.payload.clone(),
            timestamp: turn.timestamp.clone(),
        });
        state.last_user_msg_id = Some(turn.message_id.clone());
        self.persist(&skey, &mut state).await?;

        // ── 5. Baton-bounded agent loop ───────────────────────────
        let mut hop: u32 = 0;
        let mut accumulated: Vec<OutboundMessage> = Vec::new();
        let mut decision = self.router.route(turn, &state).await;

        loop {
            state.current_lane = decision.lane.clone();

            let Some(agent) = self.agents.for_lane(&decision.lane) else {
                // Registry and lane set come from the same config; a miss
                // here is a wiring bug.
                tracing::error!(lane = %decision.lane, "no agent registered for routed lane");
                self.mark_processed(&turn.message_id).await?;
                return Ok(TurnResult::failed(
                    format!("no agent registered for lane `{}`", decision.lane),
                    Some(decision.lane.clone()),
                ));
            };

            tracing::debug!(
                lane = %decision.lane,
                intent = %decision.intent,
                confidence = decision.confidence,
                hop,
                "invoking agent"
            );

            let response = match agent.handle(turn, &state, &decision.intent).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(lane = %decision.lane, error = %e, "agent failed");
                    self.mark_processed(&turn.message_id).await?;
                    return Ok(TurnResult::failed(
                        e.to_string(),
                        Some(decision.lane.clone()),
                    ));
                }
            };

            accumulated.extend(response.messages.iter().cloned());
            state.turns.push(DialogueEntry::Assistant {
                lane: decision.lane.clone(),
                messages: response.messages.clone(),
                timestamp: now_rfc3339(),
            });

            // Shallow-merge the agent's patch, then any carried state.  A
            // patch the state cannot absorb is an agent defect, handled
            // like an agent failure.
            let patched = state.apply_patch(&response.state_patch).and_then(|s| {
                match response
                    .baton
                    .as_ref()
                    .and_then(|b| b.payload.as_ref())
                    .and_then(|p| p.carry_state.as_ref())
                {
                    Some(carry) => s.apply_patch(carry),
                    None => Ok(s),
                }
            });
            state = match patched {
                Ok(next) => next,
                Err(e) => {
                    tracing::error!(lane = %decision.lane, error = %e, "agent state patch rejected");
                    self.mark_processed(&turn.message_id).await?;
                    return Ok(TurnResult::failed(
                        e.to_string(),
                        Some(decision.lane.clone()),
                    ));
                }
            };

            self.persist(&skey, &mut state).await?;

            // ── Continue the chain? ───────────────────────────────
            let Some(baton) = response.baton else { break };

            if hop >= self.cfg.max_baton_hops {
                tracing::info!(
                    reason = "hop_limit",
                    hop,
                    target = %baton.target,
                    "baton_stop"
                );
                break;
            }
            if !self.lanes.contains(&baton.target) {
                tracing::warn!(
                    reason = "invalid_lane",
                    target = %baton.target,
                    "baton_stop"
                );
                break;
            }
            if baton.target == state.current_lane {
                tracing::warn!(
                    reason = "same_lane_handoff",
                    target = %baton.target,
                    "baton_stop"
                );
                break;
            }

            hop += 1;
            decision = synthesize_decision(&baton, &decision);
        }

        // ── 6. Mark processed ─────────────────────────────────────
        self.mark_processed(&turn.message_id).await?;

        // ── 7. Done ───────────────────────────────────────────────
        tracing::info!(
            lane = %state.current_lane,
            messages = accumulated.len(),
            hops = hop,
            "turn complete"
        );
        Ok(TurnResult {
            success: true,
            error: None,
            messages: accumulated,
            lane: Some(state.current_lane.clone()),
        })
    }

    /// Refresh `updated_at` and write the session with its TTL.
    async fn persist(&self, skey: &str, state: &mut SessionState) -> Result<()> {
        state.updated_at = Some(now_rfc3339());
        let raw = serde_json::to_string(state)?;
        self.store
            .setex(skey, self.cfg.session_ttl_secs, &raw)
            .await
    }

    async fn mark_processed(&self, message_id: &str) -> Result<()> {
        self.store
            .setex(
                &idempotency_key(message_id),
                self.cfg.idempotency_ttl_secs,
                "1",
            )
            .await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Baton decision synthesis
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build the next hop's decision from a baton: the payload's routing
/// hints win, then the previous decision, then fixed fallbacks.
fn synthesize_decision(baton: &Baton, previous: &RouterDecision) -> RouterDecision {
    let payload = baton.payload.as_ref();

    let intent = payload
        .and_then(|p| p.intent.clone())
        .or_else(|| (!previous.intent.is_empty()).then(|| previous.intent.clone()))
        .unwrap_or_else(|| "follow_up".into());

    let confidence = payload
        .and_then(|p| p.confidence)
        .unwrap_or(previous.confidence);

    let reasons = payload
        .and_then(|p| p.reasons.clone())
        .unwrap_or_else(|| vec!["baton_handoff".into()]);

    RouterDecision::new(baton.target.clone(), intent, confidence, reasons)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
