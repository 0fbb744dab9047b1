//! Core runtime — the orchestrator that ties the session store, intent
//! router, and lane agents into one deterministic per-message loop.
//!
//! Entry points: [`TurnController::handle_turn`] processes one normalized
//! turn; [`job::OrchestrationJob`] wraps it with job-scope idempotency and
//! is driven by the [`worker::WorkerPool`].

pub mod agents;
pub mod job;
pub mod turn;
pub mod turn_builder;
pub mod worker;

pub use agents::{AgentRegistry, AgentResponse, Baton, BatonPayload, LaneAgent};
pub use job::{JobOutcome, OrchestrationJob, SkipReason};
pub use turn::{TurnController, TurnResult};
pub use turn_builder::TurnBuilder;
pub use worker::WorkerPool;

/// Current time as an RFC 3339 UTC string with second precision — the
/// timestamp format used throughout the session state.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
