//! LLM-backed intent routing for the Cadena orchestrator.
//!
//! The [`IntentRouter`] maps a turn + session state to a
//! [`RouterDecision`] (lane, intent, confidence, reasons).  The LLM call
//! and the decision assembly are separate paths that converge on the
//! same shape — the router is total and never raises toward the
//! controller.

mod decision;
mod decisions;
mod openai_compat;
mod prompt;
mod router;
mod scripted;
mod traits;

pub use decision::RouterDecision;
pub use decisions::{DecisionLog, DecisionRecord};
pub use openai_compat::OpenAiCompatModel;
pub use router::IntentRouter;
pub use scripted::ScriptedModel;
pub use traits::{DecisionModel, DecisionRequest};
