//! The orchestration job — the unit of work scheduled per stored message.
//!
//! Adds a coarse second idempotency layer (`orchestrated:<message_id>`)
//! above the controller's per-turn marker, and filters out messages that
//! must never be orchestrated (outbound records, provider errors,
//! unsupported types).  Delivery of the produced messages is the Sender
//! collaborator's job, never this one's.

use std::fmt;
use std::sync::Arc;

use cadena_domain::{Direction, InboundMessage, MessageKind, Result};
use cadena_sessions::{orchestrated_key, KvStore};

use super::turn::{TurnController, TurnResult};
use super::turn_builder::TurnBuilder;

/// TTL of the job-scope `orchestrated:` marker.
const ORCHESTRATED_TTL_SECS: u64 = 3_600;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outcomes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Why a stored message was not orchestrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The record is a message the business sent.
    Outbound,
    /// The provider reported message-level errors.
    ProviderError,
    /// The provider marked the type as unsupported.
    UnsupportedType,
    /// A previous job already handed this message to the controller.
    AlreadyOrchestrated,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Outbound => "outbound",
            Self::ProviderError => "provider_error",
            Self::UnsupportedType => "unsupported_type",
            Self::AlreadyOrchestrated => "already_orchestrated",
        };
        f.write_str(label)
    }
}

/// Result of one job run.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(TurnResult),
    Skipped(SkipReason),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// OrchestrationJob
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct OrchestrationJob {
    controller: Arc<TurnController>,
    store: Arc<dyn KvStore>,
}

impl OrchestrationJob {
    pub fn new(controller: Arc<TurnController>, store: Arc<dyn KvStore>) -> Self {
        Self { controller, store }
    }

    /// Whether this stored message is eligible for orchestration.
    pub fn skip_reason(msg: &InboundMessage) -> Option<SkipReason> {
        if msg.direction == Direction::Outbound {
            return Some(SkipReason::Outbound);
        }
        if !msg.errors.is_empty() {
            return Some(SkipReason::ProviderError);
        }
        if msg.message_kind() == MessageKind::Unsupported {
            return Some(SkipReason::UnsupportedType);
        }
        None
    }

    /// Drive one stored message through the controller.
    ///
    /// `Err` surfaces only infrastructure failures; the worker retries
    /// those with backoff.
    pub async fn process(&self, msg: &InboundMessage) -> Result<JobOutcome> {
        if let Some(reason) = Self::skip_reason(msg) {
            tracing::debug!(message_id = %msg.id, %reason, "skipping message");
            return Ok(JobOutcome::Skipped(reason));
        }

        let okey = orchestrated_key(&msg.id);
        if self.store.exists(&okey).await? {
            tracing::debug!(message_id = %msg.id, "message already orchestrated");
            return Ok(JobOutcome::Skipped(SkipReason::AlreadyOrchestrated));
        }

        let turn = TurnBuilder::build(msg)?;
        let result = self.controller.handle_turn(&turn).await?;

        // Marked after the controller returns: a crash mid-turn leaves the
        // marker unset so the scheduler's retry gets a clean run.
        self.store.setex(&okey, ORCHESTRATED_TTL_SECS, "1").await?;

        Ok(JobOutcome::Completed(result))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
