//! Startup wiring: config validation, collaborator construction, and the
//! serve loop.
//!
//! Configuration errors are fatal here — a mis-wired lane registry must
//! never reach job execution.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use cadena_domain::config::Config;
use cadena_domain::{Error, InboundMessage, LaneSet, Result};
use cadena_router::{DecisionModel, IntentRouter, OpenAiCompatModel};
use cadena_sessions::{KvStore, MemoryStore, StateBuilder, StateValidator};

use crate::runtime::agents::AgentRegistry;
use crate::runtime::job::OrchestrationJob;
use crate::runtime::turn::TurnController;
use crate::runtime::worker::WorkerPool;
use crate::state::AppState;

/// Depth of the inbound ingest queue.
const INGEST_QUEUE_DEPTH: usize = 256;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// State construction
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Validate the config and build every collaborator.
pub fn build_state(config: Arc<Config>) -> Result<AppState> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            cadena_domain::config::ConfigSeverity::Error => {
                tracing::error!(field = %issue.field, "{}", issue.message);
            }
            cadena_domain::config::ConfigSeverity::Warning => {
                tracing::warn!(field = %issue.field, "{}", issue.message);
            }
        }
    }
    if Config::has_errors(&issues) {
        return Err(Error::Config(
            "configuration is invalid, refusing to start".into(),
        ));
    }

    let lanes = LaneSet::from_config(&config.lanes)?;

    let store: Arc<dyn KvStore> = match config.store.backend.as_str() {
        "memory" => Arc::new(MemoryStore::new()),
        other => {
            return Err(Error::Config(format!(
                "unknown store backend `{other}` (only `memory` ships in-tree)"
            )));
        }
    };

    let model: Option<Arc<dyn DecisionModel>> = if config.router.model.is_empty() {
        None
    } else {
        Some(Arc::new(OpenAiCompatModel::from_config(&config.router)?))
    };
    let router = Arc::new(IntentRouter::new(
        model,
        lanes.clone(),
        Duration::from_millis(config.router.timeout_ms),
        config.router.decision_log_capacity,
    ));

    let agents = Arc::new(AgentRegistry::from_config(&config.lanes)?);

    let builder = StateBuilder::new(
        lanes.default_lane().clone(),
        config.sessions.default_locale.clone(),
        config.sessions.default_timezone.clone(),
    );
    let validator = StateValidator::new(lanes.clone());

    let controller = Arc::new(TurnController::new(
        store.clone(),
        router.clone(),
        agents.clone(),
        builder,
        validator,
        lanes,
        config.sessions.clone(),
    ));
    let job = Arc::new(OrchestrationJob::new(controller.clone(), store.clone()));

    Ok(AppState {
        config,
        store,
        router,
        agents,
        controller,
        job,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Serve loop
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Start the worker pool and feed it stored messages read as
/// newline-delimited JSON from stdin (the webhook ingestion layer sits in
/// front of this process and is out of scope here).  Exits when stdin
/// closes and the queue has drained.
pub async fn run(config: Arc<Config>) -> anyhow::Result<()> {
    let state = build_state(config.clone()).context("failed to build application state")?;

    let (tx, rx) = mpsc::channel::<InboundMessage>(INGEST_QUEUE_DEPTH);
    let handles = WorkerPool::spawn(
        state.job.clone(),
        config.workers.count,
        config.workers.max_attempts,
        rx,
    );

    tracing::info!(
        workers = config.workers.count,
        lanes = state.agents.len(),
        store = %config.store.backend,
        "cadena orchestrator ready, reading messages from stdin"
    );

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<InboundMessage>(&line) {
            Ok(msg) => {
                if tx.send(msg).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unparseable inbound line");
            }
        }
    }

    // Closing the sender lets the workers drain and stop.
    drop(tx);
    for handle in handles {
        handle.await.context("worker panicked")?;
    }

    tracing::info!("cadena orchestrator stopped");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
