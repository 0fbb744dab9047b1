//! Parallel workers draining the inbound message queue.
//!
//! Each message runs to completion on one worker.  Retryable
//! (infrastructure) failures are retried in place with polynomial backoff
//! — attempt² seconds — up to the configured attempt limit; turn-level
//! failures are final.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::Instrument;

use cadena_domain::InboundMessage;

use super::job::{JobOutcome, OrchestrationJob};

pub struct WorkerPool;

impl WorkerPool {
    /// Spawn `count` workers draining `rx`.  The pool winds down when the
    /// sending side is dropped and the queue is empty; await the returned
    /// handles to drain cleanly.
    pub fn spawn(
        job: Arc<OrchestrationJob>,
        count: usize,
        max_attempts: u32,
        rx: mpsc::Receiver<InboundMessage>,
    ) -> Vec<JoinHandle<()>> {
        let rx = Arc::new(Mutex::new(rx));

        (0..count)
            .map(|worker_id| {
                let job = job.clone();
                let rx = rx.clone();
                tokio::spawn(async move {
                    loop {
                        let msg = { rx.lock().await.recv().await };
                        let Some(msg) = msg else { break };

                        let run_id = uuid::Uuid::new_v4();
                        let span = tracing::info_span!(
                            "orchestrate",
                            %run_id,
                            worker_id,
                            message_id = %msg.id,
                        );
                        run_with_retries(&job, &msg, max_attempts)
                            .instrument(span)
                            .await;
                    }
                    tracing::debug!(worker_id, "worker stopped");
                })
            })
            .collect()
    }
}

/// Process one message, retrying retryable failures with attempt² backoff.
async fn run_with_retries(job: &OrchestrationJob, msg: &InboundMessage, max_attempts: u32) {
    for attempt in 1..=max_attempts {
        match job.process(msg).await {
            Ok(JobOutcome::Completed(result)) => {
                if result.success {
                    tracing::info!(
                        lane = result.lane.as_ref().map(|l| l.as_str()).unwrap_or(""),
                        messages = result.messages.len(),
                        "message orchestrated"
                    );
                } else {
                    tracing::warn!(
                        error = result.error.as_deref().unwrap_or(""),
                        "turn failed"
                    );
                }
                return;
            }
            Ok(JobOutcome::Skipped(reason)) => {
                tracing::debug!(%reason, "message skipped");
                return;
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let backoff = Duration::from_secs(u64::from(attempt * attempt));
                tracing::warn!(
                    error = %e,
                    attempt,
                    backoff_secs = backoff.as_secs(),
                    "retryable failure, backing off"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                tracing::error!(error = %e, attempt, "giving up on message");
                return;
            }
        }
    }
}
