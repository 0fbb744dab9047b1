use std::fmt;
use std::sync::Arc;

use cadena_domain::config::Config;
use cadena_router::IntentRouter;
use cadena_sessions::KvStore;

use crate::runtime::agents::AgentRegistry;
use crate::runtime::job::OrchestrationJob;
use crate::runtime::turn::TurnController;

/// Shared application state wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// The session key–value store.
    pub store: Arc<dyn KvStore>,
    /// Intent router (owns the decision log).
    pub router: Arc<IntentRouter>,
    /// Lane → agent registry.
    pub agents: Arc<AgentRegistry>,
    /// The turn orchestration core.
    pub controller: Arc<TurnController>,
    /// Per-message unit of work driven by the worker pool.
    pub job: Arc<OrchestrationJob>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
