//! The decision-model contract the router speaks.

use cadena_domain::Result;
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A structured-output classification request.
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    /// Templated system prompt (lane catalog + instructions).
    pub system_prompt: String,
    /// The single user message: state summary + inbound text.
    pub user_message: String,
    /// JSON Schema constraining the model output.
    pub schema: Value,
    /// Model override.  `None` uses the adapter's configured model.
    pub model: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Model trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An LLM endpoint able to answer a classification request with a JSON
/// object conforming to the request schema.
///
/// Implementations may fail freely — the [`crate::IntentRouter`] absorbs
/// every error into its fallback path.
#[async_trait::async_trait]
pub trait DecisionModel: Send + Sync {
    /// Run the request and return the raw structured output.
    async fn decide(&self, req: DecisionRequest) -> Result<Value>;

    /// Identifier of the backing model, for logs.
    fn model_id(&self) -> &str;
}
