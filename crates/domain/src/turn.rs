//! The normalized per-message turn record handed to the controller.

use serde::{Deserialize, Serialize};

/// One inbound user message, normalized for processing.
///
/// Built exclusively by the turn builder from a stored provider message;
/// `message_id` doubles as the idempotency key for the whole turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Stable identifier of the business phone number.
    pub tenant_id: String,
    /// Stable identifier of the end user.
    pub wa_id: String,
    /// Globally unique provider-assigned message id.
    pub message_id: String,
    /// Rendered textual representation, including synthesized placeholders
    /// for non-text message types (e.g. `[Audio message]`).
    pub text: String,
    /// Interactive-message data (button payload, list selection).  Absent
    /// for plain text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// RFC 3339 timestamp of the provider message.
    pub timestamp: String,
}
