//! Outbound message envelope.
//!
//! The engine treats outbound messages as opaque structured values: agents
//! produce them, the controller accumulates them, and the Sender
//! collaborator delivers them.  The only requirement is that they survive a
//! JSON round-trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single outbound message to be delivered by the Sender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Message type understood by the provider (`text`, `interactive`, …).
    #[serde(rename = "type")]
    pub kind: String,

    /// Plain text body, when the type carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Any additional provider-specific fields (buttons, sections, media
    /// ids).  Kept open so agents can emit shapes the engine never
    /// inspects.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutboundMessage {
    /// A plain text message.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            kind: "text".into(),
            body: Some(body.into()),
            extra: Map::new(),
        }
    }
}
