//! The stored inbound provider message consumed by the turn builder.
//!
//! This mirrors the subset of the chat provider's webhook message format
//! that the orchestration core reads: identifiers, the message type, the
//! typed content bodies used for text rendering, and the error markers
//! that exclude a message from orchestration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message kind & direction
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Known provider message types.  Anything else parses as [`MessageKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Audio,
    Button,
    Location,
    Contacts,
    Document,
    Image,
    Video,
    Sticker,
    Unsupported,
    Other,
}

impl MessageKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "text" => Self::Text,
            "audio" => Self::Audio,
            "button" => Self::Button,
            "location" => Self::Location,
            "contacts" => Self::Contacts,
            "document" => Self::Document,
            "image" => Self::Image,
            "video" => Self::Video,
            "sticker" => Self::Sticker,
            "unsupported" => Self::Unsupported,
            _ => Self::Other,
        }
    }
}

/// Whether the stored record is a user message or one the business sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Inbound,
    Outbound,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Typed content bodies
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ButtonContent {
    /// Button label the user tapped.
    #[serde(default)]
    pub text: Option<String>,
    /// Developer-defined payload attached to the button.
    #[serde(default)]
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioContent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub voice: bool,
    /// Filled by the transcription pipeline before orchestration, when
    /// available.
    #[serde(default)]
    pub transcription: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentContent {
    #[serde(default)]
    pub filename: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// InboundMessage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A stored provider message, as persisted by the webhook ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Provider-assigned message id (globally unique).
    pub id: String,
    /// End-user identifier (the sender).
    pub from: String,
    /// Business phone identifier this message arrived on.
    pub tenant_id: String,
    /// Raw provider message type string.  Unknown values are preserved so
    /// the text renderer can surface them verbatim.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub direction: Direction,
    /// Epoch seconds, as delivered by the provider.
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<ButtonContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentContent>,
    /// Interactive metadata (list reply, button reply) when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<Value>,

    /// Provider-reported message-level errors.  A non-empty list excludes
    /// the message from orchestration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Value>,
}

impl InboundMessage {
    /// Parsed message kind.
    pub fn message_kind(&self) -> MessageKind {
        MessageKind::parse(&self.kind)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
