//! Turn construction — stored provider message → normalized [`Turn`].
//!
//! Non-text message types render to bracketed placeholders so every turn
//! has a textual representation the router and agents can work with.

use chrono::{DateTime, SecondsFormat};

use cadena_domain::{Error, InboundMessage, MessageKind, Result, Turn};

pub struct TurnBuilder;

impl TurnBuilder {
    /// Build a [`Turn`] from a stored inbound message.
    pub fn build(msg: &InboundMessage) -> Result<Turn> {
        let timestamp = DateTime::from_timestamp(msg.timestamp, 0)
            .ok_or_else(|| {
                Error::Other(format!(
                    "message {} has an out-of-range timestamp {}",
                    msg.id, msg.timestamp
                ))
            })?
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        Ok(Turn {
            tenant_id: msg.tenant_id.clone(),
            wa_id: msg.from.clone(),
            message_id: msg.id.clone(),
            text: render_text(msg),
            payload: extract_payload(msg),
            timestamp,
        })
    }
}

/// Textual representation per message type.
fn render_text(msg: &InboundMessage) -> String {
    match msg.message_kind() {
        MessageKind::Text => msg
            .text
            .as_ref()
            .map(|t| t.body.clone())
            .unwrap_or_default(),

        MessageKind::Audio => msg
            .audio
            .as_ref()
            .and_then(|a| a.transcription.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "[Audio message]".into()),

        MessageKind::Button => msg
            .button
            .as_ref()
            .and_then(|b| b.text.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "[Button response]".into()),

        MessageKind::Location => "[Location shared]".into(),
        MessageKind::Contacts => "[Contact card shared]".into(),

        MessageKind::Document => msg
            .document
            .as_ref()
            .and_then(|d| d.filename.as_ref())
            .map(|f| format!("[Document: {f}]"))
            .unwrap_or_else(|| "[Document shared]".into()),

        MessageKind::Image => "[Image shared]".into(),
        MessageKind::Video => "[Video shared]".into(),
        MessageKind::Sticker => "[Sticker shared]".into(),

        MessageKind::Unsupported | MessageKind::Other => msg
            .text
            .as_ref()
            .map(|t| t.body.clone())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| format!("[{} message]", msg.kind)),
    }
}

/// Structured payload, populated only for interactive types.
fn extract_payload(msg: &InboundMessage) -> Option<serde_json::Value> {
    if let Some(button) = &msg.button {
        if let Some(payload) = &button.payload {
            return Some(payload.clone());
        }
    }
    msg.interactive.clone()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use cadena_domain::inbound::{AudioContent, ButtonContent, DocumentContent, TextContent};

    use super::*;

    fn message(kind: &str) -> InboundMessage {
        InboundMessage {
            id: "wamid.1".into(),
            from: "573001112233".into(),
            tenant_id: "T1".into(),
            kind: kind.into(),
            direction: Default::default(),
            timestamp: 1_735_689_600, // 2025-01-01T00:00:00Z
            text: None,
            button: None,
            audio: None,
            document: None,
            interactive: None,
            errors: Vec::new(),
        }
    }

    #[test]
    fn text_message_uses_the_body() {
        let mut msg = message("text");
        msg.text = Some(TextContent {
            body: "Hola".into(),
        });
        let turn = TurnBuilder::build(&msg).unwrap();
        assert_eq!(turn.text, "Hola");
        assert_eq!(turn.tenant_id, "T1");
        assert_eq!(turn.wa_id, "573001112233");
        assert_eq!(turn.message_id, "wamid.1");
        assert_eq!(turn.timestamp, "2025-01-01T00:00:00Z");
        assert!(turn.payload.is_none());
    }

    #[test]
    fn audio_prefers_the_transcription() {
        let mut msg = message("audio");
        msg.audio = Some(AudioContent {
            transcription: Some("quiero hacer un pedido".into()),
            ..Default::default()
        });
        assert_eq!(
            TurnBuilder::build(&msg).unwrap().text,
            "quiero hacer un pedido"
        );

        msg.audio = Some(AudioContent::default());
        assert_eq!(TurnBuilder::build(&msg).unwrap().text, "[Audio message]");
    }

    #[test]
    fn button_uses_label_and_payload() {
        let mut msg = message("button");
        msg.button = Some(ButtonContent {
            text: Some("Ver catálogo".into()),
            payload: Some(serde_json::json!({"action": "catalog"})),
        });
        let turn = TurnBuilder::build(&msg).unwrap();
        assert_eq!(turn.text, "Ver catálogo");
        assert_eq!(turn.payload, Some(serde_json::json!({"action": "catalog"})));

        msg.button = Some(ButtonContent::default());
        assert_eq!(TurnBuilder::build(&msg).unwrap().text, "[Button response]");
    }

    #[test]
    fn media_types_render_placeholders() {
        assert_eq!(
            TurnBuilder::build(&message("location")).unwrap().text,
            "[Location shared]"
        );
        assert_eq!(
            TurnBuilder::build(&message("contacts")).unwrap().text,
            "[Contact card shared]"
        );
        assert_eq!(
            TurnBuilder::build(&message("image")).unwrap().text,
            "[Image shared]"
        );
        assert_eq!(
            TurnBuilder::build(&message("video")).unwrap().text,
            "[Video shared]"
        );
        assert_eq!(
            TurnBuilder::build(&message("sticker")).unwrap().text,
            "[Sticker shared]"
        );
    }

    #[test]
    fn document_includes_the_filename_when_present() {
        let mut msg = message("document");
        msg.document = Some(DocumentContent {
            filename: Some("factura.pdf".into()),
        });
        assert_eq!(
            TurnBuilder::build(&msg).unwrap().text,
            "[Document: factura.pdf]"
        );

        msg.document = Some(DocumentContent { filename: None });
        assert_eq!(TurnBuilder::build(&msg).unwrap().text, "[Document shared]");
    }

    #[test]
    fn unknown_type_falls_back_to_body_or_placeholder() {
        let mut msg = message("reaction");
        assert_eq!(TurnBuilder::build(&msg).unwrap().text, "[reaction message]");

        msg.text = Some(TextContent {
            body: "👍".into(),
        });
        assert_eq!(TurnBuilder::build(&msg).unwrap().text, "👍");
    }

    #[test]
    fn interactive_metadata_becomes_the_payload() {
        let mut msg = message("text");
        msg.text = Some(TextContent {
            body: "pick".into(),
        });
        msg.interactive = Some(serde_json::json!({"list_reply": {"id": "row-2"}}));
        let turn = TurnBuilder::build(&msg).unwrap();
        assert_eq!(
            turn.payload,
            Some(serde_json::json!({"list_reply": {"id": "row-2"}}))
        );
    }

    #[test]
    fn out_of_range_timestamp_is_rejected() {
        let mut msg = message("text");
        msg.timestamp = i64::MAX;
        assert!(TurnBuilder::build(&msg).is_err());
    }
}
