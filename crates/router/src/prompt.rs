//! Prompt assembly for the intent router.
//!
//! The router sends one compact user message — a state summary plus the
//! inbound text — under a templated system prompt listing the lane
//! catalog, and constrains the output with a JSON schema.

use cadena_domain::{LaneSet, Turn};
use cadena_sessions::SessionState;
use serde_json::{json, Value};

/// System prompt: lane catalog + classification instructions.
pub(crate) fn system_prompt(lanes: &LaneSet) -> String {
    let mut catalog = String::new();
    for (lane, def) in lanes.iter() {
        catalog.push_str(&format!("- {lane}: {}\n", def.description));
    }

    format!(
        "You route inbound messages of a business messaging assistant to \
         exactly one lane.\n\nLanes:\n{catalog}\n\
         Classify the user's message given the conversation state. Respond \
         with a JSON object containing `lane` (one of the ids above), \
         `intent` (a short snake_case label), `confidence` (0 to 1) and \
         `reasoning` (up to 5 short strings)."
    )
}

/// Compact state summary.  Only coarse signals — never the dialogue log.
pub(crate) fn state_summary(state: &SessionState) -> String {
    let active_flags: Vec<&str> = state
        .flags
        .iter()
        .filter(|(_, on)| **on)
        .map(|(name, _)| name.as_str())
        .collect();

    format!(
        "tenant_id={} wa_id={} current_lane={} locale={} phone_verified={} \
         address_present={} cart_items_count={} commerce_state={} flags=[{}]",
        state.tenant_id,
        state.wa_id,
        state.current_lane,
        state.locale,
        state.phone_verified,
        state.extras.contains_key("address"),
        state.cart.items.len(),
        state.commerce_state.as_deref().unwrap_or("none"),
        active_flags.join(","),
    )
}

/// The single user message: state section + message section.
pub(crate) fn user_message(turn: &Turn, state: &SessionState) -> String {
    format!(
        "Conversation state:\n{}\n\nUser message:\n{}",
        state_summary(state),
        turn.text
    )
}

/// JSON Schema constraining the model output to the decision shape.
pub(crate) fn decision_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "lane": { "type": "string" },
            "intent": { "type": "string" },
            "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
            "reasoning": {
                "type": "array",
                "items": { "type": "string" },
                "maxItems": 5
            }
        },
        "required": ["lane", "intent", "confidence"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cadena_domain::config::LaneDef;
    use cadena_domain::Lane;

    use super::*;

    fn lanes() -> LaneSet {
        let mut map = BTreeMap::new();
        map.insert(
            "info".to_owned(),
            LaneDef {
                handler: "info".into(),
                description: "Greetings and general information".into(),
                default: true,
                model: None,
            },
        );
        map.insert(
            "commerce".to_owned(),
            LaneDef {
                handler: "commerce".into(),
                description: "Catalog and cart".into(),
                default: false,
                model: None,
            },
        );
        LaneSet::from_config(&map).unwrap()
    }

    fn state() -> SessionState {
        let mut state = SessionState::default();
        state.tenant_id = "T1".into();
        state.wa_id = "U1".into();
        state.locale = "es-CO".into();
        state.current_lane = Lane::new("info");
        state
    }

    #[test]
    fn system_prompt_lists_every_lane() {
        let prompt = system_prompt(&lanes());
        assert!(prompt.contains("- info: Greetings and general information"));
        assert!(prompt.contains("- commerce: Catalog and cart"));
    }

    #[test]
    fn summary_includes_coarse_signals_only() {
        let mut s = state();
        s.cart.items.push(serde_json::json!({"sku": "A-1"}));
        s.flags.insert("vip".into(), true);
        s.flags.insert("human_handoff".into(), false);

        let summary = state_summary(&s);
        assert!(summary.contains("cart_items_count=1"));
        assert!(summary.contains("address_present=false"));
        assert!(summary.contains("flags=[vip]"));
        assert!(!summary.contains("human_handoff"));
    }

    #[test]
    fn address_presence_is_detected_from_extras() {
        let mut s = state();
        s.extras
            .insert("address".into(), serde_json::json!("Cra 7 # 12-34"));
        assert!(state_summary(&s).contains("address_present=true"));
    }

    #[test]
    fn schema_requires_the_core_fields() {
        let schema = decision_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["lane", "intent", "confidence"]);
    }
}
