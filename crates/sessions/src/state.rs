//! The session state contract — flat layout, explicit slices, open extras.
//!
//! Every key the orchestrator and agents touch is an explicit field; agent
//! keys outside the contract land in `extras` and survive round-trips
//! untouched.  All fields carry serde defaults so hydrating a partial blob
//! fills the gaps without disturbing stored values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cadena_domain::{Error, Lane, OutboundMessage, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dialogue entries
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One element of the dialogue log.  Append-only within a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DialogueEntry {
    User {
        message_id: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
        timestamp: String,
    },
    Assistant {
        lane: Lane,
        messages: Vec<OutboundMessage>,
        timestamp: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slices
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Commerce slice: the user's in-progress cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub subtotal_cents: i64,
    #[serde(default = "d_currency")]
    pub currency: String,
}

impl Default for Cart {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            subtotal_cents: 0,
            currency: d_currency(),
        }
    }
}

fn d_currency() -> String {
    "COP".into()
}

/// Order lookup / verification slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSlice {
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub verified_at: Option<String>,
    #[serde(default)]
    pub last_lookup: Option<Value>,
    #[serde(default)]
    pub lookup_history: Vec<Value>,
}

/// Support case slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportSlice {
    #[serde(default)]
    pub active_case_id: Option<String>,
    #[serde(default)]
    pub case_status: Option<String>,
    #[serde(default)]
    pub escalation_level: u32,
    #[serde(default)]
    pub case_history: Vec<Value>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionState
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-`(tenant, user)` conversational state, serialized as one JSON
/// document per session key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Schema version, for future upcasting.
    #[serde(default = "d_version")]
    pub version: u32,

    // ── Identity & localization ───────────────────────────────────
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub wa_id: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub timezone: String,

    /// The lane that most recently handled a turn.
    #[serde(default)]
    pub current_lane: Lane,

    // ── Identification / verification ─────────────────────────────
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub phone_verified: bool,
    #[serde(default)]
    pub language_locked: bool,

    /// Boolean operational flags (`human_handoff`, `vip`, …).
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,

    // ── Dialogue ──────────────────────────────────────────────────
    /// Ordered dialogue log.  Append-only within a turn's processing.
    #[serde(default)]
    pub turns: Vec<DialogueEntry>,
    /// `message_id` of the most recent user turn appended.
    #[serde(default)]
    pub last_user_msg_id: Option<String>,

    // ── Commerce ──────────────────────────────────────────────────
    #[serde(default)]
    pub cart: Cart,
    #[serde(default)]
    pub commerce_state: Option<String>,
    #[serde(default)]
    pub last_quote: Option<Value>,

    // ── Order / support ───────────────────────────────────────────
    #[serde(default)]
    pub order: OrderSlice,
    #[serde(default)]
    pub support: SupportSlice,

    /// Summary of the most recent tool invocation.
    #[serde(default)]
    pub last_tool: Option<Value>,

    /// RFC 3339 timestamp of the last persist.
    #[serde(default)]
    pub updated_at: Option<String>,

    /// Agent-specific keys outside the contract.
    #[serde(flatten)]
    pub extras: BTreeMap<String, Value>,
}

fn d_version() -> u32 {
    1
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            version: d_version(),
            tenant_id: String::new(),
            wa_id: String::new(),
            locale: String::new(),
            timezone: String::new(),
            current_lane: Lane::default(),
            customer_id: None,
            phone_verified: false,
            language_locked: false,
            flags: BTreeMap::new(),
            turns: Vec::new(),
            last_user_msg_id: None,
            cart: Cart::default(),
            commerce_state: None,
            last_quote: None,
            order: OrderSlice::default(),
            support: SupportSlice::default(),
            last_tool: None,
            updated_at: None,
            extras: BTreeMap::new(),
        }
    }
}

impl SessionState {
    /// Shallow-merge a flat patch into this state: every patch key replaces
    /// the corresponding top-level value wholesale; unknown keys land in
    /// `extras`.  An empty patch is a no-op.
    pub fn apply_patch(&self, patch: &Map<String, Value>) -> Result<SessionState> {
        if patch.is_empty() {
            return Ok(self.clone());
        }

        let mut doc = serde_json::to_value(self)?;
        let Value::Object(ref mut fields) = doc else {
            return Err(Error::InvalidState(
                "session state did not serialize to an object".into(),
            ));
        };
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }

        serde_json::from_value(doc).map_err(|e| {
            Error::InvalidState(format!("state patch produced an undecodable state: {e}"))
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
