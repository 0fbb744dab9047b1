//! Key derivation for the session store.
//!
//! Key templates:
//! - `session:<tenant_id>:<wa_id>`     — the serialized session blob
//! - `turn:processed:<message_id>`     — fine-grained idempotency marker
//! - `orchestrated:<message_id>`       — coarse job-scope marker

/// Key of the serialized session for a `(tenant, user)` pair.
pub fn session_key(tenant_id: &str, wa_id: &str) -> String {
    format!("session:{tenant_id}:{wa_id}")
}

/// Key of the idempotency marker for a processed message.
pub fn idempotency_key(message_id: &str) -> String {
    format!("turn:processed:{message_id}")
}

/// Key of the coarser job-scope marker set once a message has been
/// handed to the controller.
pub fn orchestrated_key(message_id: &str) -> String {
    format!("orchestrated:{message_id}")
}
