//! Session construction and hydration.
//!
//! The builder owns the defaults (default lane, locale, timezone from
//! configuration).  `new_session` stamps a fresh state; `from_json`
//! hydrates a stored blob, filling any missing keys from the defaults
//! without overwriting stored values.

use cadena_domain::Lane;

use crate::state::SessionState;

/// Builds fresh sessions and hydrates stored ones.
#[derive(Debug, Clone)]
pub struct StateBuilder {
    default_lane: Lane,
    locale: String,
    timezone: String,
}

impl StateBuilder {
    pub fn new(default_lane: Lane, locale: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            default_lane,
            locale: locale.into(),
            timezone: timezone.into(),
        }
    }

    /// The defaults template: everything a session starts with except its
    /// identity.
    fn template(&self) -> SessionState {
        SessionState {
            locale: self.locale.clone(),
            timezone: self.timezone.clone(),
            current_lane: self.default_lane.clone(),
            ..SessionState::default()
        }
    }

    /// Create a fresh session for a `(tenant, user)` pair.
    pub fn new_session(&self, tenant_id: &str, wa_id: &str) -> SessionState {
        let mut state = self.template();
        state.tenant_id = tenant_id.to_owned();
        state.wa_id = wa_id.to_owned();
        state
    }

    /// Hydrate a stored session blob.
    ///
    /// Empty or malformed JSON yields the defaults template (no identity) —
    /// the validator downstream decides what happens next.  Parsed blobs
    /// get missing keys filled via serde defaults, then blank
    /// localization/lane fields are backfilled from the template; stored
    /// values are never overwritten.
    pub fn from_json(&self, raw: &str) -> SessionState {
        if raw.trim().is_empty() {
            return self.template();
        }

        let mut state: SessionState = match serde_json::from_str(raw) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "stored session blob is not valid JSON, starting from defaults");
                return self.template();
            }
        };

        if state.locale.is_empty() {
            state.locale = self.locale.clone();
        }
        if state.timezone.is_empty() {
            state.timezone = self.timezone.clone();
        }
        if state.current_lane.is_empty() {
            state.current_lane = self.default_lane.clone();
        }

        state
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> StateBuilder {
        StateBuilder::new(Lane::new("info"), "es-CO", "America/Bogota")
    }

    #[test]
    fn new_session_has_identity_and_defaults() {
        let state = builder().new_session("T1", "U1");
        assert_eq!(state.tenant_id, "T1");
        assert_eq!(state.wa_id, "U1");
        assert_eq!(state.locale, "es-CO");
        assert_eq!(state.timezone, "America/Bogota");
        assert_eq!(state.current_lane.as_str(), "info");
        assert_eq!(state.version, 1);
        assert!(state.turns.is_empty());
        assert!(!state.phone_verified);
    }

    #[test]
    fn from_json_empty_yields_defaults() {
        let state = builder().from_json("");
        assert_eq!(state.current_lane.as_str(), "info");
        assert!(state.tenant_id.is_empty());
    }

    #[test]
    fn from_json_malformed_yields_defaults() {
        let state = builder().from_json("{not json");
        assert_eq!(state.locale, "es-CO");
    }

    #[test]
    fn from_json_fills_missing_keys_without_overwriting() {
        let raw = r#"{"tenant_id":"T1","wa_id":"U1","locale":"en-US","phone_verified":true}"#;
        let state = builder().from_json(raw);
        // Stored values preserved.
        assert_eq!(state.locale, "en-US");
        assert!(state.phone_verified);
        // Missing keys filled.
        assert_eq!(state.timezone, "America/Bogota");
        assert_eq!(state.current_lane.as_str(), "info");
        assert_eq!(state.cart.currency, "COP");
    }

    #[test]
    fn hydration_is_idempotent() {
        let b = builder();
        let state = b.new_session("T1", "U1");

        let once = b.from_json(&serde_json::to_string(&state).unwrap());
        let twice = b.from_json(&serde_json::to_string(&once).unwrap());
        assert_eq!(once, twice);
        assert_eq!(once, state);
    }

    #[test]
    fn unknown_keys_survive_hydration() {
        let raw = r#"{"tenant_id":"T1","wa_id":"U1","loyalty_tier":"gold"}"#;
        let b = builder();
        let state = b.from_json(raw);
        assert_eq!(
            state.extras.get("loyalty_tier"),
            Some(&serde_json::json!("gold"))
        );

        let again = b.from_json(&serde_json::to_string(&state).unwrap());
        assert_eq!(again, state);
    }
}
