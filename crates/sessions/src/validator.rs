//! Structural session validation.
//!
//! Minimal and fast: identity must be present and the current lane must
//! belong to the configured set.  Deeper slice invariants are each
//! agent's responsibility.

use cadena_domain::{Error, LaneSet, Result};

use crate::state::SessionState;

/// Validates the structural invariants required before a turn may be
/// processed.
#[derive(Debug, Clone)]
pub struct StateValidator {
    lanes: LaneSet,
}

impl StateValidator {
    pub fn new(lanes: LaneSet) -> Self {
        Self { lanes }
    }

    /// Check a hydrated state.  Failure means the stored blob is corrupt
    /// and must be recovered locally (fresh session), never retried.
    pub fn validate(&self, state: &SessionState) -> Result<()> {
        if state.tenant_id.is_empty() {
            return Err(Error::InvalidState("tenant_id is missing".into()));
        }
        if state.wa_id.is_empty() {
            return Err(Error::InvalidState("wa_id is missing".into()));
        }
        if !self.lanes.contains(&state.current_lane) {
            return Err(Error::InvalidState(format!(
                "current_lane `{}` is not a configured lane",
                state.current_lane
            )));
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cadena_domain::config::LaneDef;
    use cadena_domain::Lane;

    use super::*;
    use crate::builder::StateBuilder;

    fn lane_set() -> LaneSet {
        let mut lanes = BTreeMap::new();
        for (id, default) in [("info", true), ("commerce", false)] {
            lanes.insert(
                id.to_owned(),
                LaneDef {
                    handler: id.to_owned(),
                    description: String::new(),
                    default,
                    model: None,
                },
            );
        }
        LaneSet::from_config(&lanes).unwrap()
    }

    #[test]
    fn fresh_session_validates() {
        let builder = StateBuilder::new(Lane::new("info"), "es-CO", "America/Bogota");
        let validator = StateValidator::new(lane_set());
        assert!(validator.validate(&builder.new_session("T1", "U1")).is_ok());
    }

    #[test]
    fn validator_fixpoint_through_serialization() {
        // Validator(Builder.from_json(Serialize(Builder.new_session(...)))) holds.
        let builder = StateBuilder::new(Lane::new("info"), "es-CO", "America/Bogota");
        let validator = StateValidator::new(lane_set());

        let fresh = builder.new_session("T1", "U1");
        let raw = serde_json::to_string(&fresh).unwrap();
        let hydrated = builder.from_json(&raw);
        assert!(validator.validate(&hydrated).is_ok());
    }

    #[test]
    fn missing_tenant_fails() {
        let validator = StateValidator::new(lane_set());
        let mut state = SessionState::default();
        state.wa_id = "U1".into();
        state.current_lane = Lane::new("info");
        let err = validator.validate(&state).unwrap_err();
        assert!(err.to_string().contains("tenant_id"));
    }

    #[test]
    fn missing_wa_id_fails() {
        let validator = StateValidator::new(lane_set());
        let mut state = SessionState::default();
        state.tenant_id = "T1".into();
        state.current_lane = Lane::new("info");
        let err = validator.validate(&state).unwrap_err();
        assert!(err.to_string().contains("wa_id"));
    }

    #[test]
    fn unknown_lane_fails() {
        let validator = StateValidator::new(lane_set());
        let mut state = SessionState::default();
        state.tenant_id = "T1".into();
        state.wa_id = "U1".into();
        state.current_lane = Lane::new("BOGUS");
        let err = validator.validate(&state).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert!(err.to_string().contains("BOGUS"));
    }
}
