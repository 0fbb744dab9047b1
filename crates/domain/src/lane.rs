//! Lane identifiers and the configured lane set.
//!
//! A lane is a named agent domain (`info`, `commerce`, `support`, …).  The
//! set of valid lanes is closed and comes from configuration; exactly one
//! lane is marked as the default.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::LaneDef;
use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Lane
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A lane identifier.  Serialized as a bare string.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Lane(String);

impl Lane {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Lane {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for Lane {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LaneSet
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The closed set of configured lanes, with the single default lane
/// resolved up front.
///
/// Built once at startup from `[lanes.*]` config; a set with zero or more
/// than one default lane is a fatal configuration error.
#[derive(Debug, Clone)]
pub struct LaneSet {
    lanes: BTreeMap<Lane, LaneDef>,
    default_lane: Lane,
}

impl LaneSet {
    /// Build the lane set from the configured lane map, enforcing the
    /// exactly-one-default invariant.
    pub fn from_config(config: &BTreeMap<String, LaneDef>) -> Result<Self> {
        if config.is_empty() {
            return Err(Error::Config("no lanes configured".into()));
        }

        let defaults: Vec<&String> = config
            .iter()
            .filter(|(_, def)| def.default)
            .map(|(id, _)| id)
            .collect();

        let default_lane = match defaults.as_slice() {
            [one] => Lane::new(one.as_str()),
            [] => {
                return Err(Error::Config(
                    "no default lane configured (exactly one lane must set `default = true`)"
                        .into(),
                ));
            }
            many => {
                return Err(Error::Config(format!(
                    "multiple default lanes configured: {}",
                    many.iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        };

        let lanes = config
            .iter()
            .map(|(id, def)| (Lane::new(id.as_str()), def.clone()))
            .collect();

        Ok(Self {
            lanes,
            default_lane,
        })
    }

    /// Whether `lane` belongs to the configured set.
    pub fn contains(&self, lane: &Lane) -> bool {
        self.lanes.contains_key(lane)
    }

    /// The single configured default lane.
    pub fn default_lane(&self) -> &Lane {
        &self.default_lane
    }

    /// Definition for a lane, if configured.
    pub fn get(&self, lane: &Lane) -> Option<&LaneDef> {
        self.lanes.get(lane)
    }

    /// Iterate lanes in stable (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&Lane, &LaneDef)> {
        self.lanes.iter()
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn lane_map(entries: &[(&str, bool)]) -> BTreeMap<String, LaneDef> {
        entries
            .iter()
            .map(|(id, default)| {
                (
                    (*id).to_owned(),
                    LaneDef {
                        handler: (*id).to_owned(),
                        description: format!("{id} lane"),
                        default: *default,
                        model: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn resolves_single_default() {
        let set = LaneSet::from_config(&lane_map(&[("info", true), ("commerce", false)])).unwrap();
        assert_eq!(set.default_lane().as_str(), "info");
        assert!(set.contains(&Lane::new("commerce")));
        assert!(!set.contains(&Lane::new("billing")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn rejects_empty_set() {
        let err = LaneSet::from_config(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_missing_default() {
        let err = LaneSet::from_config(&lane_map(&[("info", false)])).unwrap_err();
        assert!(err.to_string().contains("no default lane"));
    }

    #[test]
    fn rejects_multiple_defaults() {
        let err =
            LaneSet::from_config(&lane_map(&[("info", true), ("commerce", true)])).unwrap_err();
        assert!(err.to_string().contains("multiple default lanes"));
    }

    #[test]
    fn lane_serializes_as_bare_string() {
        let lane = Lane::new("info");
        assert_eq!(serde_json::to_string(&lane).unwrap(), "\"info\"");
        let back: Lane = serde_json::from_str("\"commerce\"").unwrap();
        assert_eq!(back.as_str(), "commerce");
    }
}
