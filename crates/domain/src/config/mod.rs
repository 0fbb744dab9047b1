mod lanes;
mod router;
mod sessions;
mod store;
mod workers;

pub use lanes::*;
pub use router::*;
pub use sessions::*;
pub use store::*;
pub use workers::*;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub workers: WorkersConfig,
    /// Lane definitions (key = lane id).  The closed lane set of the
    /// orchestrator; exactly one entry must set `default = true`.
    #[serde(default)]
    pub lanes: BTreeMap<String, LaneDef>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration, returning every issue found.  Any
    /// [`ConfigSeverity::Error`] issue must prevent job execution.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let error = |field: &str, message: String| ConfigIssue {
            severity: ConfigSeverity::Error,
            field: field.to_owned(),
            message,
        };
        let warn = |field: &str, message: String| ConfigIssue {
            severity: ConfigSeverity::Warning,
            field: field.to_owned(),
            message,
        };

        // ── Lanes ─────────────────────────────────────────────────
        if self.lanes.is_empty() {
            issues.push(error("lanes", "at least one lane must be configured".into()));
        } else {
            let defaults = self.lanes.values().filter(|l| l.default).count();
            if defaults == 0 {
                issues.push(error(
                    "lanes",
                    "exactly one lane must set `default = true` (found none)".into(),
                ));
            } else if defaults > 1 {
                issues.push(error(
                    "lanes",
                    format!("exactly one lane must set `default = true` (found {defaults})"),
                ));
            }
            for (id, def) in &self.lanes {
                if def.handler.is_empty() {
                    issues.push(error(
                        &format!("lanes.{id}.handler"),
                        "handler must not be empty".into(),
                    ));
                }
            }
        }

        // ── Sessions ──────────────────────────────────────────────
        if self.sessions.session_ttl_secs == 0 {
            issues.push(error(
                "sessions.session_ttl_secs",
                "session TTL must be greater than zero".into(),
            ));
        }
        if self.sessions.idempotency_ttl_secs == 0 {
            issues.push(error(
                "sessions.idempotency_ttl_secs",
                "idempotency TTL must be greater than zero".into(),
            ));
        }
        if chrono_tz::Tz::from_str(&self.sessions.default_timezone).is_err() {
            issues.push(error(
                "sessions.default_timezone",
                format!("unknown timezone `{}`", self.sessions.default_timezone),
            ));
        }
        if self.sessions.max_baton_hops > 5 {
            issues.push(warn(
                "sessions.max_baton_hops",
                format!(
                    "{} baton hops allows {} agent calls per turn",
                    self.sessions.max_baton_hops,
                    self.sessions.max_baton_hops + 1
                ),
            ));
        }

        // ── Workers ───────────────────────────────────────────────
        if self.workers.count == 0 {
            issues.push(error(
                "workers.count",
                "worker count must be at least 1".into(),
            ));
        }
        if self.workers.max_attempts == 0 {
            issues.push(error(
                "workers.max_attempts",
                "at least one attempt is required".into(),
            ));
        }

        // ── Router ────────────────────────────────────────────────
        if self.router.model.is_empty() {
            issues.push(warn(
                "router.model",
                "no router model configured; every turn will use the fallback decision".into(),
            ));
        }
        if std::env::var(&self.router.api_key_env).is_err() {
            issues.push(warn(
                "router",
                format!(
                    "{} is not set; every turn will use the fallback decision",
                    self.router.api_key_env
                ),
            ));
        }

        issues
    }

    /// Whether validation produced any fatal issue.
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues
            .iter()
            .any(|i| i.severity == ConfigSeverity::Error)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
