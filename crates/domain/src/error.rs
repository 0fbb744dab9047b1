/// Shared error type used across all Cadena crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("store: {0}")]
    Store(String),

    #[error("model {model}: {message}")]
    Model { model: String, message: String },

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error("agent {lane}: {message}")]
    Agent { lane: String, message: String },

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short stable name of the error kind, safe for logs and router
    /// fallback reasons (no payloads, no secrets).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
            Self::Http(_) => "Http",
            Self::Timeout(_) => "Timeout",
            Self::Store(_) => "Store",
            Self::Model { .. } => "Model",
            Self::InvalidState(_) => "InvalidState",
            Self::Agent { .. } => "Agent",
            Self::Config(_) => "Config",
            Self::Other(_) => "Other",
        }
    }

    /// Whether the job scheduler should retry a turn that failed with this
    /// error. Infrastructure faults are retryable; everything else is a
    /// turn-level outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Http(_) | Self::Timeout(_) | Self::Store(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_are_retryable() {
        assert!(Error::Store("connection refused".into()).is_retryable());
        assert!(Error::Timeout("kv get".into()).is_retryable());
    }

    #[test]
    fn turn_level_errors_are_not_retryable() {
        assert!(!Error::InvalidState("tenant_id missing".into()).is_retryable());
        assert!(!Error::Agent {
            lane: "info".into(),
            message: "boom".into()
        }
        .is_retryable());
        assert!(!Error::Config("no default lane".into()).is_retryable());
    }

    #[test]
    fn kind_is_stable() {
        assert_eq!(Error::Timeout("x".into()).kind(), "Timeout");
        assert_eq!(Error::Store("x".into()).kind(), "Store");
    }
}
