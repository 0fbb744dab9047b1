use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Key–value store configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration for the session key–value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend.  `memory` is the in-tree adapter; external backends
    /// implement the same `KvStore` contract out of tree.
    #[serde(default = "d_backend")]
    pub backend: String,

    /// Connection URL for networked backends.  Overridden by
    /// `CADENA_STORE_URL` when set; ignored by the `memory` backend.
    #[serde(default)]
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: d_backend(),
            url: String::new(),
        }
    }
}

impl StoreConfig {
    /// Effective connection URL, preferring the environment override.
    pub fn effective_url(&self) -> String {
        std::env::var("CADENA_STORE_URL").unwrap_or_else(|_| self.url.clone())
    }
}

fn d_backend() -> String {
    "memory".into()
}
