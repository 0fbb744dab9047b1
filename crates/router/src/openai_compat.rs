//! OpenAI-compatible structured-output adapter.
//!
//! Works with OpenAI, Ollama, vLLM and any other endpoint that follows the
//! chat completions contract with `response_format: json_schema`.

use std::time::Duration;

use serde_json::Value;

use cadena_domain::config::RouterConfig;
use cadena_domain::{Error, Result};

use crate::traits::{DecisionModel, DecisionRequest};

/// A [`DecisionModel`] backed by an OpenAI-compatible HTTP endpoint.
pub struct OpenAiCompatModel {
    base_url: String,
    api_key: Option<String>,
    model: String,
    http: reqwest::Client,
}

impl OpenAiCompatModel {
    /// Build the adapter from router configuration.  The API key is read
    /// from the configured environment variable; when absent the adapter
    /// still constructs (some local endpoints are unauthenticated).
    pub fn from_config(cfg: &RouterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key: std::env::var(&cfg.api_key_env).ok(),
            model: cfg.model.clone(),
            http,
        })
    }
}

#[async_trait::async_trait]
impl DecisionModel for OpenAiCompatModel {
    async fn decide(&self, req: DecisionRequest) -> Result<Value> {
        let model = req.model.as_deref().unwrap_or(&self.model);
        let body = serde_json::json!({
            "model": model,
            "temperature": 0.0,
            "messages": [
                { "role": "system", "content": req.system_prompt },
                { "role": "user", "content": req.user_message },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "router_decision",
                    "strict": true,
                    "schema": req.schema,
                }
            },
        });

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout("router chat completion".into())
            } else {
                Error::Http(format!("router request failed: {e}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Model {
                model: model.to_owned(),
                message: format!("HTTP {status}"),
            });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| Error::Http(format!("failed to parse completion response: {e}")))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::Model {
                model: model.to_owned(),
                message: "response missing choices[0].message.content".into(),
            })?;

        serde_json::from_str(content).map_err(|e| Error::Model {
            model: model.to_owned(),
            message: format!("structured output is not valid JSON: {e}"),
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
