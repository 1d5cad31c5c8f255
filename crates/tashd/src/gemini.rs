//! Gemini provider client - the single call-and-parse boundary to the
//! generative model.
//!
//! One prompt in, raw text out. Everything downstream of the raw text (fence
//! stripping, contract parsing, fallbacks) lives in `tash_common::parser`;
//! this client only does transport and payload extraction.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tash_common::error::TashError;
use tash_common::matcher::InferenceProvider;
use tracing::{info, warn};

use crate::config::LlmConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// HTTP client for the Gemini generateContent endpoint.
#[derive(Debug)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client from config, reading the credential from the
    /// configured environment variable.
    pub fn from_config(config: &LlmConfig) -> Result<Self, TashError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            TashError::Provider(format!("{} is not set", config.api_key_env))
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TashError::Provider(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl InferenceProvider for GeminiClient {
    async fn infer(&self, prompt: &str) -> Result<String, TashError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        info!("[>]  Consult call [{}] ({} chars)", self.model, prompt.len());

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| TashError::Provider(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("[-]  Provider error {}: {}", status, body);
            return Err(TashError::Provider(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| TashError::Provider(format!("unreadable response body: {}", e)))?;

        let text = extract_text(&json);
        info!("[<]  Consult response ({} chars)", text.len());
        Ok(text)
    }
}

/// Pull the generated text out of a generateContent response. Tolerates
/// missing pieces by returning an empty string; the downstream parser treats
/// that as an empty match.
fn extract_text(response: &Value) -> String {
    response
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_happy_path() {
        let response: Value = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "[\"work-permit\"]"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(&response), r#"["work-permit"]"#);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: Value = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "["}, {"text": "]"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(&response), "[]");
    }

    #[test]
    fn test_extract_text_missing_candidates() {
        let response: Value = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert_eq!(extract_text(&response), "");
    }

    #[test]
    fn test_endpoint_shape() {
        std::env::set_var("TEST_GEMINI_KEY", "k");
        let config = LlmConfig {
            api_key_env: "TEST_GEMINI_KEY".to_string(),
            api_base: "https://generativelanguage.googleapis.com/".to_string(),
            ..Default::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-lite:generateContent"
        );
    }

    #[test]
    fn test_missing_credential_is_provider_error() {
        let config = LlmConfig {
            api_key_env: "TEST_GEMINI_KEY_UNSET".to_string(),
            ..Default::default()
        };
        let err = GeminiClient::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("TEST_GEMINI_KEY_UNSET"));
    }
}
