//! Pure Gemini REST API client
//!
//! A minimal client for the Gemini `generateContent` endpoint with no
//! domain-specific logic.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::GeminiClient;
//!
//! let client = GeminiClient::from_env()?;
//! let text = client.generate_text("gemini-2.5-flash", "Say hello").await?;
//! ```

pub mod error;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Default model for text generation.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Pure Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set a custom HTTP client (timeouts, proxies).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single-prompt text generation.
    pub async fn generate_text(&self, model: &str, prompt: impl Into<String>) -> Result<String> {
        let response = self
            .generate_content(model, &GenerateRequest::from_prompt(prompt))
            .await?;
        Ok(response.text)
    }

    /// Call `models/{model}:generateContent`.
    ///
    /// Text parts of the first candidate are concatenated.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini request failed");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Gemini API error");
            return Err(GeminiError::Api(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let raw: types::GenerateResponseRaw = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        if let Some(reason) = raw
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(GeminiError::Blocked(reason));
        }

        let candidate = raw
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GeminiError::Api("No candidates from Gemini".into()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return match candidate.finish_reason.as_deref() {
                Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") => Err(
                    GeminiError::Blocked(candidate.finish_reason.unwrap_or_default()),
                ),
                _ => Err(GeminiError::Api("Empty candidate from Gemini".into())),
            };
        }

        debug!(
            model = %model,
            duration_ms = start.elapsed().as_millis(),
            tokens = raw.usage_metadata.as_ref().map(|u| u.total_token_count),
            "Gemini generateContent"
        );

        Ok(GenerateResponse {
            text,
            finish_reason: candidate.finish_reason,
            usage: raw.usage_metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = GeminiClient::new("test-key").with_base_url("https://custom.api.com/");

        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, "https://custom.api.com");
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateRequest::from_prompt("hi").temperature(0.0).json_output();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["temperature"], 0.0);
    }
}
