//! Language model capability used by the extractor.

use async_trait::async_trait;
use gemini_client::{GeminiClient, GenerateRequest};

use crate::error::{Result, ScrapeError};

/// Text in, text out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logs.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Gemini `generateContent` backed model.
#[derive(Clone)]
pub struct GeminiModel {
    client: GeminiClient,
    model: String,
}

impl GeminiModel {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest::from_prompt(prompt)
            .temperature(0.0)
            .json_output();
        let response = self
            .client
            .generate_content(&self.model, &request)
            .await
            .map_err(|e| ScrapeError::Model(Box::new(e)))?;
        Ok(response.text)
    }
}
