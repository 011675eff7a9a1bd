use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use gemini_client::DEFAULT_MODEL;

use crate::pipeline::PipelineConfig;
use crate::sources::leetcode::LeetCodeSourceConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub leetcode_base_url: String,
    pub page_size: u32,
    pub thread_concurrency: usize,
    pub company_concurrency: usize,
    pub requests_per_second: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            leetcode_base_url: env::var("LEETCODE_BASE_URL")
                .unwrap_or_else(|_| "https://leetcode.com".to_string()),
            page_size: parse_var("SCRAPER_PAGE_SIZE", 10)?,
            thread_concurrency: parse_var("SCRAPER_THREAD_CONCURRENCY", 4)?,
            company_concurrency: parse_var("SCRAPER_COMPANY_CONCURRENCY", 2)?,
            requests_per_second: parse_var("SCRAPER_REQUESTS_PER_SECOND", 2)?,
        })
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_thread_concurrency(self.thread_concurrency)
            .with_company_concurrency(self.company_concurrency)
    }

    pub fn leetcode_config(&self) -> LeetCodeSourceConfig {
        LeetCodeSourceConfig::default()
            .with_page_size(self.page_size)
            .with_requests_per_second(self.requests_per_second)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}
