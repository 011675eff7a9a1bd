//! Salary scraper.
//!
//! Collects compensation posts about a company from a discussion forum,
//! asks a language model to turn them into structured records, and folds
//! the results into a [`RunResult`] keyed by company and source.
//!
//! ```text
//! Source::discover ──▶ Source::retrieve (bounded, ordered) ──▶ Extractor::extract
//!        │                      │                                    │
//!        └──────── failures recorded per (company, source) ──────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use salary_scraper::{Extractor, GeminiModel, LeetCodeSource, Pipeline};
//!
//! let pipeline = Pipeline::new(Extractor::new(GeminiModel::new(gemini, "gemini-2.5-flash")))
//!     .with_source(LeetCodeSource::new(leetcode, Default::default()));
//!
//! let result = pipeline.run(&["Google".to_string()]).await;
//! salary_scraper::output::write_run_result("salaries.json".as_ref(), &result)?;
//! ```

pub mod amount;
pub mod config;
pub mod error;
pub mod extraction;
pub mod output;
pub mod pipeline;
pub mod retry;
pub mod sources;
pub mod testing;
pub mod types;

pub use config::Config;
pub use error::{Result, ScrapeError};
pub use extraction::{Extraction, Extractor, GeminiModel, LanguageModel};
pub use pipeline::{Pipeline, PipelineConfig};
pub use retry::{Backoff, RetryOutcome, RetryPolicy};
pub use sources::{leetcode::LeetCodeSource, leetcode::LeetCodeSourceConfig, Source};
pub use types::{
    CompanyQuery, Compensation, CompensationRecord, DiscussionText, RunResult, SalaryReport,
    SourceFailure, SourceOutcome, SourceReport, Stage, ThreadReference,
};
