//! LLM extraction of compensation records.
//!
//! All texts for one (company, source) pair go to the model in a single
//! prompt, separated by [`prompts::CHUNK_DELIMITER`]. The reply is expected
//! to be a JSON list with one object per text, possibly wrapped in a
//! markdown code fence.

pub mod model;
pub mod prompts;

pub use model::{GeminiModel, LanguageModel};

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};
use crate::retry::{RetryOutcome, RetryPolicy};
use crate::types::{Compensation, CompensationRecord, DiscussionText};

/// Records extracted from one batch of texts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<CompensationRecord>,
    /// Non-missing texts sent to the model
    pub chunk_count: usize,
    /// Model calls made, 0 for an empty batch
    pub attempts: u32,
    pub warnings: Vec<String>,
}

pub struct Extractor<M: LanguageModel> {
    model: M,
    retry: RetryPolicy,
}

impl<M: LanguageModel> Extractor<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            retry: RetryPolicy::exponential(Duration::from_millis(500), Duration::from_secs(8), 4),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Extract one record per available text.
    ///
    /// Missing texts are dropped before the prompt is built. An empty batch
    /// returns no records without calling the model. A record count that does
    /// not match the number of texts is kept as-is and reported in
    /// [`Extraction::warnings`].
    pub async fn extract(&self, texts: &[DiscussionText]) -> Result<Extraction> {
        let chunks: Vec<&str> = texts.iter().filter_map(DiscussionText::as_text).collect();
        let skipped = texts.len() - chunks.len();

        if chunks.is_empty() {
            debug!(skipped, "No discussion texts to extract from");
            return Ok(Extraction::default());
        }

        let prompt = prompts::render_prompt(&chunks);
        let model = &self.model;
        let prompt_ref = prompt.as_str();

        debug!(
            model = model.name(),
            chunks = chunks.len(),
            skipped,
            prompt_len = prompt.len(),
            "Requesting extraction"
        );

        let outcome = self
            .retry
            .run("extraction", move |_| async move {
                let raw = model.generate(prompt_ref).await?;
                parse_records(&raw)
            })
            .await;

        let (records, attempts) = match outcome {
            RetryOutcome::Success { value, attempts } => (value, attempts),
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                return Err(ScrapeError::Extraction {
                    attempts,
                    last_error: last_error.to_string(),
                })
            }
        };

        let mut warnings = Vec::new();
        if records.len() != chunks.len() {
            let message = format!(
                "model returned {} records for {} discussion texts",
                records.len(),
                chunks.len()
            );
            warn!(records = records.len(), chunks = chunks.len(), "Record count mismatch");
            warnings.push(message);
        }

        info!(
            model = model.name(),
            records = records.len(),
            attempts,
            "Extraction complete"
        );

        Ok(Extraction {
            records,
            chunk_count: chunks.len(),
            attempts,
            warnings,
        })
    }
}

/// Remove a surrounding markdown code fence (```` ```json ... ``` ````).
///
/// Text without a fence comes back trimmed but otherwise untouched.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse a model reply into records. A lone object counts as a list of one.
///
/// The lone object must only carry record fields, so wrapped lists or
/// refusals such as `{"error": "..."}` are rejected and retried.
pub fn parse_records(raw: &str) -> Result<Vec<CompensationRecord>> {
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct SingleRecord {
        #[serde(default)]
        level_name: Option<String>,
        #[serde(default)]
        compensation: Option<Compensation>,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Payload {
        Many(Vec<CompensationRecord>),
        One(SingleRecord),
    }

    let payload: Payload = serde_json::from_str(strip_code_fence(raw))?;
    Ok(match payload {
        Payload::Many(records) => records,
        Payload::One(SingleRecord {
            level_name,
            compensation,
        }) => vec![CompensationRecord {
            level_name,
            compensation,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;

    fn found(text: &str) -> DiscussionText {
        DiscussionText::Found(text.to_string())
    }

    fn fast(model: MockModel) -> Extractor<MockModel> {
        Extractor::new(model).with_retry(RetryPolicy::fixed(Duration::ZERO, 3))
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[{}]\n```"), "[{}]");
        assert_eq!(strip_code_fence("```\n[]\n```\n"), "[]");
        assert_eq!(strip_code_fence("```json[{}]```"), "[{}]");
        assert_eq!(strip_code_fence("  [1, 2]  "), "[1, 2]");
    }

    #[test]
    fn test_parse_records_list_and_single_object() {
        let list = parse_records("```json\n[{\"level_name\": \"L4\"}, {}]\n```").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].level_name.as_deref(), Some("L4"));
        assert!(list[1].is_empty());

        let single = parse_records("{\"level_name\": \"SDE II\"}").unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_parse_records_rejects_prose() {
        assert!(parse_records("Here are the salaries you asked for").is_err());
    }

    #[test]
    fn test_parse_records_rejects_foreign_objects() {
        let wrapped = r#"{"salaries": [{"level_name": "L4", "compensation": {"base": 3000000}}]}"#;
        assert!(parse_records(wrapped).is_err());
        assert!(parse_records(r#"{"error": "I cannot process this request"}"#).is_err());

        let empty = parse_records("{}").unwrap();
        assert_eq!(empty, vec![CompensationRecord::default()]);
    }

    #[tokio::test]
    async fn test_wrapped_reply_is_retried() {
        let model = MockModel::new()
            .with_response(r#"{"salaries": [{"level_name": "L4"}]}"#)
            .with_response(r#"[{"level_name": "L4"}]"#);
        let extractor = fast(model.clone());

        let result = extractor.extract(&[found("L4 offer")]).await.unwrap();

        assert_eq!(result.attempts, 2);
        assert_eq!(result.records[0].level_name.as_deref(), Some("L4"));
    }

    #[tokio::test]
    async fn test_missing_texts_are_not_sent() {
        let model = MockModel::new().with_response("[{}, {}]");
        let extractor = fast(model.clone());

        let result = extractor
            .extract(&[found("post one"), DiscussionText::Missing, found("post two")])
            .await
            .unwrap();

        assert_eq!(result.chunk_count, 2);
        assert_eq!(result.records.len(), 2);
        assert!(result.warnings.is_empty());

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("post one\n\n\n---------\n\n\npost two"));
        assert!(!prompts[0].contains("None"));
        assert!(!prompts[0].contains("null\n\n\n---------"));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_model() {
        let model = MockModel::new();
        let extractor = fast(model.clone());

        let result = extractor
            .extract(&[DiscussionText::Missing, DiscussionText::Missing])
            .await
            .unwrap();

        assert!(result.records.is_empty());
        assert_eq!(result.attempts, 0);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_then_valid_keeps_second() {
        let model = MockModel::new()
            .with_response("Sure! Here is the JSON:")
            .with_response("```json\n[{\"level_name\": \"L5\", \"compensation\": {\"base\": \"60L\"}}]\n```");
        let extractor = fast(model.clone());

        let result = extractor.extract(&[found("L5 offer, 60L base")]).await.unwrap();

        assert_eq!(result.attempts, 2);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].level_name.as_deref(), Some("L5"));
        assert_eq!(
            result.records[0].compensation.as_ref().unwrap().base,
            Some(6_000_000.0)
        );
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_warned_not_failed() {
        let model = MockModel::new().with_response("[{}]");
        let extractor = fast(model);

        let result = extractor
            .extract(&[found("a"), found("b"), found("c")])
            .await
            .unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("1 records for 3"));
    }

    #[tokio::test]
    async fn test_exhaustion_is_extraction_error() {
        let model = MockModel::new()
            .with_error("quota exceeded")
            .with_response("not json")
            .with_response("still not json");
        let extractor = fast(model.clone());

        let err = extractor.extract(&[found("a")]).await.unwrap_err();

        match err {
            ScrapeError::Extraction { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected extraction error, got {:?}", other),
        }
        assert_eq!(model.call_count(), 3);
    }
}
