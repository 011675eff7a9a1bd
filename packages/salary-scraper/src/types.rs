//! Data model: queries, thread references, compensation records and the
//! per-run result that gets written to disk.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::amount;
use crate::error::ScrapeError;

// =============================================================================
// Inputs
// =============================================================================

/// A company to collect salaries for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyQuery {
    name: String,
}

impl CompanyQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name as given by the caller; used as the key in [`RunResult`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Search keyword: the trimmed, lowercase name.
    pub fn keyword(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

impl From<&str> for CompanyQuery {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Enough of a search hit to build its page URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadReference {
    pub identifier: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ThreadReference {
    pub fn new(identifier: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            slug: slug.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// `{base}/discuss/post/{identifier}/{slug}`
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/discuss/post/{}/{}",
            base_url.trim_end_matches('/'),
            self.identifier,
            self.slug
        )
    }
}

/// Body of one thread, or the fact that none could be read from its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscussionText {
    Found(String),
    Missing,
}

impl DiscussionText {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Found(text) => Some(text),
            Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<Option<String>> for DiscussionText {
    fn from(text: Option<String>) -> Self {
        match text {
            Some(text) => Self::Found(text),
            None => Self::Missing,
        }
    }
}

// =============================================================================
// Extraction records
// =============================================================================

/// One structured compensation entry. Nothing found is `{}`, never dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompensationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensation: Option<Compensation>,
}

impl CompensationRecord {
    pub fn is_empty(&self) -> bool {
        self.level_name.is_none()
            && self.compensation.as_ref().map_or(true, Compensation::is_empty)
    }
}

/// Yearly figures in currency units. `None` means the post did not say.
///
/// Amounts may arrive from the model as numbers or as strings such as
/// `"12L"` or `"1.5Cr"`; both are normalized on the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compensation {
    #[serde(default, deserialize_with = "amount::deserialize_amount")]
    pub base: Option<f64>,
    #[serde(default, deserialize_with = "amount::deserialize_amount")]
    pub bonus: Option<f64>,
    #[serde(default, deserialize_with = "amount::deserialize_amount")]
    pub stock: Option<f64>,
    #[serde(default, deserialize_with = "amount::deserialize_amount")]
    pub total_compensation: Option<f64>,
}

impl Compensation {
    pub fn is_empty(&self) -> bool {
        self.base.is_none()
            && self.bonus.is_none()
            && self.stock.is_none()
            && self.total_compensation.is_none()
    }
}

// =============================================================================
// Results
// =============================================================================

/// Pipeline stage, recorded with failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Discovery,
    Retrieval,
    Extraction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discovery => "discovery",
            Self::Retrieval => "retrieval",
            Self::Extraction => "extraction",
        };
        f.write_str(name)
    }
}

/// Records extracted for one company from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub company_name: String,
    pub salaries: Vec<CompensationRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Why one (company, source) pair produced no records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub company_name: String,
    pub failure: FailureDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub stage: Stage,
    pub message: String,
}

impl SourceFailure {
    pub fn new(company_name: impl Into<String>, stage: Stage, error: &ScrapeError) -> Self {
        Self {
            company_name: company_name.into(),
            failure: FailureDetail {
                stage,
                message: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceOutcome {
    Report(SourceReport),
    Failed(SourceFailure),
}

impl SourceOutcome {
    pub fn report(&self) -> Option<&SourceReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&SourceFailure> {
        match self {
            Self::Report(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

/// Source name to outcome, for one company.
pub type SalaryReport = BTreeMap<String, SourceOutcome>;

/// Company name to [`SalaryReport`]: the unit persisted to the output file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunResult {
    companies: BTreeMap<String, SalaryReport>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, company: impl Into<String>, report: SalaryReport) {
        self.companies.insert(company.into(), report);
    }

    pub fn get(&self, company: &str) -> Option<&SalaryReport> {
        self.companies.get(company)
    }

    /// Outcome for a single (company, source) pair.
    pub fn outcome(&self, company: &str, source: &str) -> Option<&SourceOutcome> {
        self.companies.get(company)?.get(source)
    }

    pub fn companies(&self) -> impl Iterator<Item = (&String, &SalaryReport)> {
        self.companies.iter()
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// All failures as `(company, source, failure)`.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str, &SourceFailure)> {
        self.companies.iter().flat_map(|(company, report)| {
            report.iter().filter_map(move |(source, outcome)| {
                outcome
                    .failure()
                    .map(|failure| (company.as_str(), source.as_str(), failure))
            })
        })
    }

    /// Total number of records across all successful reports.
    pub fn record_count(&self) -> usize {
        self.companies
            .values()
            .flat_map(|report| report.values())
            .filter_map(SourceOutcome::report)
            .map(|report| report.salaries.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_is_trimmed_lowercase() {
        assert_eq!(CompanyQuery::new("  Goldman Sachs ").keyword(), "goldman sachs");
        assert_eq!(CompanyQuery::new("Goldman Sachs").name(), "Goldman Sachs");
    }

    #[test]
    fn test_thread_url_template() {
        let thread = ThreadReference::new("5001", "google-l4-offer");
        assert_eq!(
            thread.url("https://leetcode.com/"),
            "https://leetcode.com/discuss/post/5001/google-l4-offer"
        );
    }

    #[test]
    fn test_empty_record_serializes_as_empty_object() {
        let record = CompensationRecord::default();
        assert!(record.is_empty());
        assert_eq!(serde_json::to_string(&record).unwrap(), "{}");

        let parsed: CompensationRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_record_with_null_figures() {
        let record: CompensationRecord = serde_json::from_str(
            r#"{"level_name": "SDE II", "compensation": {"base": 2800000, "bonus": null, "stock": null, "total_compensation": null}}"#,
        )
        .unwrap();

        assert_eq!(record.level_name.as_deref(), Some("SDE II"));
        let comp = record.compensation.unwrap();
        assert_eq!(comp.base, Some(2_800_000.0));
        assert_eq!(comp.bonus, None);
        assert!(!comp.is_empty());
    }

    #[test]
    fn test_record_amounts_as_strings_are_normalized() {
        let record: CompensationRecord = serde_json::from_str(
            r#"{"level_name": "L4", "compensation": {"base": "45L", "stock": "1.5Cr"}}"#,
        )
        .unwrap();

        let comp = record.compensation.unwrap();
        assert_eq!(comp.base, Some(4_500_000.0));
        assert_eq!(comp.stock, Some(15_000_000.0));
        assert_eq!(comp.bonus, None);
    }

    #[test]
    fn test_outcome_untagged_shapes() {
        let report = SourceOutcome::Report(SourceReport {
            company_name: "Google".into(),
            salaries: vec![CompensationRecord::default()],
            warnings: vec![],
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["company_name"], "Google");
        assert!(json.get("warnings").is_none());

        let failed = SourceOutcome::Failed(SourceFailure::new(
            "Google",
            Stage::Discovery,
            &ScrapeError::Discovery {
                source_name: "leetcode".into(),
                message: "HTTP 500".into(),
            },
        ));
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["failure"]["stage"], "discovery");

        let back: SourceOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, failed);
    }

    #[test]
    fn test_run_result_failures_and_counts() {
        let mut ok = SalaryReport::new();
        ok.insert(
            "leetcode".into(),
            SourceOutcome::Report(SourceReport {
                company_name: "Google".into(),
                salaries: vec![CompensationRecord::default(), CompensationRecord::default()],
                warnings: vec![],
            }),
        );
        let mut bad = SalaryReport::new();
        bad.insert(
            "leetcode".into(),
            SourceOutcome::Failed(SourceFailure {
                company_name: "Acme".into(),
                failure: FailureDetail {
                    stage: Stage::Retrieval,
                    message: "exhausted".into(),
                },
            }),
        );

        let mut result = RunResult::new();
        result.insert("Google", ok);
        result.insert("Acme", bad);

        assert_eq!(result.len(), 2);
        assert_eq!(result.record_count(), 2);
        let failures: Vec<_> = result.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "Acme");
        assert_eq!(failures[0].2.failure.stage, Stage::Retrieval);
    }
}
