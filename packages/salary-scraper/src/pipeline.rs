//! Orchestration: discovery, retrieval and extraction per company and source.
//!
//! Companies and threads are processed with bounded, order-preserving
//! concurrency. A failure in one (company, source) pair is recorded in the
//! [`RunResult`] and does not stop the run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::error::{Result, ScrapeError};
use crate::extraction::{Extractor, LanguageModel};
use crate::sources::Source;
use crate::types::{
    CompanyQuery, DiscussionText, RunResult, SalaryReport, SourceFailure, SourceOutcome,
    SourceReport, Stage,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Threads retrieved at once for one company
    pub thread_concurrency: usize,
    /// Companies processed at once
    pub company_concurrency: usize,
    pub discovery_timeout: Duration,
    /// Deadline for each thread retrieval, retries included
    pub retrieval_timeout: Duration,
    pub extraction_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            thread_concurrency: 4,
            company_concurrency: 2,
            discovery_timeout: Duration::from_secs(120),
            retrieval_timeout: Duration::from_secs(120),
            extraction_timeout: Duration::from_secs(300),
        }
    }
}

impl PipelineConfig {
    pub fn with_thread_concurrency(mut self, n: usize) -> Self {
        self.thread_concurrency = n;
        self
    }

    pub fn with_company_concurrency(mut self, n: usize) -> Self {
        self.company_concurrency = n;
        self
    }

    /// Same deadline for every stage.
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self.retrieval_timeout = timeout;
        self.extraction_timeout = timeout;
        self
    }
}

pub struct Pipeline<M: LanguageModel> {
    sources: Vec<Arc<dyn Source>>,
    extractor: Extractor<M>,
    config: PipelineConfig,
}

impl<M: LanguageModel> Pipeline<M> {
    pub fn new(extractor: Extractor<M>) -> Self {
        Self {
            sources: Vec::new(),
            extractor,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Run every company through every source.
    pub async fn run(&self, companies: &[String]) -> RunResult {
        info!(
            companies = companies.len(),
            sources = self.sources.len(),
            "Starting salary collection"
        );

        let reports: Vec<(String, SalaryReport)> = stream::iter(companies)
            .map(|name| async move {
                let report = self.run_company(&CompanyQuery::new(name.as_str())).await;
                (name.clone(), report)
            })
            .buffered(self.config.company_concurrency.max(1))
            .collect()
            .await;

        let mut result = RunResult::new();
        for (name, report) in reports {
            result.insert(name, report);
        }

        info!(
            companies = result.len(),
            records = result.record_count(),
            failures = result.failures().count(),
            "Salary collection finished"
        );
        result
    }

    /// Run one company through every source.
    pub async fn run_company(&self, company: &CompanyQuery) -> SalaryReport {
        let mut report = SalaryReport::new();

        for source in &self.sources {
            let outcome = match self.run_source(source.as_ref(), company).await {
                Ok(source_report) => SourceOutcome::Report(source_report),
                Err(failure) => {
                    error!(
                        company = company.name(),
                        source = source.name(),
                        stage = %failure.failure.stage,
                        error = %failure.failure.message,
                        "Source failed"
                    );
                    SourceOutcome::Failed(failure)
                }
            };
            report.insert(source.name().to_string(), outcome);
        }

        report
    }

    async fn run_source(
        &self,
        source: &dyn Source,
        company: &CompanyQuery,
    ) -> std::result::Result<SourceReport, SourceFailure> {
        let fail = move |stage: Stage| {
            move |e: ScrapeError| SourceFailure::new(company.name(), stage, &e)
        };

        let threads = with_deadline(
            Stage::Discovery,
            self.config.discovery_timeout,
            source.discover(company),
        )
        .await
        .map_err(fail(Stage::Discovery))?;

        let texts: Vec<DiscussionText> = stream::iter(&threads)
            .map(|thread| {
                with_deadline(
                    Stage::Retrieval,
                    self.config.retrieval_timeout,
                    source.retrieve(thread),
                )
            })
            .buffered(self.config.thread_concurrency.max(1))
            .collect::<Vec<Result<DiscussionText>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<DiscussionText>>>()
            .map_err(fail(Stage::Retrieval))?;

        let missing = texts.iter().filter(|t| t.is_missing()).count();
        if missing > 0 {
            warn!(
                company = company.name(),
                source = source.name(),
                missing,
                total = texts.len(),
                "Some threads had no readable content"
            );
        }

        let extraction = with_deadline(
            Stage::Extraction,
            self.config.extraction_timeout,
            self.extractor.extract(&texts),
        )
        .await
        .map_err(fail(Stage::Extraction))?;

        info!(
            company = company.name(),
            source = source.name(),
            threads = threads.len(),
            records = extraction.records.len(),
            "Source complete"
        );

        Ok(SourceReport {
            company_name: company.name().to_string(),
            salaries: extraction.records,
            warnings: extraction.warnings,
        })
    }
}

async fn with_deadline<T>(
    stage: Stage,
    after: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| ScrapeError::Timeout { stage, after })?
}
