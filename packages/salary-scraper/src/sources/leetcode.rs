//! LeetCode Discuss source.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use leetcode_client::{page, LeetCodeClient, LeetCodeError, SearchVariables, DEFAULT_PAGE_SIZE};
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};
use crate::retry::{RetryOutcome, RetryPolicy};
use crate::sources::Source;
use crate::types::{CompanyQuery, DiscussionText, ThreadReference};

pub const SOURCE_NAME: &str = "leetcode";

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

#[derive(Debug, Clone)]
pub struct LeetCodeSourceConfig {
    /// Search hits per company
    pub page_size: u32,
    /// Appended to the company keyword in the search
    pub keyword_suffix: String,
    /// Request quota shared by search and page fetches
    pub requests_per_second: u32,
    pub discovery_retry: RetryPolicy,
    pub retrieval_retry: RetryPolicy,
}

impl Default for LeetCodeSourceConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            keyword_suffix: "salary india".to_string(),
            requests_per_second: 2,
            discovery_retry: RetryPolicy::exponential(
                Duration::from_millis(500),
                Duration::from_secs(8),
                3,
            ),
            retrieval_retry: RetryPolicy::fixed(Duration::from_secs(1), 5),
        }
    }
}

impl LeetCodeSourceConfig {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = rps;
        self
    }

    pub fn with_discovery_retry(mut self, policy: RetryPolicy) -> Self {
        self.discovery_retry = policy;
        self
    }

    pub fn with_retrieval_retry(mut self, policy: RetryPolicy) -> Self {
        self.retrieval_retry = policy;
        self
    }
}

pub struct LeetCodeSource {
    client: LeetCodeClient,
    config: LeetCodeSourceConfig,
    limiter: Arc<DefaultRateLimiter>,
}

impl LeetCodeSource {
    pub fn new(client: LeetCodeClient, config: LeetCodeSourceConfig) -> Self {
        let rps = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            client,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
            config,
        }
    }

    /// Variables sent to the Discuss search for `company`.
    pub fn search_variables(&self, company: &CompanyQuery) -> SearchVariables {
        let keywords = format!("{} {}", company.keyword(), self.config.keyword_suffix);
        SearchVariables::new(keywords.trim()).with_first(self.config.page_size)
    }

    pub fn thread_url(&self, thread: &ThreadReference) -> String {
        thread.url(self.client.base_url())
    }
}

#[async_trait]
impl Source for LeetCodeSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn discover(&self, company: &CompanyQuery) -> Result<Vec<ThreadReference>> {
        let variables = self.search_variables(company);
        let client = &self.client;
        let limiter = &self.limiter;
        let vars = &variables;

        let outcome = self
            .config
            .discovery_retry
            .run_while("leetcode search", LeetCodeError::is_transient, move |_| async move {
                limiter.until_ready().await;
                client.search_discussions(vars).await
            })
            .await;

        let posts = outcome.into_result().map_err(|e| ScrapeError::Discovery {
            source_name: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })?;

        let threads: Vec<ThreadReference> = posts
            .into_iter()
            .map(|post| {
                let thread = ThreadReference::new(post.topic.id, post.slug);
                match post.title {
                    Some(title) => thread.with_title(title),
                    None => thread,
                }
            })
            .collect();

        info!(
            company = company.name(),
            keywords = ?variables.keywords,
            count = threads.len(),
            "Discovered LeetCode threads"
        );
        Ok(threads)
    }

    async fn retrieve(&self, thread: &ThreadReference) -> Result<DiscussionText> {
        let url = self.thread_url(thread);
        let client = &self.client;
        let limiter = &self.limiter;

        let outcome = self
            .config
            .retrieval_retry
            .run("leetcode page", move |_| async move {
                limiter.until_ready().await;
                client
                    .fetch_discussion_page(&thread.identifier, &thread.slug)
                    .await
            })
            .await;

        match outcome {
            RetryOutcome::Success { value: html, attempts } => {
                let text = DiscussionText::from(page::discussion_content(&html));
                if text.is_missing() {
                    warn!(url = %url, "Page has no post content");
                } else {
                    debug!(url = %url, attempts, "Retrieved thread");
                }
                Ok(text)
            }
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => Err(ScrapeError::RetrievalExhausted {
                url,
                attempts,
                last_error: last_error.to_string(),
            }),
        }
    }
}
