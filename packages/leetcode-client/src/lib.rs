//! Minimal LeetCode Discuss client.
//!
//! Two calls: a GraphQL search over Discuss posts, and a GET of a post's
//! server-rendered page. The HTTP client presents itself as a desktop
//! browser (user agent, accept headers, cookie jar) so the basic bot checks
//! in front of the post pages let it through.
//!
//! # Example
//!
//! ```rust,ignore
//! use leetcode_client::{LeetCodeClient, SearchVariables, page};
//!
//! let client = LeetCodeClient::new()?;
//!
//! let posts = client
//!     .search_discussions(&SearchVariables::new("google salary india"))
//!     .await?;
//! for post in &posts {
//!     let html = client.fetch_discussion_page(&post.topic.id, &post.slug).await?;
//!     println!("{:?}", page::discussion_content(&html));
//! }
//! ```

pub mod error;
pub mod page;
pub mod types;

pub use error::{LeetCodeError, Result};
pub use types::{DiscussionNode, SearchVariables, DEFAULT_PAGE_SIZE};

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, warn};
use types::{DiscussSearchData, GraphQlRequest, GraphQlResponse, DISCUSS_SEARCH_QUERY};

const BASE_URL: &str = "https://leetcode.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct LeetCodeClient {
    client: reqwest::Client,
    base_url: String,
}

impl LeetCodeClient {
    /// Create a client against `https://leetcode.com`.
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );
        headers.insert(
            header::UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static("1"),
        );

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the client at a different host (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Canonical URL of a Discuss post.
    pub fn discussion_url(&self, topic_id: &str, slug: &str) -> String {
        format!("{}/discuss/post/{}/{}", self.base_url, topic_id, slug)
    }

    /// Run the Discuss search and return the matching posts in ranking order.
    pub async fn search_discussions(
        &self,
        variables: &SearchVariables,
    ) -> Result<Vec<DiscussionNode>> {
        let url = format!("{}/graphql/", self.base_url);
        let body = GraphQlRequest {
            query: DISCUSS_SEARCH_QUERY,
            variables,
        };

        debug!(keywords = ?variables.keywords, first = variables.first, "Searching Discuss");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, "Discuss search failed");
            return Err(LeetCodeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let parsed: GraphQlResponse<DiscussSearchData> = serde_json::from_str(&text)
            .map_err(|e| LeetCodeError::Parse(format!("search response: {}", e)))?;

        if !parsed.errors.is_empty() {
            let messages: Vec<_> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(LeetCodeError::GraphQl(messages.join("; ")));
        }

        let data = parsed
            .data
            .ok_or_else(|| LeetCodeError::Parse("search response has no data".into()))?;

        let posts: Vec<DiscussionNode> = data
            .ugc_article_discussion_articles
            .edges
            .into_iter()
            .map(|edge| edge.node)
            .collect();

        debug!(count = posts.len(), "Discuss search returned posts");
        Ok(posts)
    }

    /// GET a post page and return its HTML.
    ///
    /// Any non-2xx status (including bot challenges) is an
    /// [`LeetCodeError::Status`].
    pub async fn fetch_discussion_page(&self, topic_id: &str, slug: &str) -> Result<String> {
        let url = self.discussion_url(topic_id, slug);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(url = %url, status = %status, "Discuss page not served");
            return Err(LeetCodeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.text().await?)
    }
}
