//! Discussion sources.
//!
//! A source knows how to find threads about a company and how to read one
//! thread's text. Extraction and orchestration only see this trait, so a new
//! forum is one more implementation.

pub mod leetcode;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CompanyQuery, DiscussionText, ThreadReference};

#[async_trait]
pub trait Source: Send + Sync {
    /// Key used for this source in [`SalaryReport`](crate::types::SalaryReport).
    fn name(&self) -> &str;

    /// Find compensation threads about `company`, most relevant first.
    ///
    /// Failures are hard errors: an empty list must mean "nothing found".
    async fn discover(&self, company: &CompanyQuery) -> Result<Vec<ThreadReference>>;

    /// Read one thread's body.
    ///
    /// A page without a readable body is `Ok(DiscussionText::Missing)`.
    async fn retrieve(&self, thread: &ThreadReference) -> Result<DiscussionText>;
}
