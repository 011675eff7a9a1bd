//! Discuss post page parsing.
//!
//! Post pages are server-rendered by Next.js; the post body lives inside the
//! `__NEXT_DATA__` script as part of the dehydrated react-query cache.

use scraper::{Html, Selector};
use tracing::debug;

/// JSON pointer from the `__NEXT_DATA__` root to the post body.
pub const CONTENT_POINTER: &str =
    "/props/pageProps/dehydratedState/queries/0/state/data/ugcArticleDiscussionArticle/content";

/// Extract and parse the `__NEXT_DATA__` payload from a page.
pub fn next_data(html: &str) -> Option<serde_json::Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__").ok()?;
    let script = document.select(&selector).next()?;
    let raw = script.text().collect::<String>();

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "__NEXT_DATA__ is not valid JSON");
            None
        }
    }
}

/// Post body text with literal `\n` escapes turned into newlines.
///
/// Returns `None` when the data block is absent or the content path does not
/// resolve to a string.
pub fn discussion_content(html: &str) -> Option<String> {
    let data = next_data(html)?;
    let content = data.pointer(CONTENT_POINTER)?.as_str()?;
    Some(content.replace("\\n", "\n"))
}
