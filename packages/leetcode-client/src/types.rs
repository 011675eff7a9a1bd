//! LeetCode GraphQL request and response types.

use serde::{Deserialize, Deserializer, Serialize};

/// GraphQL document for the Discuss search. Field selection mirrors what the
/// web client asks for so the endpoint treats us like a browser session.
pub const DISCUSS_SEARCH_QUERY: &str = r#"
    query discussPostItems($orderBy: ArticleOrderByEnum, $keywords: [String]!, $tagSlugs: [String!], $skip: Int, $first: Int) {
  ugcArticleDiscussionArticles(
    orderBy: $orderBy
    keywords: $keywords
    tagSlugs: $tagSlugs
    skip: $skip
    first: $first
  ) {
    totalNum
    pageInfo {
      hasNextPage
    }
    edges {
      node {
        uuid
        title
        slug
        summary
        topic {
          id
        }
      }
    }
  }
}
    "#;

/// Default page size for Discuss searches.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// GraphQL POST body.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

/// Variables for [`DISCUSS_SEARCH_QUERY`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchVariables {
    pub order_by: String,
    pub keywords: Vec<String>,
    pub tag_slugs: Vec<String>,
    pub skip: u32,
    pub first: u32,
}

impl SearchVariables {
    /// Search for `keywords` among compensation posts, most relevant first.
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            order_by: "MOST_RELEVANT".to_string(),
            keywords: vec![keywords.into()],
            tag_slugs: vec!["compensation".to_string()],
            skip: 0,
            first: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page size.
    pub fn with_first(mut self, first: u32) -> Self {
        self.first = first;
        self
    }
}

/// Envelope of every GraphQL response.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussSearchData {
    pub ugc_article_discussion_articles: ArticleConnection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleConnection {
    pub total_num: Option<u64>,
    pub page_info: Option<PageInfo>,
    pub edges: Vec<ArticleEdge>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleEdge {
    pub node: DiscussionNode,
}

/// One search hit. `topic.id` and `slug` are what the post URL is built from.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionNode {
    pub uuid: Option<String>,
    pub title: Option<String>,
    pub slug: String,
    pub summary: Option<String>,
    pub topic: Topic,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topic {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// Topic ids are integers in the schema but some responses quote them.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    })
}
