//! arXiv API query construction.
//!
//! Three kinds of request go to the same endpoint:
//!
//! | kind     | parameters                                                     |
//! |----------|----------------------------------------------------------------|
//! | category | `search_query=cat:<code>`, newest submissions first, paginated |
//! | search   | `search_query=all:<text>`, most relevant first, paginated      |
//! | id       | `id_list=<id>`, no pagination                                  |

use url::Url;

use crate::models::clamp_page_size;
use crate::sources::FeedError;

/// One upstream request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArxivQuery {
    /// Newest papers in a category
    Category {
        category: String,
        start: usize,
        max_results: usize,
    },
    /// Free-text search
    Search {
        query: String,
        start: usize,
        max_results: usize,
    },
    /// Single paper lookup
    Id(String),
}

impl ArxivQuery {
    /// Category listing; `max_results` is clamped into the accepted range.
    ///
    /// The category is not checked here, that is up to the caller.
    pub fn category(category: impl Into<String>, start: usize, max_results: usize) -> Self {
        ArxivQuery::Category {
            category: category.into(),
            start,
            max_results: clamp_page_size(max_results),
        }
    }

    /// Free-text search; fails on empty or whitespace-only text
    pub fn search(query: &str, start: usize, max_results: usize) -> Result<Self, FeedError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FeedError::InvalidQuery);
        }

        Ok(ArxivQuery::Search {
            query: query.to_string(),
            start,
            max_results: clamp_page_size(max_results),
        })
    }

    /// Single-id lookup; fails on an empty id
    pub fn id(id: &str) -> Result<Self, FeedError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(FeedError::InvalidId);
        }

        Ok(ArxivQuery::Id(id.to_string()))
    }

    /// Offset of the first requested result
    pub fn start(&self) -> usize {
        match self {
            ArxivQuery::Category { start, .. } | ArxivQuery::Search { start, .. } => *start,
            ArxivQuery::Id(_) => 0,
        }
    }

    /// The `search_query` expression, for paginated kinds
    pub fn search_expression(&self) -> Option<String> {
        match self {
            ArxivQuery::Category { category, .. } => Some(format!("cat:{}", category)),
            ArxivQuery::Search { query, .. } => Some(format!("all:{}", query)),
            ArxivQuery::Id(_) => None,
        }
    }

    /// Composite cache key covering every parameter that shapes the answer
    pub fn cache_key(&self) -> String {
        match self {
            ArxivQuery::Category {
                category,
                start,
                max_results,
            } => format!("category:{}:{}:{}", category, start, max_results),
            ArxivQuery::Search {
                query,
                start,
                max_results,
            } => format!("search:{}:{}:{}", query, start, max_results),
            ArxivQuery::Id(id) => format!("id:{}", id),
        }
    }

    /// Build the full request URL against the given API endpoint
    pub fn to_url(&self, api_url: &str) -> Result<Url, FeedError> {
        let mut url = Url::parse(api_url)
            .map_err(|e| FeedError::InvalidConfig(format!("API URL '{}': {}", api_url, e)))?;

        {
            let mut params = url.query_pairs_mut();
            match self {
                ArxivQuery::Category {
                    start, max_results, ..
                } => {
                    params
                        .append_pair("search_query", &self.search_expression().unwrap_or_default())
                        .append_pair("start", &start.to_string())
                        .append_pair("max_results", &max_results.to_string())
                        .append_pair("sortBy", "submittedDate")
                        .append_pair("sortOrder", "descending");
                }
                ArxivQuery::Search {
                    start, max_results, ..
                } => {
                    params
                        .append_pair("search_query", &self.search_expression().unwrap_or_default())
                        .append_pair("start", &start.to_string())
                        .append_pair("max_results", &max_results.to_string())
                        .append_pair("sortBy", "relevance")
                        .append_pair("sortOrder", "descending");
                }
                ArxivQuery::Id(id) => {
                    params.append_pair("id_list", id);
                }
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const API: &str = "https://export.arxiv.org/api/query";

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_category_url() {
        let url = ArxivQuery::category("cs.AI", 20, 10).to_url(API).unwrap();
        let p = params(&url);

        assert_eq!(url.host_str(), Some("export.arxiv.org"));
        assert_eq!(url.path(), "/api/query");
        assert_eq!(p["search_query"], "cat:cs.AI");
        assert_eq!(p["start"], "20");
        assert_eq!(p["max_results"], "10");
        assert_eq!(p["sortBy"], "submittedDate");
        assert_eq!(p["sortOrder"], "descending");
        assert!(!p.contains_key("id_list"));
    }

    #[test]
    fn test_search_url() {
        let url = ArxivQuery::search("  graph neural networks ", 0, 25)
            .unwrap()
            .to_url(API)
            .unwrap();
        let p = params(&url);

        assert_eq!(p["search_query"], "all:graph neural networks");
        assert_eq!(p["sortBy"], "relevance");
        assert_eq!(p["sortOrder"], "descending");
        assert_eq!(p["max_results"], "25");
    }

    #[test]
    fn test_search_url_is_encoded() {
        let url = ArxivQuery::search("a&b=c", 0, 10)
            .unwrap()
            .to_url(API)
            .unwrap();

        assert!(!url.as_str().contains("a&b=c"));
        assert_eq!(params(&url)["search_query"], "all:a&b=c");
    }

    #[test]
    fn test_id_url() {
        let url = ArxivQuery::id("2301.12345").unwrap().to_url(API).unwrap();
        let p = params(&url);

        assert_eq!(p["id_list"], "2301.12345");
        assert!(!p.contains_key("start"));
        assert!(!p.contains_key("max_results"));
        assert!(!p.contains_key("search_query"));
    }

    #[test]
    fn test_empty_search_rejected() {
        assert!(matches!(
            ArxivQuery::search("", 0, 10),
            Err(FeedError::InvalidQuery)
        ));
        assert!(matches!(
            ArxivQuery::search("   \n", 0, 10),
            Err(FeedError::InvalidQuery)
        ));
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(matches!(ArxivQuery::id("  "), Err(FeedError::InvalidId)));
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(
            ArxivQuery::category("cs.AI", 0, 0),
            ArxivQuery::category("cs.AI", 0, 1)
        );
        match ArxivQuery::category("cs.AI", 0, 500) {
            ArxivQuery::Category { max_results, .. } => assert_eq!(max_results, 50),
            other => panic!("unexpected query {:?}", other),
        }
    }

    #[test]
    fn test_cache_keys() {
        assert_eq!(
            ArxivQuery::category("cs.LG", 10, 10).cache_key(),
            "category:cs.LG:10:10"
        );
        assert_eq!(
            ArxivQuery::search(" llm ", 0, 10).unwrap().cache_key(),
            "search:llm:0:10"
        );
        assert_eq!(ArxivQuery::id("2301.12345").unwrap().cache_key(), "id:2301.12345");
        assert_ne!(
            ArxivQuery::category("cs.LG", 0, 10).cache_key(),
            ArxivQuery::category("cs.LG", 0, 20).cache_key()
        );
    }

    #[test]
    fn test_invalid_api_url() {
        let err = ArxivQuery::category("cs.AI", 0, 10)
            .to_url("not a url")
            .unwrap_err();
        assert!(matches!(err, FeedError::InvalidConfig(_)));
        assert!(!err.is_upstream_failure());
    }
}
