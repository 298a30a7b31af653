//! Paper sources behind the feed.
//!
//! Two upstreams feed the same [`Paper`] model:
//!
//! - [`ArxivSource`]: the arXiv Atom API, for category listings, free-text
//!   search and single-id lookup. Results are cached per query for a TTL
//!   window and upstream failures are returned to the caller.
//! - [`HuggingFaceSource`]: the HuggingFace daily papers API, one batch of
//!   trending papers. Failures degrade to an empty list.
//!
//! Both implement [`Source`], so the facade in [`crate::feed`] can be driven
//! by [`MockSource`] in tests.

mod arxiv;
pub mod atom;
mod huggingface;
pub mod mock;
pub mod query;

pub use arxiv::{ArxivSource, CachedPage};
pub use atom::{parse_feed, AtomFeed};
pub use huggingface::HuggingFaceSource;
pub use mock::MockSource;
pub use query::ArxivQuery;

use crate::models::{Paper, PapersResponse};
use async_trait::async_trait;

/// The Source trait defines the interface for all paper upstreams.
///
/// Every operation has a default, so a source only implements what its
/// upstream offers.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g., "arxiv", "huggingface")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Newest papers in a supported category
    async fn list_by_category(
        &self,
        _category: &str,
        _start: usize,
        _page_size: usize,
    ) -> Result<PapersResponse, FeedError> {
        Err(FeedError::NotSupported)
    }

    /// Papers matching free text, most relevant first
    async fn search_by_text(
        &self,
        _query: &str,
        _start: usize,
        _page_size: usize,
    ) -> Result<PapersResponse, FeedError> {
        Err(FeedError::NotSupported)
    }

    /// A single paper by bare id; `Ok(None)` when upstream has no such paper
    async fn get_by_id(&self, _id: &str) -> Result<Option<Paper>, FeedError> {
        Err(FeedError::NotSupported)
    }

    /// Today's trending papers. Never fails: an unavailable upstream yields
    /// an empty list.
    async fn list_trending(&self) -> Vec<Paper> {
        Vec::new()
    }
}

/// Errors that can occur when fetching from a source
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Category is not in the supported list
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// Search text is empty after trimming
    #[error("Search query is required")]
    InvalidQuery,

    /// Paper id is empty after trimming
    #[error("Paper id is required")]
    InvalidId,

    /// Upstream answered 2xx but the body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Upstream answered with a non-2xx status
    #[error("Upstream API returned status {0}")]
    Upstream(u16),

    /// Transport failure before a status was received
    #[error("Network error: {0}")]
    Network(String),

    /// A configured value (such as the API base URL) is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested operation is not offered by this source
    #[error("Operation not supported by this source")]
    NotSupported,
}

impl FeedError {
    /// Input problems the caller should fix rather than retry
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            FeedError::InvalidCategory(_) | FeedError::InvalidQuery | FeedError::InvalidId
        )
    }

    /// Failures that surface to users as a generic "try again"
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            FeedError::Parse(_) | FeedError::Upstream(_) | FeedError::Network(_)
        )
    }

    /// HTTP status of an upstream rejection, if that is what this is
    pub fn status(&self) -> Option<u16> {
        match self {
            FeedError::Upstream(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::Error> for FeedError {
    fn from(err: quick_xml::Error) -> Self {
        FeedError::Parse(format!("XML: {}", err))
    }
}
