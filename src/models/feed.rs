//! Listing envelope and pagination helpers.

use serde::{Deserialize, Serialize};

use super::Paper;

/// Default number of papers per page
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Smallest page size the upstream is asked for
pub const MIN_PAGE_SIZE: usize = 1;
/// Largest page size the upstream is asked for
pub const MAX_PAGE_SIZE: usize = 50;

/// One page of a category listing or a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PapersResponse {
    /// Papers in upstream order
    pub papers: Vec<Paper>,

    /// Total number of matches reported upstream
    pub total_results: usize,

    /// Zero-based offset of the first paper
    pub start_index: usize,

    /// Whether another page exists past this one
    pub has_more: bool,
}

impl PapersResponse {
    /// Build an envelope, deriving `has_more` from this page's own offset
    /// and length.
    pub fn new(papers: Vec<Paper>, total_results: usize, start_index: usize) -> Self {
        let has_more = start_index.saturating_add(papers.len()) < total_results;
        Self {
            papers,
            total_results,
            start_index,
            has_more,
        }
    }

    /// An empty single-page envelope
    pub fn empty(start_index: usize) -> Self {
        Self::new(Vec::new(), 0, start_index)
    }

    /// Number of papers on this page
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// Whether this page has no papers
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Offset of the page after this one
    pub fn next_start(&self) -> usize {
        self.start_index.saturating_add(self.papers.len())
    }
}

/// Clamp a requested page size into the range the upstream accepts
pub fn clamp_page_size(page_size: usize) -> usize {
    page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

/// Convert a zero-based page number into an upstream offset
pub fn start_index(page: usize, page_size: usize) -> usize {
    page.saturating_mul(clamp_page_size(page_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaperBuilder;

    fn papers(n: usize) -> Vec<Paper> {
        (0..n)
            .map(|i| PaperBuilder::new(format!("2301.{:05}", i)).build())
            .collect()
    }

    #[test]
    fn test_has_more() {
        assert!(PapersResponse::new(papers(10), 25, 0).has_more);
        assert!(PapersResponse::new(papers(10), 25, 10).has_more);
        assert!(!PapersResponse::new(papers(5), 25, 20).has_more);
        assert!(!PapersResponse::new(papers(0), 0, 0).has_more);
    }

    #[test]
    fn test_has_more_short_page() {
        // fewer papers than requested but still behind the total
        let response = PapersResponse::new(papers(3), 100, 0);
        assert!(response.has_more);
        assert_eq!(response.next_start(), 3);
    }

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(0), 1);
        assert_eq!(clamp_page_size(10), 10);
        assert_eq!(clamp_page_size(500), 50);
    }

    #[test]
    fn test_start_index() {
        assert_eq!(start_index(0, 10), 0);
        assert_eq!(start_index(3, 10), 30);
        assert_eq!(start_index(2, 100), 100);
    }

    #[test]
    fn test_envelope_serializes_camel_case() {
        let json = serde_json::to_value(PapersResponse::empty(20)).unwrap();
        assert_eq!(json["startIndex"], 20);
        assert_eq!(json["totalResults"], 0);
        assert_eq!(json["hasMore"], false);
    }
}
