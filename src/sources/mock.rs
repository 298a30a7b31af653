//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use crate::models::{Paper, PaperBuilder, PapersResponse};
use crate::sources::{FeedError, Source};

/// A mock source for testing that returns predefined responses.
///
/// Unset responses behave like an empty upstream: listings come back empty,
/// lookups find nothing. Input is not validated.
#[derive(Debug, Default)]
pub struct MockSource {
    listing: Mutex<Option<PapersResponse>>,
    paper: Mutex<Option<Paper>>,
    trending: Mutex<Vec<Paper>>,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response returned for listings and searches.
    pub fn set_listing(&self, response: PapersResponse) {
        *lock(&self.listing) = Some(response);
    }

    /// Set the paper returned for id lookups.
    pub fn set_paper(&self, paper: Paper) {
        *lock(&self.paper) = Some(paper);
    }

    /// Set the trending batch.
    pub fn set_trending(&self, papers: Vec<Paper>) {
        *lock(&self.trending) = papers;
    }

    /// Clear every configured response.
    pub fn clear(&self) {
        *lock(&self.listing) = None;
        *lock(&self.paper) = None;
        lock(&self.trending).clear();
    }

    /// Calls received so far, formatted as `operation:args`
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: String) {
        lock(&self.calls).push(call);
    }

    fn listing_or_empty(&self, start: usize) -> PapersResponse {
        match &*lock(&self.listing) {
            Some(response) => {
                PapersResponse::new(response.papers.clone(), response.total_results, start)
            }
            None => PapersResponse::empty(start),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn list_by_category(
        &self,
        category: &str,
        start: usize,
        page_size: usize,
    ) -> Result<PapersResponse, FeedError> {
        self.record(format!("list:{}:{}:{}", category, start, page_size));
        Ok(self.listing_or_empty(start))
    }

    async fn search_by_text(
        &self,
        query: &str,
        start: usize,
        page_size: usize,
    ) -> Result<PapersResponse, FeedError> {
        self.record(format!("search:{}:{}:{}", query, start, page_size));
        Ok(self.listing_or_empty(start))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Paper>, FeedError> {
        self.record(format!("get:{}", id));
        Ok(lock(&self.paper).clone())
    }

    async fn list_trending(&self) -> Vec<Paper> {
        self.record("trending".to_string());
        lock(&self.trending).clone()
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(id: &str, title: &str) -> Paper {
    PaperBuilder::new(id)
        .title(title)
        .authors(vec!["Test Author".to_string()])
        .categories(vec!["cs.AI".to_string()])
        .published_date("2024-01-15T10:00:00Z")
        .updated_date("2024-01-15T10:00:00Z")
        .build()
}
