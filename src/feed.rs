//! The paper feed as seen by the surrounding application.
//!
//! [`PaperFeed`] puts the listing source and the trending source behind one
//! object. Category listings, searches and id lookups fail fast with a
//! [`FeedError`]; trending never fails.

use std::sync::Arc;

use crate::config::Config;
use crate::models::{start_index, ArxivCategory, Paper, PapersResponse, ARXIV_CATEGORIES};
use crate::sources::{ArxivSource, FeedError, HuggingFaceSource, Source};

/// Entry point for fetching papers
#[derive(Debug, Clone)]
pub struct PaperFeed {
    listing: Arc<dyn Source>,
    trending: Arc<dyn Source>,
}

impl PaperFeed {
    /// Wire the arXiv and HuggingFace sources from configuration
    pub fn from_config(config: &Config) -> Result<Self, FeedError> {
        Ok(Self::with_sources(
            Arc::new(ArxivSource::from_config(config)?),
            Arc::new(HuggingFaceSource::from_config(config)?),
        ))
    }

    /// Use the given sources for listings and for trending papers
    pub fn with_sources(listing: Arc<dyn Source>, trending: Arc<dyn Source>) -> Self {
        Self { listing, trending }
    }

    /// Newest papers in a supported category, starting at offset `start`
    pub async fn list_by_category(
        &self,
        category: &str,
        start: usize,
        page_size: usize,
    ) -> Result<PapersResponse, FeedError> {
        self.listing
            .list_by_category(category, start, page_size)
            .await
    }

    /// One zero-based page of a category listing
    pub async fn list_page(
        &self,
        category: &str,
        page: usize,
        page_size: usize,
    ) -> Result<PapersResponse, FeedError> {
        self.list_by_category(category, start_index(page, page_size), page_size)
            .await
    }

    /// Papers matching free text, starting at offset `start`
    pub async fn search_by_text(
        &self,
        query: &str,
        start: usize,
        page_size: usize,
    ) -> Result<PapersResponse, FeedError> {
        self.listing.search_by_text(query, start, page_size).await
    }

    /// One zero-based page of search results
    pub async fn search_page(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> Result<PapersResponse, FeedError> {
        self.search_by_text(query, start_index(page, page_size), page_size)
            .await
    }

    /// A single paper; `Ok(None)` when it does not exist
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Paper>, FeedError> {
        self.listing.get_by_id(id).await
    }

    /// Today's trending papers, empty when the upstream is unavailable
    pub async fn list_trending(&self) -> Vec<Paper> {
        self.trending.list_trending().await
    }

    /// Categories that can be listed
    pub fn categories(&self) -> &'static [ArxivCategory] {
        ARXIV_CATEGORIES
    }
}
