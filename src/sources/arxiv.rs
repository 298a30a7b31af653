//! arXiv fetch orchestration.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::sync::Arc;

use crate::config::{CacheConfig, Config};
use crate::models::{is_supported_category, Paper, PapersResponse};
use crate::sources::{parse_feed, ArxivQuery, AtomFeed, FeedError, Source};
use crate::utils::{Clock, HttpClient, SystemClock, TtlCache};

/// A fetched page as stored in the listing cache
///
/// Only the papers and the reported total are kept; the envelope is rebuilt
/// for every request so `has_more` always reflects the caller's offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub papers: Vec<Paper>,
    pub total_results: usize,
}

impl From<AtomFeed> for CachedPage {
    fn from(feed: AtomFeed) -> Self {
        Self {
            papers: feed.papers,
            total_results: feed.total_results,
        }
    }
}

/// arXiv research source
///
/// Supports:
/// - Category listing, newest first
/// - Free-text search, most relevant first
/// - Single paper lookup by id
///
/// Listings and searches share one cache keyed by query kind, parameters,
/// offset and page size. Id lookups have their own cache keyed by id.
/// Failed fetches are never cached.
#[derive(Debug)]
pub struct ArxivSource {
    client: Arc<HttpClient>,
    api_url: String,
    listings: TtlCache<CachedPage>,
    papers: TtlCache<Paper>,
}

impl ArxivSource {
    /// Create a new arXiv source with default settings
    pub fn new() -> Result<Self, FeedError> {
        Self::from_config(&Config::default())
    }

    /// Create a new arXiv source from configuration
    pub fn from_config(config: &Config) -> Result<Self, FeedError> {
        let client = Arc::new(HttpClient::from_config(&config.http)?);
        Ok(Self::with_client(client, &config.arxiv.api_url)
            .with_cache(&config.cache, Arc::new(SystemClock)))
    }

    /// Create with a custom HTTP client and endpoint (for testing)
    pub fn with_client(client: Arc<HttpClient>, api_url: impl Into<String>) -> Self {
        let cache = CacheConfig::default();
        Self {
            client,
            api_url: api_url.into(),
            listings: TtlCache::from_config(&cache, Arc::new(SystemClock)),
            papers: TtlCache::from_config(&cache, Arc::new(SystemClock)),
        }
    }

    /// Replace both caches, e.g. to drive expiry from a manual clock
    pub fn with_cache(mut self, config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        self.listings = TtlCache::from_config(config, Arc::clone(&clock));
        self.papers = TtlCache::from_config(config, clock);
        self
    }

    /// The API endpoint requests go to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Number of cached listing pages and papers, including expired ones
    pub fn cached_entries(&self) -> usize {
        self.listings.len() + self.papers.len()
    }

    /// Drop everything cached
    pub fn clear_cache(&self) {
        self.listings.clear();
        self.papers.clear();
    }

    /// Issue one request and parse the response body
    async fn fetch_feed(&self, query: &ArxivQuery) -> Result<AtomFeed, FeedError> {
        let url = query.to_url(&self.api_url)?;
        tracing::debug!("Fetching arXiv feed: {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/atom+xml")
            .send()
            .await
            .map_err(|e| FeedError::Network(format!("Failed to fetch arXiv feed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("arXiv API returned status {}", status);
            return Err(FeedError::Upstream(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Network(format!("Failed to read arXiv response: {}", e)))?;

        parse_feed(&body).inspect_err(|e| tracing::error!("Failed to parse arXiv feed: {}", e))
    }

    /// Serve a paginated query from the listing cache, fetching on a miss
    async fn fetch_page(&self, query: ArxivQuery) -> Result<PapersResponse, FeedError> {
        let key = query.cache_key();
        let start = query.start();

        if let Some(page) = self.listings.get(&key) {
            return Ok(PapersResponse::new(page.papers, page.total_results, start));
        }

        let page = CachedPage::from(self.fetch_feed(&query).await?);
        tracing::info!(
            "arXiv returned {} entries of {} for {}",
            page.papers.len(),
            page.total_results,
            key
        );

        self.listings.put(key, page.clone());
        Ok(PapersResponse::new(page.papers, page.total_results, start))
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn id(&self) -> &str {
        "arxiv"
    }

    fn name(&self) -> &str {
        "arXiv"
    }

    async fn list_by_category(
        &self,
        category: &str,
        start: usize,
        page_size: usize,
    ) -> Result<PapersResponse, FeedError> {
        if !is_supported_category(category) {
            return Err(FeedError::InvalidCategory(category.to_string()));
        }

        self.fetch_page(ArxivQuery::category(category, start, page_size))
            .await
    }

    async fn search_by_text(
        &self,
        query: &str,
        start: usize,
        page_size: usize,
    ) -> Result<PapersResponse, FeedError> {
        let query = ArxivQuery::search(query, start, page_size)?;
        self.fetch_page(query).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Paper>, FeedError> {
        let query = ArxivQuery::id(id)?;
        let key = query.cache_key();

        if let Some(paper) = self.papers.get(&key) {
            return Ok(Some(paper));
        }

        let feed = self.fetch_feed(&query).await?;
        let Some(paper) = feed.papers.into_iter().next() else {
            tracing::info!("arXiv has no paper for {}", key);
            return Ok(None);
        };

        self.papers.put(key, paper.clone());
        Ok(Some(paper))
    }
}
