//! HuggingFace daily papers source implementation.
//!
//! The daily papers endpoint returns one fixed batch of trending arXiv
//! papers as JSON. It carries no arXiv taxonomy, so every paper is filed
//! under a single configured category.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{Paper, PaperBuilder, DEFAULT_CATEGORY};
use crate::sources::{FeedError, Source};
use crate::utils::HttpClient;

/// HuggingFace trending papers source
///
/// Unlike [`crate::sources::ArxivSource`] this source never fails: any
/// upstream problem is logged and yields an empty batch.
#[derive(Debug, Clone)]
pub struct HuggingFaceSource {
    client: Arc<HttpClient>,
    api_url: String,
    default_category: String,
}

impl HuggingFaceSource {
    /// Create a new trending source with default settings
    pub fn new() -> Result<Self, FeedError> {
        Self::from_config(&Config::default())
    }

    /// Create a new trending source from configuration
    pub fn from_config(config: &Config) -> Result<Self, FeedError> {
        let client = Arc::new(HttpClient::from_config(&config.http)?);
        Ok(Self::with_client(client, &config.trending.api_url)
            .default_category(&config.trending.default_category))
    }

    /// Create with a custom HTTP client and endpoint (for testing)
    pub fn with_client(client: Arc<HttpClient>, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Set the category assigned to every trending paper
    pub fn default_category(mut self, category: &str) -> Self {
        self.default_category = category.to_string();
        self
    }

    /// The API endpoint requests go to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn fetch_trending(&self) -> Result<Vec<Paper>, FeedError> {
        tracing::debug!("Fetching trending papers: {}", self.api_url);

        let response = self.client.get(self.api_url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Upstream(status.as_u16()));
        }

        let body = response.text().await?;
        let items: Vec<DailyPaper> = serde_json::from_str(&body)?;

        let papers: Vec<Paper> = items
            .into_iter()
            .filter_map(|item| self.parse_item(item))
            .collect();

        tracing::info!("Fetched {} trending papers", papers.len());
        Ok(papers)
    }

    /// Map one daily papers item, skipping items without a paper id
    fn parse_item(&self, item: DailyPaper) -> Option<Paper> {
        let paper = item.paper?;
        let id = paper.id.as_deref().map(str::trim).unwrap_or_default();
        if id.is_empty() {
            tracing::debug!("Skipping trending item without a paper id");
            return None;
        }

        let published = paper.published_at.unwrap_or_default();
        let authors = paper
            .authors
            .into_iter()
            .filter_map(|a| a.name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let mut builder = PaperBuilder::new(id)
            .title(paper.title.as_deref().unwrap_or_default())
            .abstract_text(paper.summary.as_deref().unwrap_or_default())
            .authors(authors)
            .published_date(published.clone())
            .updated_date(published)
            .categories(vec![self.default_category.clone()])
            .primary_category(self.default_category.clone());
        if let Some(thumbnail) = item.thumbnail.filter(|t| !t.is_empty()) {
            builder = builder.thumbnail(thumbnail);
        }

        Some(builder.build())
    }
}

#[async_trait]
impl Source for HuggingFaceSource {
    fn id(&self) -> &str {
        "huggingface"
    }

    fn name(&self) -> &str {
        "HuggingFace Daily Papers"
    }

    async fn list_trending(&self) -> Vec<Paper> {
        match self.fetch_trending().await {
            Ok(papers) => papers,
            Err(e) => {
                tracing::warn!("Trending papers unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

// Daily papers API response structures

#[derive(Debug, Deserialize)]
struct DailyPaper {
    #[serde(default)]
    paper: Option<DailyPaperInfo>,
    #[serde(default)]
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyPaperInfo {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    authors: Vec<DailyPaperAuthor>,
    #[serde(rename = "publishedAt", default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyPaperAuthor {
    #[serde(default)]
    name: Option<String>,
}
