//! Paper model representing a research paper from arXiv or the trending feed.

use serde::{Deserialize, Serialize};

/// Base URL for arXiv abstract pages
pub const ARXIV_ABS_URL: &str = "https://arxiv.org/abs";
/// Base URL for arXiv PDFs
pub const ARXIV_PDF_URL: &str = "https://arxiv.org/pdf";

/// A research paper, normalized from either upstream source
///
/// `pdf_url` and `arxiv_url` are always derived from `id`; they are never
/// taken from upstream content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// Bare arXiv identifier (no URL prefix, no version suffix)
    pub id: String,

    /// Paper title, whitespace-collapsed
    pub title: String,

    /// Abstract text, whitespace-collapsed
    #[serde(rename = "abstract")]
    pub r#abstract: String,

    /// Author names in feed order
    pub authors: Vec<String>,

    /// Publication timestamp (ISO-8601, verbatim from upstream)
    pub published_date: String,

    /// Last updated timestamp (ISO-8601, verbatim from upstream)
    pub updated_date: String,

    /// Taxonomy codes in feed order
    pub categories: Vec<String>,

    /// Primary taxonomy code, empty when unknown
    pub primary_category: String,

    /// Direct PDF URL
    pub pdf_url: String,

    /// Abstract page URL
    pub arxiv_url: String,

    /// Preview image (trending papers only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Paper {
    /// Returns the first author, used as the lead name in listings
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// Returns a short author line: the first author, plus "et al." when
    /// there are more
    pub fn author_line(&self) -> String {
        match self.authors.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [first, ..] => format!("{} et al.", first),
        }
    }

    /// Whether the paper carries the given taxonomy code
    pub fn has_category(&self, code: &str) -> bool {
        self.categories.iter().any(|c| c == code)
    }
}

/// Collapse every whitespace run (including newlines) to a single space and
/// trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip an arXiv id down to its bare form.
///
/// Handles formats like:
/// - "2301.12345"
/// - "2301.12345v2" (version is stripped)
/// - "http://arxiv.org/abs/2301.12345v2"
/// - "http://arxiv.org/abs/hep-th/9901001v1"
pub fn strip_arxiv_id(raw: &str) -> String {
    let raw = raw.trim();
    let id = match raw.rfind("/abs/") {
        Some(pos) => &raw[pos + 5..],
        None => raw,
    };

    strip_version(id).to_string()
}

/// Remove a trailing `v<digits>` suffix, if any
fn strip_version(id: &str) -> &str {
    if let Some(pos) = id.rfind('v') {
        let digits = &id[pos + 1..];
        if pos > 0 && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return &id[..pos];
        }
    }
    id
}

/// Builder for constructing Paper objects
///
/// All ingestion goes through here so the model invariants hold: URLs are
/// derived from the id, and title/abstract are whitespace-normalized.
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    /// Create a new builder for the given bare arXiv id
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            paper: Paper {
                pdf_url: format!("{}/{}.pdf", ARXIV_PDF_URL, id),
                arxiv_url: format!("{}/{}", ARXIV_ABS_URL, id),
                id,
                title: String::new(),
                r#abstract: String::new(),
                authors: Vec::new(),
                published_date: String::new(),
                updated_date: String::new(),
                categories: Vec::new(),
                primary_category: String::new(),
                thumbnail: None,
            },
        }
    }

    /// Set title
    pub fn title(mut self, title: &str) -> Self {
        self.paper.title = normalize_whitespace(title);
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: &str) -> Self {
        self.paper.r#abstract = normalize_whitespace(abstract_text);
        self
    }

    /// Set authors
    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.paper.authors = authors;
        self
    }

    /// Set publication date
    pub fn published_date(mut self, date: impl Into<String>) -> Self {
        self.paper.published_date = date.into();
        self
    }

    /// Set updated date
    pub fn updated_date(mut self, date: impl Into<String>) -> Self {
        self.paper.updated_date = date.into();
        self
    }

    /// Set categories
    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.paper.categories = categories;
        self
    }

    /// Set the primary category explicitly
    pub fn primary_category(mut self, category: impl Into<String>) -> Self {
        self.paper.primary_category = category.into();
        self
    }

    /// Set thumbnail
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.paper.thumbnail = Some(url.into());
        self
    }

    /// Build the Paper
    ///
    /// An unset primary category falls back to the first category.
    pub fn build(mut self) -> Paper {
        if self.paper.primary_category.is_empty() {
            if let Some(first) = self.paper.categories.first() {
                self.paper.primary_category = first.clone();
            }
        }
        self.paper
    }
}
