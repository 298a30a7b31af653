//! Core data models for papers, listing envelopes and categories.

mod category;
mod feed;
mod paper;

pub use category::{
    find_category, is_supported_category, ArxivCategory, ARXIV_CATEGORIES, DEFAULT_CATEGORY,
};
pub use feed::{
    clamp_page_size, start_index, PapersResponse, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE,
};
pub use paper::{normalize_whitespace, strip_arxiv_id, Paper, PaperBuilder};
