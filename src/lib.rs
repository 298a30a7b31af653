//! # Paper Feed
//!
//! Fetches and caches research paper metadata from the arXiv Atom API, with
//! trending papers from the HuggingFace daily papers API.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Paper, listing envelope, categories)
//! - [`sources`]: Upstream sources behind a common trait, the Atom parser and
//!   the arXiv query builder
//! - [`feed`]: The [`PaperFeed`] facade used by applications
//! - [`utils`]: TTL cache, HTTP client and display helpers
//! - [`config`]: Configuration management

pub mod config;
pub mod feed;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use feed::PaperFeed;
pub use models::{Paper, PapersResponse};
pub use sources::{FeedError, Source};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
