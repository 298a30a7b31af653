//! Utility modules supporting the feed.
//!
//! - [`TtlCache`]: in-memory result cache with time-based expiry
//! - [`Clock`], [`SystemClock`], [`ManualClock`]: time sources for the cache
//! - [`HttpClient`]: shared HTTP client carrying the feed's user agent
//! - [`truncate_with_ellipsis`], [`format_date`]: terminal display helpers
//!
//! # Caching
//!
//! ```rust
//! use paper_feed::utils::{ManualClock, TtlCache};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = Arc::new(ManualClock::new());
//! let cache = TtlCache::with_clock(Duration::from_secs(300), clock.clone());
//!
//! cache.put("category:cs.AI:0:10", 42);
//! assert_eq!(cache.get("category:cs.AI:0:10"), Some(42));
//!
//! clock.advance(Duration::from_secs(300));
//! assert_eq!(cache.get("category:cs.AI:0:10"), None);
//! ```

mod cache;
mod display;
mod http;

pub use cache::{CacheResult, Clock, ManualClock, SystemClock, TtlCache};
pub use display::{format_date, terminal_width, truncate_with_ellipsis, DEFAULT_WIDTH};
pub use http::HttpClient;
