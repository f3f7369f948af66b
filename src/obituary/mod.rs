//! Obituary page fetching and content extraction
//!
//! Turns an obituary page URL into the markup fragment stored in the feed.
//!
//! ## Architecture
//!
//! ```text
//! Item link → PageFetcher → HTML → ContentExtractor → ExtractionOutcome
//!                                        ↓
//!                        Blocked | Content(fragment) | FetchFailed
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let fetcher = HttpPageFetcher::new(config.request_timeout())?;
//! let extractor = ContentExtractor::new(config.challenge_scan_window);
//!
//! let fetched = fetcher.fetch(url, &config.user_agent).await;
//! let outcome = extractor.process(&fetched);
//! ```

pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod types;

pub use config::{ConfigError, ScrapeConfig, DEFAULT_CHALLENGE_SCAN_WINDOW, DEFAULT_USER_AGENT};
pub use extractor::{ContentExtractor, CHALLENGE_PHRASE};
pub use fetcher::{HttpPageFetcher, PageFetcher};
pub use types::{ContentBlock, ContentFragment, ExtractionOutcome, FetchError, IMAGE_ALT_TEXT};
