// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod feed;
pub mod obituary;

// Re-export main types
pub use feed::{FeedDocument, FeedError, FeedItem, FeedRewriter, RewriteError, RunSummary};
pub use obituary::{
    ContentBlock, ContentExtractor, ContentFragment, ExtractionOutcome, FetchError,
    HttpPageFetcher, PageFetcher, ScrapeConfig,
};
