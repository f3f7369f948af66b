// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! RSS feed rewriting
//!
//! ```text
//! input.xml → FeedDocument → FeedRewriter ──item link──→ PageFetcher
//!                                 ↑                          ↓
//!                        set_description ← ContentExtractor ←┘
//!                                 ↓
//!                            output.xml
//! ```

pub mod document;
pub mod rewriter;

pub use document::{FeedDocument, FeedError, FeedItem, UNTITLED_ITEM};
pub use rewriter::{load_document, save_document, FeedRewriter, RewriteError, RunSummary};
