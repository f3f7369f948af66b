// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for obituary content extraction

use std::fmt;
use thiserror::Error;

/// Alt text attached to every extracted obituary image
pub const IMAGE_ALT_TEXT: &str = "obit image";

/// One recognized block of obituary content, ready to embed in a feed description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Heading text, stored with the heading tag it was found in (e.g. `h3`)
    Subtitle { tag: String, text: String },
    /// Image source URL, exactly as it appeared on the page
    Image { src: String },
    /// Verbatim markup of the text-inner element, tags included
    Text { html: String },
}

impl ContentBlock {
    /// Render the block as an embeddable markup string
    pub fn to_markup(&self) -> String {
        match self {
            Self::Subtitle { tag, text } => {
                format!("<{tag}>{}</{tag}>", quick_xml::escape::partial_escape(text))
            }
            Self::Image { src } => format!(
                "<img src=\"{}\" alt=\"{}\" />",
                quick_xml::escape::escape(src),
                IMAGE_ALT_TEXT
            ),
            Self::Text { html } => html.clone(),
        }
    }
}

impl fmt::Display for ContentBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

/// Ordered blocks extracted from one obituary page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFragment {
    blocks: Vec<ContentBlock>,
}

impl ContentFragment {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Markup of each block, in document order
    pub fn block_markup(&self) -> Vec<String> {
        self.blocks.iter().map(ContentBlock::to_markup).collect()
    }

    /// The description payload: every block's markup joined with newlines
    pub fn to_markup(&self) -> String {
        self.block_markup().join("\n")
    }
}

impl From<Vec<ContentBlock>> for ContentFragment {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        Self::new(blocks)
    }
}

/// Result of running one fetched page through the extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Anti-bot challenge page; the run must stop
    Blocked,
    /// Extracted content, possibly empty
    Content(ContentFragment),
    /// The page could not be fetched
    FetchFailed,
}

impl ExtractionOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Short label used in per-item log lines
    pub fn status(&self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::Content(fragment) if fragment.is_empty() => "empty",
            Self::Content(_) => "updated",
            Self::FetchFailed => "fetch-failed",
        }
    }
}

/// Page fetch error types
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed or is not http(s)
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request timed out
    #[error("Timeout fetching: {0}")]
    Timeout(String),

    /// Connection or protocol failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status code
    #[error("HTTP {status} for: {url}")]
    HttpStatus { status: u16, url: String },

    /// Response body could not be read as text
    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}
