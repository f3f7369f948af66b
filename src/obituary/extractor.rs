// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Obituary content extraction
//!
//! Detects anti-bot challenge pages and pulls the subtitle, image and text
//! blocks out of pages annotated with `data-blog-component` markers.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::types::{ContentBlock, ContentFragment, ExtractionOutcome, FetchError};

/// Phrase shown on challenge pages, matched case-insensitively
pub const CHALLENGE_PHRASE: &str = "are you human";

const COMPONENT_ATTR: &str = "data-blog-component";

/// Compiled selectors used during extraction
struct Selectors {
    component: Selector,
    heading: Selector,
    image: Selector,
    text_inner: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            component: parse_selector("[data-blog-component]"),
            heading: parse_selector("h1, h2, h3, h4, h5, h6"),
            image: parse_selector("img[src]"),
            text_inner: parse_selector("[data-blog-inner=\"text\"]"),
        }
    }
}

fn parse_selector(css: &str) -> Selector {
    Selector::parse(css).expect("Failed to parse built-in selector")
}

/// Turns fetched obituary pages into extraction outcomes
///
/// Stateless apart from its configuration, so the same markup always yields
/// the same outcome.
pub struct ContentExtractor {
    scan_window: Option<usize>,
    selectors: Selectors,
}

impl ContentExtractor {
    /// Create an extractor
    ///
    /// # Arguments
    /// * `scan_window` - Leading characters checked for the challenge phrase,
    ///   or `None` to check the whole page
    pub fn new(scan_window: Option<usize>) -> Self {
        Self {
            scan_window,
            selectors: Selectors::new(),
        }
    }

    /// Classify the result of a page fetch
    pub fn process(&self, fetched: &Result<String, FetchError>) -> ExtractionOutcome {
        match fetched {
            Ok(html) => self.extract(html),
            Err(e) => {
                debug!("No markup to extract: {}", e);
                ExtractionOutcome::FetchFailed
            }
        }
    }

    /// Extract content from raw page markup
    ///
    /// Challenge detection runs before any parsing.
    pub fn extract(&self, html: &str) -> ExtractionOutcome {
        if self.is_challenge_page(html) {
            warn!("'Are you human?' challenge detected");
            return ExtractionOutcome::Blocked;
        }
        ExtractionOutcome::Content(self.extract_fragment(html))
    }

    /// Check the scanned prefix of the markup for the challenge phrase
    pub fn is_challenge_page(&self, html: &str) -> bool {
        let scanned = match self.scan_window {
            Some(window) => char_prefix(html, window),
            None => html,
        };
        debug!(chars = scanned.chars().count(), "Scanning markup prefix:\n{}", scanned);
        scanned.to_lowercase().contains(CHALLENGE_PHRASE)
    }

    /// Collect every recognized blog component block, in document order
    pub fn extract_fragment(&self, html: &str) -> ContentFragment {
        let document = Html::parse_document(html);
        let components: Vec<ElementRef> = document.select(&self.selectors.component).collect();
        debug!("Found {} '{}' blocks", components.len(), COMPONENT_ATTR);

        components
            .into_iter()
            .filter_map(|element| self.extract_block(element))
            .collect::<Vec<_>>()
            .into()
    }

    fn extract_block(&self, element: ElementRef) -> Option<ContentBlock> {
        let kind = element.value().attr(COMPONENT_ATTR).unwrap_or_default();
        debug!("Handling {}={}", COMPONENT_ATTR, kind);

        match kind {
            "subtitle" => element.select(&self.selectors.heading).next().map(|heading| {
                ContentBlock::Subtitle {
                    tag: heading.value().name().to_string(),
                    text: heading.text().collect::<String>().trim().to_string(),
                }
            }),
            "image" => element
                .select(&self.selectors.image)
                .filter_map(|img| img.value().attr("src"))
                .find(|src| !src.is_empty())
                .map(|src| ContentBlock::Image {
                    src: src.to_string(),
                }),
            "text" => element
                .select(&self.selectors.text_inner)
                .next()
                .map(|inner| ContentBlock::Text { html: inner.html() }),
            _ => None,
        }
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(Some(super::config::DEFAULT_CHALLENGE_SCAN_WINDOW))
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary
fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
