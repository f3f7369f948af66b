// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Feed rewriting pipeline
//!
//! Walks the feed's items in order, fetches each obituary page, and stores the
//! extracted content in the item's description. A challenge page stops the
//! walk; whatever was processed before it is still written out.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::document::{FeedDocument, FeedError};
use crate::obituary::{ContentExtractor, ExtractionOutcome, PageFetcher, ScrapeConfig};

/// Fatal errors for a rewrite run
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Input feed does not exist
    #[error("The file '{}' does not exist", .0.display())]
    InputMissing(PathBuf),

    /// Input feed exists but could not be read
    #[error("Failed to read '{}': {source}", .path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input is not a usable feed, or the result could not be serialized
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Output feed could not be written
    #[error("Failed to write '{}': {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Counters for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items in the feed
    pub total: usize,
    /// Items whose description was rewritten
    pub updated: usize,
    /// Items without a link
    pub skipped: usize,
    /// Items whose page could not be fetched
    pub failed: usize,
    /// 1-based index of the item that hit a challenge page, if any
    pub halted_at: Option<usize>,
}

impl RunSummary {
    pub fn halted(&self) -> bool {
        self.halted_at.is_some()
    }

    /// Items never visited because the run halted
    pub fn unvisited(&self) -> usize {
        self.halted_at
            .map(|index| self.total - index)
            .unwrap_or_default()
    }
}

/// Rewrites feed item descriptions with extracted obituary content
///
/// Items are processed strictly one after another, pausing for the configured
/// delay between fetches.
pub struct FeedRewriter<F: PageFetcher> {
    fetcher: F,
    extractor: ContentExtractor,
    config: ScrapeConfig,
}

impl<F: PageFetcher> FeedRewriter<F> {
    pub fn new(fetcher: F, config: ScrapeConfig) -> Self {
        let extractor = ContentExtractor::new(config.challenge_scan_window);
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Load `input`, rewrite its items, and save the result to `output`
    ///
    /// The output is written even when the run halts on a challenge page.
    /// Nothing is written if the input is missing or not a usable feed.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<RunSummary, RewriteError> {
        info!("Parsing RSS feed: {}", input.display());
        let mut document = load_document(input)?;

        let summary = self.rewrite(&mut document).await;

        save_document(&document, output)?;
        info!(
            total = summary.total,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            halted = summary.halted(),
            "Done! Updated RSS feed saved to '{}'",
            output.display()
        );
        Ok(summary)
    }

    /// Process every item of an already-loaded document in place
    pub async fn rewrite(&self, document: &mut FeedDocument) -> RunSummary {
        let total = document.item_count();
        let mut summary = RunSummary {
            total,
            ..Default::default()
        };
        info!("Found {} <item> entries", total);

        if !self.config.has_user_agent() {
            warn!("User-Agent is empty. You might get blocked by the website.");
        }

        let delay = self.config.delay();
        let mut fetched_any = false;

        for idx in 0..total {
            let index = idx + 1;
            let Some(item) = document.item(idx) else {
                continue;
            };
            let Some(url) = item.link.as_deref() else {
                warn!(index, total, "Item {}/{} has no <link>, skipping...", index, total);
                summary.skipped += 1;
                continue;
            };
            let title = item.display_title();

            if fetched_any && !delay.is_zero() {
                info!("Waiting {:?} before next item...", delay);
                tokio::time::sleep(delay).await;
            }
            fetched_any = true;

            info!(index, total, "Processing item {}/{} - {} | {}", index, total, title, url);
            let fetched = self.fetcher.fetch(url, &self.config.user_agent).await;
            if let Err(e) = &fetched {
                warn!(url, "Fetching {} failed: {}", url, e);
            }

            let outcome = self.extractor.process(&fetched);
            debug!(index, status = outcome.status(), "Item processed");

            match outcome {
                ExtractionOutcome::Blocked => {
                    info!(
                        index,
                        "'Are you human?' triggered on item {} with title '{}'. Stopping.",
                        index,
                        title
                    );
                    summary.halted_at = Some(index);
                    break;
                }
                ExtractionOutcome::Content(fragment) => {
                    document.set_description(idx, &fragment.to_markup());
                    summary.updated += 1;
                }
                ExtractionOutcome::FetchFailed => {
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

/// Read and parse the input feed
pub fn load_document(path: &Path) -> Result<FeedDocument, RewriteError> {
    if !path.exists() {
        return Err(RewriteError::InputMissing(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| RewriteError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FeedDocument::parse_bytes(&bytes)?)
}

/// Serialize the feed and write it to `path`
pub fn save_document(document: &FeedDocument, path: &Path) -> Result<(), RewriteError> {
    let xml = document.to_xml()?;
    fs::write(path, xml).map_err(|source| RewriteError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
