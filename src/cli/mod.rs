// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::feed::{FeedRewriter, RunSummary};
use crate::obituary::{
    HttpPageFetcher, ScrapeConfig, DEFAULT_CHALLENGE_SCAN_WINDOW, DEFAULT_USER_AGENT,
};

/// Obituary feed scraper
#[derive(Parser, Debug)]
#[command(name = "obit-scraper")]
#[command(version)]
#[command(
    about = "Fill RSS item descriptions with content scraped from each obituary page",
    long_about = None
)]
pub struct Cli {
    /// Input RSS file
    #[arg(long, default_value = "original_feed.xml")]
    pub input: PathBuf,

    /// Output RSS file
    #[arg(long, default_value = "updated_feed.xml")]
    pub output: PathBuf,

    /// Seconds to wait between page requests
    #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
    pub delay: f64,

    /// User-Agent header sent with each request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Characters of each page checked for the "are you human" challenge (0 = whole page)
    #[arg(long, default_value_t = DEFAULT_CHALLENGE_SCAN_WINDOW)]
    pub scan_window: usize,
}

impl Cli {
    /// Build and validate the run configuration
    pub fn scrape_config(&self) -> Result<ScrapeConfig> {
        let config = ScrapeConfig {
            delay_secs: self.delay,
            user_agent: self.user_agent.trim().to_string(),
            request_timeout_secs: self.timeout,
            challenge_scan_window: (self.scan_window > 0).then_some(self.scan_window),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Run one scrape over the input feed
pub async fn execute(cli: Cli) -> Result<RunSummary> {
    let config = cli.scrape_config()?;
    let fetcher = HttpPageFetcher::new(config.request_timeout())
        .context("Failed to create page fetcher")?;
    let rewriter = FeedRewriter::new(fetcher, config);

    let summary = rewriter
        .run(&cli.input, &cli.output)
        .await
        .with_context(|| format!("Scraping '{}' failed", cli.input.display()))?;

    println!(
        "\n✅ Scraping completed. Updated feed saved to: {}",
        cli.output.display()
    );
    println!(
        "   {} items: {} updated, {} without link, {} failed to fetch",
        summary.total, summary.updated, summary.skipped, summary.failed
    );
    if let Some(index) = summary.halted_at {
        println!(
            "⚠️  Stopped at item {} after an 'Are you human?' challenge; {} items left unprocessed",
            index,
            summary.unvisited()
        );
    }

    Ok(summary)
}
