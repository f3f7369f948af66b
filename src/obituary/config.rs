//! Configuration for a scrape run
//!
//! Defines pacing, fetch and challenge-detection settings.

use std::time::Duration;
use thiserror::Error;

/// Browser User-Agent presented when none is given
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Characters of page markup scanned for the challenge phrase by default
pub const DEFAULT_CHALLENGE_SCAN_WINDOW: usize = 500;

/// Invalid configuration values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("delay must be a non-negative number of seconds, got {0}")]
    InvalidDelay(f64),

    #[error("request timeout must be at least 1 second")]
    ZeroTimeout,
}

/// Configuration for a scrape run
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Seconds to wait between two fetched items (default: 3)
    pub delay_secs: f64,
    /// User-Agent header sent with every page request
    pub user_agent: String,
    /// Timeout per page fetch in seconds (default: 10)
    pub request_timeout_secs: u64,
    /// Leading characters scanned for the challenge phrase; `None` scans everything
    pub challenge_scan_window: Option<usize>,
}

impl ScrapeConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delay_secs.is_finite() || self.delay_secs < 0.0 {
            return Err(ConfigError::InvalidDelay(self.delay_secs));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Pause between items
    ///
    /// Only meaningful after `validate()` has succeeded.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::ZERO)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// An empty User-Agent is allowed but tends to get the scraper blocked
    pub fn has_user_agent(&self) -> bool {
        !self.user_agent.trim().is_empty()
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            delay_secs: 3.0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 10,
            challenge_scan_window: Some(DEFAULT_CHALLENGE_SCAN_WINDOW),
        }
    }
}
