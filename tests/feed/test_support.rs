// Shared fixtures for feed rewriting tests

use async_trait::async_trait;
use obit_feed_scraper::{FetchError, PageFetcher, ScrapeConfig};
use std::collections::HashMap;
use std::sync::Mutex;

/// Fetcher that serves canned pages and records every request
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`; any other URL fails with HTTP 404
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// `(url, user_agent)` pairs in request order
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|(url, _)| url).collect()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), user_agent.to_string()));
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

pub fn test_config() -> ScrapeConfig {
    ScrapeConfig {
        delay_secs: 0.0,
        user_agent: "obit-test/1.0".to_string(),
        ..Default::default()
    }
}

pub fn obituary_page(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{name} Obituary</title></head>
<body>
  <div data-blog-component="subtitle"><h3>{name}</h3></div>
  <div data-blog-component="image"><img src="https://cdn.example.com/{name}.jpg"></div>
  <div data-blog-component="text"><div data-blog-inner="text"><p>Remembering {name}.</p></div></div>
</body>
</html>"#
    )
}

pub fn expected_description(name: &str) -> String {
    format!(
        "<h3>{name}</h3>\n<img src=\"https://cdn.example.com/{name}.jpg\" alt=\"obit image\" />\n<div data-blog-inner=\"text\"><p>Remembering {name}.</p></div>"
    )
}

pub const CHALLENGE_PAGE: &str =
    "<html><head><title>Are You Human?</title></head><body>Please verify</body></html>";
