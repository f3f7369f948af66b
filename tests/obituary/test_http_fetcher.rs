// HttpPageFetcher against a throwaway local HTTP server

use obit_feed_scraper::{FetchError, HttpPageFetcher, PageFetcher};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one canned response and hand back the raw request
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/obituaries/jane-doe", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "{status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).to_string()
    });

    (url, handle)
}

#[tokio::test]
async fn test_fetch_sends_user_agent_and_returns_body() {
    let (url, server) = serve_once("HTTP/1.1 200 OK", "<h3>Jane Doe</h3>").await;
    let fetcher = HttpPageFetcher::new(Duration::from_secs(5)).unwrap();

    let body = fetcher.fetch(&url, "ObitBot/2.0").await.unwrap();
    assert_eq!(body, "<h3>Jane Doe</h3>");

    let request = server.await.unwrap().to_lowercase();
    assert!(request.starts_with("get /obituaries/jane-doe "));
    assert!(request.contains("user-agent: obitbot/2.0"));
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let (url, server) = serve_once("HTTP/1.1 503 Service Unavailable", "down").await;
    let fetcher = HttpPageFetcher::new(Duration::from_secs(5)).unwrap();

    let result = fetcher.fetch(&url, "ObitBot/2.0").await;
    assert!(matches!(result, Err(FetchError::HttpStatus { status: 503, .. })));
    server.await.unwrap();
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    // Bind then drop to get a port nobody is listening on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpPageFetcher::new(Duration::from_secs(5)).unwrap();
    let result = fetcher.fetch(&format!("http://{addr}/"), "ObitBot/2.0").await;
    assert!(matches!(result, Err(FetchError::Http(_))));
}

#[tokio::test]
async fn test_fetch_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/slow", listener.local_addr().unwrap());
    let _server = tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let fetcher = HttpPageFetcher::new(Duration::from_millis(200)).unwrap();
    let result = fetcher.fetch(&url, "ObitBot/2.0").await;
    assert!(matches!(result, Err(FetchError::Timeout(_))));
}
