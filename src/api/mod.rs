//! HTTP client for the vnote server.
//!
//! The server exposes three endpoints: `POST /upload` for recorded audio,
//! `POST /upload_text` for text-to-speech synthesis, and `GET /latest_tts`
//! for the most recently generated clip. Any 2xx response counts as success;
//! response bodies are ignored except for `/latest_tts`, whose JSON payload
//! is consumed.

pub mod tts;
pub mod upload;

pub use tts::{download_clip, fetch_latest, synthesize, LatestTts};
pub use upload::upload_recording;

use std::time::Duration;

/// Client for a single vnote server, holding the resolved base URL and a
/// reusable HTTP connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the given base URL with the given request timeout.
    ///
    /// Trailing slashes on the base URL are stripped so endpoint paths can be
    /// joined uniformly.
    ///
    /// # Errors
    /// - If the underlying HTTP client cannot be constructed
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Returns the full URL for an endpoint path such as "/upload".
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolves a URL returned by the server against the base URL.
    ///
    /// The server hands out relative paths like "/tts/tts-20250101-120000.wav";
    /// absolute URLs are passed through unchanged.
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    /// Returns the underlying reqwest client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Translates a reqwest transport error into a human-readable message.
///
/// Distinguishes connection failures from timeouts so the user knows whether
/// the server is unreachable or just slow.
pub(crate) fn describe_request_error(e: &reqwest::Error) -> String {
    if e.is_connect() {
        "Could not connect to the vnote server. Is it running?".to_string()
    } else if e.is_timeout() {
        "Request to the vnote server timed out. The server is not responding.".to_string()
    } else {
        format!("Network error: {e}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let client = ApiClient::new("http://localhost:5000/", 30).unwrap();
        assert_eq!(client.endpoint("/upload"), "http://localhost:5000/upload");
        assert_eq!(
            client.endpoint("/latest_tts"),
            "http://localhost:5000/latest_tts"
        );
    }

    #[test]
    fn test_resolve_url_relative() {
        let client = ApiClient::new("http://localhost:5000", 30).unwrap();
        assert_eq!(
            client.resolve_url("/tts/tts-20250101-120000.wav"),
            "http://localhost:5000/tts/tts-20250101-120000.wav"
        );
        assert_eq!(
            client.resolve_url("tts/clip.wav"),
            "http://localhost:5000/tts/clip.wav"
        );
    }

    #[test]
    fn test_resolve_url_absolute_passthrough() {
        let client = ApiClient::new("http://localhost:5000", 30).unwrap();
        assert_eq!(
            client.resolve_url("https://cdn.example.com/clip.wav"),
            "https://cdn.example.com/clip.wav"
        );
    }
}
