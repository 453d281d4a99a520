//! Text-to-speech synthesis and latest-clip retrieval.
//!
//! `synthesize` posts text to the server, which generates a speech clip and
//! stores it server-side. `fetch_latest` asks for the most recently generated
//! clip; the server answers with a JSON object carrying a `found` flag and,
//! when present, the clip URL.

use serde::Deserialize;
use std::path::PathBuf;

use super::{describe_request_error, ApiClient};

/// Response from `GET /latest_tts`.
///
/// `url` is relative to the server base URL. `audio_file` is the server-side
/// file name and is used for logging only.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestTts {
    pub found: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "audioFile", default)]
    pub audio_file: Option<String>,
}

impl LatestTts {
    /// Returns the clip URL if the server reported a generated clip.
    ///
    /// A `found` flag without a URL is treated as "nothing to play".
    pub fn clip_url(&self) -> Option<&str> {
        if self.found {
            self.url.as_deref()
        } else {
            None
        }
    }
}

/// Submits text for server-side speech synthesis.
///
/// Any 2xx status counts as success; the response body is ignored. The
/// caller is responsible for validating the text as non-empty before calling.
///
/// # Errors
/// - If the request cannot be sent (connection refused, timeout)
/// - If the server responds with a non-2xx status
pub async fn synthesize(client: &ApiClient, text: &str) -> anyhow::Result<()> {
    let form = reqwest::multipart::Form::new().text("text", text.to_string());

    let url = client.endpoint("/upload_text");
    tracing::debug!("Submitting {} characters for synthesis to {}", text.len(), url);

    let response = client
        .http()
        .post(&url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!(describe_request_error(&e)))?;

    let status = response.status();
    tracing::debug!("Synthesis response status: {}", status);

    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!("Synthesis rejected with status {}: {}", status, error_body);
        return Err(anyhow::anyhow!(
            "Server failed to generate speech (status {status})"
        ));
    }

    let _ = response.text().await;

    tracing::info!("Speech synthesis completed");
    Ok(())
}

/// Fetches metadata for the most recently generated speech clip.
///
/// # Errors
/// - If the request cannot be sent
/// - If the response is not valid JSON
pub async fn fetch_latest(client: &ApiClient) -> anyhow::Result<LatestTts> {
    let url = client.endpoint("/latest_tts");

    let response = client
        .http()
        .get(&url)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!(describe_request_error(&e)))?;

    let latest: LatestTts = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse latest_tts response: {e}"))?;

    if latest.found {
        tracing::debug!(
            "Latest generated clip: {}",
            latest.audio_file.as_deref().unwrap_or("<unnamed>")
        );
    } else {
        tracing::debug!("No generated clip available yet");
    }

    Ok(latest)
}

/// Downloads the given clip into the local data directory and returns its path.
///
/// # Errors
/// - If the download request fails or returns a non-2xx status
/// - If the file cannot be written
pub async fn download_clip(client: &ApiClient, latest: &LatestTts) -> anyhow::Result<PathBuf> {
    let url = latest
        .clip_url()
        .ok_or_else(|| anyhow::anyhow!("No clip available to download"))?;
    let full_url = client.resolve_url(url);

    let response = client
        .http()
        .get(&full_url)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!(describe_request_error(&e)))?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Failed to download clip (status {})",
            response.status()
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read clip body: {e}"))?;

    let file_name = clip_file_name(latest.audio_file.as_deref());
    let path = crate::config::data_dir()?.join(file_name);

    std::fs::write(&path, &bytes)?;
    tracing::info!("Downloaded clip to {} ({} bytes)", path.display(), bytes.len());

    Ok(path)
}

/// Reduces the server-supplied file name to a bare file name for local storage.
///
/// The name comes from an untrusted response; any directory components are
/// stripped so the download can never land outside the data directory.
fn clip_file_name(audio_file: Option<&str>) -> String {
    audio_file
        .and_then(|name| std::path::Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "latest_tts.wav".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_found_parses() {
        let latest: LatestTts = serde_json::from_str(
            r#"{"found": true, "url": "/tts/tts-20250101-120000.wav", "audioFile": "tts-20250101-120000.wav"}"#,
        )
        .unwrap();

        assert!(latest.found);
        assert_eq!(latest.clip_url(), Some("/tts/tts-20250101-120000.wav"));
        assert_eq!(
            latest.audio_file.as_deref(),
            Some("tts-20250101-120000.wav")
        );
    }

    #[test]
    fn test_latest_not_found_leaves_playback_unset() {
        let latest: LatestTts = serde_json::from_str(r#"{"found": false}"#).unwrap();

        assert!(!latest.found);
        assert_eq!(latest.clip_url(), None);
    }

    #[test]
    fn test_found_without_url_yields_nothing() {
        let latest: LatestTts = serde_json::from_str(r#"{"found": true}"#).unwrap();

        assert_eq!(latest.clip_url(), None);
    }

    #[test]
    fn test_clip_file_name_keeps_plain_names() {
        assert_eq!(
            clip_file_name(Some("tts-20250101-120000.wav")),
            "tts-20250101-120000.wav"
        );
    }

    #[test]
    fn test_clip_file_name_strips_directory_traversal() {
        assert_eq!(clip_file_name(Some("../../.bashrc")), ".bashrc");
        assert_eq!(clip_file_name(Some("/etc/passwd")), "passwd");
        assert_eq!(clip_file_name(Some("tts/nested/clip.wav")), "clip.wav");
    }

    #[test]
    fn test_clip_file_name_falls_back_when_unusable() {
        assert_eq!(clip_file_name(None), "latest_tts.wav");
        assert_eq!(clip_file_name(Some("..")), "latest_tts.wav");
        assert_eq!(clip_file_name(Some("")), "latest_tts.wav");
    }
}
