//! Fetch and play the most recently generated speech clip.
//!
//! This path is best-effort: a missing clip is reported calmly and network
//! failures are logged without surfacing an error to the user.

use crate::api::{self, ApiClient};
use crate::config::VnoteConfig;
use crate::playback;
use std::path::PathBuf;

/// Handles the latest command.
///
/// Asks the server for the newest synthesized clip, downloads it, and hands
/// it to the system audio player. Never fails hard on fetch errors.
pub async fn handle_latest() -> Result<(), anyhow::Error> {
    tracing::info!("=== vnote Latest ===");

    let config_data = VnoteConfig::load_or_init()?;
    let client = ApiClient::new(
        &config_data.server.base_url,
        config_data.server.request_timeout_secs,
    )?;

    let Some(path) = load_recent_clip(&client).await else {
        println!("No generated speech clip available yet.");
        return Ok(());
    };

    println!("Playing {}", path.display());
    if let Err(e) = playback::play_file(&path) {
        tracing::error!("Playback failed: {e:#}");
        eprintln!("Could not play the clip; file saved at {}", path.display());
    }

    Ok(())
}

/// Fetches and downloads the most recent generated clip, if one exists.
///
/// Returns `None` both when the server reports no clip and when the request
/// fails; failures are logged, never surfaced.
pub async fn load_recent_clip(client: &ApiClient) -> Option<PathBuf> {
    let latest = match api::fetch_latest(client).await {
        Ok(latest) => latest,
        Err(e) => {
            tracing::error!("Failed to load most recent clip: {e:#}");
            return None;
        }
    };

    if latest.clip_url().is_none() {
        tracing::debug!("No recent clip found, leaving playback unset");
        return None;
    }

    match api::download_clip(client, &latest).await {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::error!("Failed to download most recent clip: {e:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serves a single canned HTTP response and returns the base URL.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_no_clip_available_yields_none() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 15\r\nConnection: close\r\n\r\n{\"found\":false}",
        );
        let client = ApiClient::new(&base, 5).unwrap();

        assert_eq!(load_recent_clip(&client).await, None);
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_none() {
        // Port 9 (discard) is never bound in the test environment
        let client = ApiClient::new("http://127.0.0.1:9", 1).unwrap();

        assert_eq!(load_recent_clip(&client).await, None);
    }
}
