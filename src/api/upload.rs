//! Recording upload to the vnote server.
//!
//! Sends the assembled WAV buffer as multipart form data. The server stores
//! the file and transcribes it; the response body is not inspected beyond
//! the status check.

use super::{describe_request_error, ApiClient};

/// Multipart field name the server expects for the audio file.
const AUDIO_FIELD: &str = "audio_data";

/// File name the server expects for uploaded recordings.
const AUDIO_FILE_NAME: &str = "recorded_audio.wav";

/// Uploads a recorded WAV buffer to the server.
///
/// Any 2xx status counts as success. The response body is drained but ignored.
///
/// # Errors
/// - If the request cannot be sent (connection refused, timeout)
/// - If the server responds with a non-2xx status
pub async fn upload_recording(client: &ApiClient, wav_bytes: Vec<u8>) -> anyhow::Result<()> {
    let byte_count = wav_bytes.len();

    let file_part = reqwest::multipart::Part::bytes(wav_bytes)
        .file_name(AUDIO_FILE_NAME)
        .mime_str("audio/wav")
        .map_err(|e| anyhow::anyhow!("Failed to create file part for upload: {e}"))?;

    let form = reqwest::multipart::Form::new().part(AUDIO_FIELD, file_part);

    let url = client.endpoint("/upload");
    tracing::debug!("Uploading recording: {} bytes to {}", byte_count, url);

    let response = client
        .http()
        .post(&url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!(describe_request_error(&e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!("Upload rejected with status {}: {}", status, error_body);
        return Err(anyhow::anyhow!("Server rejected the upload (status {status})"));
    }

    // Body content is irrelevant; drain it so the connection can be reused.
    let _ = response.text().await;

    tracing::info!("Recording uploaded successfully ({} bytes)", byte_count);
    Ok(())
}
