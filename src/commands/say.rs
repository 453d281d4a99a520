//! Submit text for server-side text-to-speech synthesis.
//!
//! Validates the text as non-empty after trimming, shows a busy indicator
//! while the request is outstanding, and restores the prompt on both success
//! and failure. After a successful synthesis the most recent generated clip
//! is reloaded from the server so the user sees the new state.

use crate::api::{self, ApiClient};
use crate::commands::{latest, REFRESH_DELAY};
use crate::config::VnoteConfig;
use cliclack::{intro, note, outro, outro_cancel, spinner};
use console::style;

/// Handles the say command.
///
/// The flow is strictly sequential: the busy indicator covers the whole
/// request, so a second submission cannot be issued from the same invocation.
pub async fn handle_say(text: Option<String>) -> Result<(), anyhow::Error> {
    tracing::info!("=== vnote Say ===");

    let config_data = VnoteConfig::load_or_init()?;
    let client = ApiClient::new(
        &config_data.server.base_url,
        config_data.server.request_timeout_secs,
    )?;

    if let Err(e) = ctrlc::set_handler(move || {}) {
        tracing::warn!("Failed to set Ctrl-C handler: {e}");
    }

    intro(style(" say ").on_white().black())?;

    let raw_text: String = match text {
        Some(t) => t,
        None => cliclack::input("Text to convert to speech")
            .interact()
            .map_err(|e| anyhow::anyhow!("Input cancelled: {e}"))?,
    };

    let Some(trimmed) = validate_text(&raw_text) else {
        tracing::warn!("Empty text submitted, no request sent");
        outro_cancel("Please enter some text to convert to speech")?;
        return Err(anyhow::anyhow!("No text entered"));
    };

    tracing::debug!("Submitting text for synthesis ({} characters)", trimmed.len());

    let progress = spinner();
    progress.start("Processing...");

    let result = api::synthesize(&client, &trimmed).await;

    // The prompt is restored on both paths before anything else happens
    match result {
        Ok(()) => {
            progress.stop("Speech generated");

            tokio::time::sleep(REFRESH_DELAY).await;

            // Best-effort reload of the newest clip; failures are logged only
            if let Some(path) = latest::load_recent_clip(&client).await {
                note("Latest clip", format!("{}", path.display()))?;
            }

            outro("Done. Run 'vnote latest' to play the generated clip.")?;
            Ok(())
        }
        Err(e) => {
            progress.stop("Speech generation failed");
            tracing::error!("Synthesis error: {e:#}");
            outro_cancel("Error generating speech. Please check the server logs.")?;
            Err(e)
        }
    }
}

/// Trims the input and returns it only if something remains.
///
/// Empty or whitespace-only input never reaches the network.
fn validate_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_rejected() {
        assert_eq!(validate_text(""), None);
    }

    #[test]
    fn test_whitespace_only_text_is_rejected() {
        assert_eq!(validate_text("   \t\n  "), None);
    }

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(
            validate_text("  hello world \n"),
            Some("hello world".to_string())
        );
    }
}
