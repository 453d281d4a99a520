//! Local audio playback through the system player.
//!
//! Used for the downloaded text-to-speech clips and local recording copies.

use anyhow::anyhow;
use std::path::Path;
use std::process::Command;

/// Plays an audio file using the system's default audio player.
///
/// On macOS: uses the `open` command.
/// On Linux: tries xdg-open first, then falls back to common audio players
/// (mpv, vlc, ffplay, paplay).
///
/// # Errors
/// - If the file does not exist
/// - If no usable player can be found or started
pub fn play_file(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        return Err(anyhow!("Audio file not found: {}", path.display()));
    }

    tracing::info!("Playing {}", path.display());

    #[cfg(target_os = "macos")]
    {
        Command::new("open")
            .arg(path)
            .spawn()
            .map_err(|e| anyhow!("Failed to open audio player: {e}"))?
            .wait()
            .map_err(|e| anyhow!("Audio player error: {e}"))?;
    }

    #[cfg(target_os = "linux")]
    {
        match Command::new("xdg-open").arg(path).spawn() {
            Ok(mut child) => {
                child
                    .wait()
                    .map_err(|e| anyhow!("Audio player error: {e}"))?;
            }
            Err(_) => {
                // Fallback to common audio players if xdg-open is missing
                let players = ["mpv", "vlc", "ffplay", "paplay"];
                let mut played = false;

                for player in players {
                    if let Ok(mut child) = Command::new(player).arg(path).spawn() {
                        let _ = child.wait();
                        played = true;
                        break;
                    }
                }

                if !played {
                    return Err(anyhow!(
                        "No audio player found. Install mpv, vlc, ffplay, or paplay"
                    ));
                }
            }
        }
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        return Err(anyhow!(
            "Audio playback is not supported on this platform. File saved at {}",
            path.display()
        ));
    }

    #[cfg(any(target_os = "macos", target_os = "linux"))]
    {
        tracing::debug!("Playback finished for {}", path.display());
        Ok(())
    }
}
