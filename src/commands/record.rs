//! Record a voice note and upload it to the server.
//!
//! Drives the recorder state machine (idle, requesting the microphone,
//! recording, back to idle), shows elapsed time while recording, and on stop
//! assembles the captured chunks into a WAV buffer, keeps a local copy, and
//! uploads it. Supports an external stop trigger via SIGUSR1.

use crate::api::{self, ApiClient};
use crate::commands::REFRESH_DELAY;
use crate::config::{self, VnoteConfig};
use crate::recording::{
    AudioRecorder, RecorderCommand, RecorderEvent, RecorderState, RecorderTui, RecordingSession,
};
use crate::ui::ErrorScreen;

/// Handles the record command.
///
/// The start action is accepted only while idle and the stop action only
/// while recording; cancelling discards the session without uploading.
pub async fn handle_record() -> Result<(), anyhow::Error> {
    tracing::info!("=== vnote Recorder Started ===");

    let config_data = match VnoteConfig::load_or_init() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration error:\n\n{err}\n\nPlease check your ~/.config/vnote/vnote.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: server={}, device={}, sample_rate={}Hz",
        config_data.server.base_url,
        config_data.audio.device,
        config_data.audio.sample_rate
    );

    let client = ApiClient::new(
        &config_data.server.base_url,
        config_data.server.request_timeout_secs,
    )?;

    let mut recorder = AudioRecorder::new(
        config_data.audio.sample_rate,
        config_data.audio.device.clone(),
    );

    let mut tui = RecorderTui::new(config_data.audio.sample_rate)
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    // External stop trigger, e.g. from a window manager keybinding
    let stop_signal = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, stop_signal.clone())
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    let mut state = RecorderState::Idle;
    let mut finished: Option<RecordingSession> = None;

    loop {
        if stop_signal.swap(false, std::sync::atomic::Ordering::Relaxed) && state.can_stop() {
            tracing::info!("Received SIGUSR1: stopping recording via external trigger");
            finished = Some(recorder.stop());
            break;
        }

        match state {
            RecorderState::Idle => {
                tui.render_idle()
                    .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
            }
            RecorderState::Recording => {
                // One meter window's worth of the newest samples (~50ms)
                let samples = recorder.tail_samples((recorder.sample_rate() / 20) as usize);
                tui.render_recording(&samples, recorder.elapsed_secs())
                    .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
            }
            RecorderState::RequestingPermission => {
                // Transient state; resolved synchronously below
            }
        }

        match tui.handle_input(state) {
            Ok(RecorderCommand::Continue) => {}
            Ok(RecorderCommand::Start) => {
                state = state.on_event(RecorderEvent::StartRequested);
                match recorder.start() {
                    Ok(()) => {
                        state = state.on_event(RecorderEvent::PermissionGranted);
                        // The device may have overridden the requested rate
                        tui.set_sample_rate(recorder.sample_rate());
                        tracing::info!("Microphone access granted, recording started");
                    }
                    Err(e) => {
                        state = state.on_event(RecorderEvent::PermissionDenied);
                        tracing::error!("Microphone access error: {e:#}");
                        tui.cleanup().ok();
                        let mut error_screen = ErrorScreen::new()?;
                        error_screen.show_error(
                            "Could not access microphone. Please check permissions and the configured input device.",
                        )?;
                        error_screen.cleanup()?;
                        return Err(e);
                    }
                }
            }
            Ok(RecorderCommand::Stop) => {
                finished = Some(recorder.stop());
                break;
            }
            Ok(RecorderCommand::Cancel) => {
                if state.can_stop() {
                    recorder.cancel();
                }
                break;
            }
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                return Err(anyhow::anyhow!("Input handling error: {e}"));
            }
        }
    }

    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    let Some(session) = finished else {
        tracing::info!("Recording cancelled, nothing uploaded");
        return Ok(());
    };

    if session.sample_count() == 0 {
        tracing::warn!("Recording stopped with no samples captured");
        println!("No audio captured, nothing to upload.");
        return Ok(());
    }

    let wav_bytes = session.into_wav_bytes()?;

    // Keep a local copy for playback before the buffer is consumed by the upload
    let local_copy = save_local_copy(&wav_bytes)?;
    println!("Recording saved to {}", local_copy.display());

    match api::upload_recording(&client, wav_bytes).await {
        Ok(()) => {
            tokio::time::sleep(REFRESH_DELAY).await;
            // Re-read server state now that the upload landed; best-effort,
            // failures are logged only
            if let Some(path) = crate::commands::latest::load_recent_clip(&client).await {
                println!("Latest generated clip: {}", path.display());
            }
            println!("Recording uploaded.");
            tracing::info!("=== vnote Recorder Exited Successfully ===");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Upload failed: {e:#}");
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error("Error uploading audio. Please try again.")?;
            error_screen.cleanup()?;
            Err(e)
        }
    }
}

/// Writes the WAV buffer to a timestamped file under the data directory.
///
/// # Errors
/// - If the recordings directory cannot be created
/// - If the file cannot be written
fn save_local_copy(wav_bytes: &[u8]) -> anyhow::Result<std::path::PathBuf> {
    let recordings_dir = config::data_dir()?.join("recordings");
    std::fs::create_dir_all(&recordings_dir)?;

    let filename = format!("{}.wav", chrono::Local::now().format("%Y%m%d-%H%M%S"));
    let path = recordings_dir.join(filename);

    std::fs::write(&path, wav_bytes)?;
    tracing::debug!("Local copy saved: {}", path.display());

    Ok(path)
}
