//! Microphone capture.
//!
//! Opens the configured input device through cpal and appends each callback
//! delivery as one ordered chunk to the active recording session. Audio is
//! averaged down to mono i16 PCM at the device's native sample rate. The
//! capture stream is owned exclusively by the recorder and dropped on stop,
//! which releases the device and turns off any input indicator.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

use super::session::RecordingSession;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Records audio from a specified or default input device into a
/// [`RecordingSession`].
///
/// One recorder drives one session at a time; `start` always begins from a
/// fresh session, and `stop`/`cancel` end the session and release the device.
pub struct AudioRecorder {
    /// Requested sample rate; replaced by the device rate once the stream opens
    sample_rate: u32,
    /// Active session, shared with the capture callback
    session: Arc<Mutex<RecordingSession>>,
    /// Active audio input stream (kept alive during recording)
    stream: Option<cpal::Stream>,
    /// Device name, numeric index, or "default"
    device_name: String,
}

impl AudioRecorder {
    /// Creates a new audio recorder.
    ///
    /// The actual recording sample rate may differ based on device
    /// capabilities; call `sample_rate()` after `start()` for the real rate.
    pub fn new(requested_sample_rate: u32, device_name: String) -> Self {
        Self {
            sample_rate: requested_sample_rate,
            session: Arc::new(Mutex::new(RecordingSession::new(requested_sample_rate))),
            stream: None,
            device_name,
        }
    }

    /// Starts recording from the configured input device into a fresh session.
    ///
    /// # Errors
    /// - If the specified device is not available
    /// - If device configuration fails
    /// - If audio stream creation fails
    pub fn start(&mut self) -> Result<()> {
        // Get device while suppressing ALSA library warnings
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if self.device_name == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let device_config = device.default_input_config()?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            device_sample_rate,
            num_channels
        );

        self.sample_rate = device_sample_rate;

        // Fresh session per start; the old one (if any) is discarded
        self.session = Arc::new(Mutex::new(RecordingSession::new(device_sample_rate)));

        let session_arc = Arc::clone(&self.session);
        let callback_channels = num_channels;

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let chunk = downmix_to_mono(data, callback_channels);
                if let Ok(mut session) = session_arc.lock() {
                    session.append_chunk(chunk);
                }
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!("Audio stream started");
        Ok(())
    }

    /// Stops recording and returns the finished session.
    ///
    /// Dropping the stream releases the capture device; no further chunks
    /// are appended after this returns.
    pub fn stop(&mut self) -> RecordingSession {
        self.stream = None;

        let finished = std::mem::replace(
            &mut *self.session.lock().unwrap_or_else(|e| e.into_inner()),
            RecordingSession::new(self.sample_rate),
        );

        let duration_secs = finished.sample_count() as f32 / self.sample_rate as f32;
        tracing::info!(
            "Recording stopped: {:.2}s ({} samples at {}Hz)",
            duration_secs,
            finished.sample_count(),
            self.sample_rate
        );

        finished
    }

    /// Discards the active session and releases the capture device.
    pub fn cancel(&mut self) {
        self.stream = None;
        let _ = std::mem::replace(
            &mut *self.session.lock().unwrap_or_else(|e| e.into_inner()),
            RecordingSession::new(self.sample_rate),
        );
        tracing::info!("Recording cancelled, session discarded");
    }

    /// Elapsed whole seconds since the active session started.
    pub fn elapsed_secs(&self) -> u64 {
        self.session
            .lock()
            .map(|s| s.elapsed_secs())
            .unwrap_or_default()
    }

    /// Total samples captured so far in the active session.
    pub fn sample_count(&self) -> usize {
        self.session
            .lock()
            .map(|s| s.sample_count())
            .unwrap_or_default()
    }

    /// Most recent samples from the active session, for the level meter.
    pub fn tail_samples(&self, max: usize) -> Vec<i16> {
        self.session
            .lock()
            .map(|s| s.tail_samples(max))
            .unwrap_or_default()
    }

    /// Actual sample rate of the recording.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Converts interleaved multi-channel samples to one mono chunk by
/// averaging all channels per frame.
fn downmix_to_mono(data: &[i16], num_channels: usize) -> Vec<i16> {
    match num_channels {
        0 | 1 => data.to_vec(),
        2 => data
            .chunks_exact(2)
            .map(|pair| {
                let left = pair[0] as i32;
                let right = pair[1] as i32;
                ((left + right) / 2) as i16
            })
            .collect(),
        _ => data
            .chunks_exact(num_channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / num_channels as i32) as i16
            })
            .collect(),
    }
}

/// Finds an audio input device by name or numeric index.
///
/// # Arguments
/// * `host` - The cpal audio host
/// * `device_spec` - Either "default" for system default, a device name, or a numeric index (0, 1, 2, etc.)
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    // Try to parse as a numeric index first
    if let Ok(index) = device_spec.parse::<usize>() {
        let mut devices = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

        return devices.nth(index).ok_or_else(|| {
            anyhow!("Device index {index} is out of range. Use 'vnote list-devices' to see available devices.")
        });
    }

    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'vnote list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_mono_passthrough() {
        assert_eq!(downmix_to_mono(&[1, 2, 3], 1), vec![1, 2, 3]);
    }

    #[test]
    fn test_downmix_stereo_averages_pairs() {
        assert_eq!(downmix_to_mono(&[100, 200, -50, 50], 2), vec![150, 0]);
    }

    #[test]
    fn test_downmix_multichannel_averages_frames() {
        assert_eq!(downmix_to_mono(&[30, 60, 90, 3, 6, 9], 3), vec![60, 6]);
    }
}
