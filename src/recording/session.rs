//! Recording session data model and recorder state machine.
//!
//! A session lives for exactly one start-to-stop cycle: it collects the
//! ordered chunks of mono PCM the capture callback delivers, remembers when
//! recording started, and is consumed when the chunks are assembled into a
//! single WAV buffer. Starting a new recording always creates a fresh session.

use std::io::Cursor;
use std::time::Instant;

/// Recorder lifecycle state.
///
/// Start is accepted only in `Idle`; stop only in `Recording`. A denied
/// microphone request drops back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    RequestingPermission,
    Recording,
}

/// Events driving the recorder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderEvent {
    /// User asked to start recording
    StartRequested,
    /// Microphone access was granted and the stream is live
    PermissionGranted,
    /// Microphone access failed (no device, no permission)
    PermissionDenied,
    /// Recording was stopped or cancelled
    Stopped,
}

impl RecorderState {
    /// Whether the start action is currently accepted.
    pub fn can_start(self) -> bool {
        self == RecorderState::Idle
    }

    /// Whether the stop action is currently accepted.
    pub fn can_stop(self) -> bool {
        self == RecorderState::Recording
    }

    /// Applies an event, returning the next state.
    ///
    /// Events that are not valid in the current state leave it unchanged.
    pub fn on_event(self, event: RecorderEvent) -> RecorderState {
        match (self, event) {
            (RecorderState::Idle, RecorderEvent::StartRequested) => {
                RecorderState::RequestingPermission
            }
            (RecorderState::RequestingPermission, RecorderEvent::PermissionGranted) => {
                RecorderState::Recording
            }
            (RecorderState::RequestingPermission, RecorderEvent::PermissionDenied) => {
                RecorderState::Idle
            }
            (RecorderState::Recording, RecorderEvent::Stopped) => RecorderState::Idle,
            (state, _) => state,
        }
    }
}

/// One start-to-stop recording interaction.
///
/// Chunks are appended in capture order and only while recording is active;
/// the assembled buffer is built once, at stop time.
#[derive(Debug)]
pub struct RecordingSession {
    chunks: Vec<Vec<i16>>,
    started_at: Instant,
    sample_rate: u32,
}

impl RecordingSession {
    /// Creates a fresh, empty session starting now.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            chunks: Vec::new(),
            started_at: Instant::now(),
            sample_rate,
        }
    }

    /// Appends one chunk of mono PCM samples in capture order.
    pub fn append_chunk(&mut self, chunk: Vec<i16>) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    /// Total number of captured samples across all chunks.
    pub fn sample_count(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Elapsed whole seconds since the session started, from the wall clock.
    ///
    /// Recomputed on every call rather than accumulated, so a slow UI tick
    /// cannot make the display drift.
    pub fn elapsed_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Sample rate the session was captured at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns up to `max` of the most recent samples, for the level meter.
    pub fn tail_samples(&self, max: usize) -> Vec<i16> {
        let mut tail: Vec<i16> = Vec::with_capacity(max);
        for chunk in self.chunks.iter().rev() {
            let remaining = max - tail.len();
            let start = chunk.len().saturating_sub(remaining);
            tail.splice(0..0, chunk[start..].iter().copied());
            if tail.len() >= max {
                break;
            }
        }
        tail
    }

    /// Concatenates all captured chunks, in capture order, into one buffer.
    pub fn assemble(&self) -> Vec<i16> {
        let mut samples = Vec::with_capacity(self.sample_count());
        for chunk in &self.chunks {
            samples.extend_from_slice(chunk);
        }
        samples
    }

    /// Assembles the session into a single in-memory WAV buffer
    /// (16-bit mono PCM at the session's sample rate).
    ///
    /// # Errors
    /// - If WAV encoding fails
    pub fn into_wav_bytes(self) -> anyhow::Result<Vec<u8>> {
        let samples = self.assemble();
        encode_wav(&samples, self.sample_rate)
    }
}

/// Encodes mono i16 PCM samples as an in-memory WAV file.
///
/// # Errors
/// - If the WAV writer fails (header or sample write)
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Vec::new();
    {
        let cursor = Cursor::new(&mut buffer);
        let mut writer = hound::WavWriter::new(cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(buffer)
}

/// Formats elapsed seconds as `MM:SS`, both fields zero-padded.
///
/// Minutes are not capped at 59: an hour-long recording shows as "61:01".
pub fn format_elapsed(total_secs: u64) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed_zero() {
        assert_eq!(format_elapsed(0), "00:00");
    }

    #[test]
    fn test_format_elapsed_minute_rollover() {
        assert_eq!(format_elapsed(65), "01:05");
    }

    #[test]
    fn test_format_elapsed_minutes_uncapped() {
        assert_eq!(format_elapsed(3661), "61:01");
    }

    #[test]
    fn test_assemble_preserves_capture_order() {
        let mut session = RecordingSession::new(16000);
        session.append_chunk(vec![1, 2, 3]);
        session.append_chunk(vec![4]);
        session.append_chunk(vec![5, 6]);

        assert_eq!(session.sample_count(), 6);
        assert_eq!(session.assemble(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_empty_chunks_are_dropped() {
        let mut session = RecordingSession::new(16000);
        session.append_chunk(Vec::new());
        session.append_chunk(vec![7]);

        assert_eq!(session.assemble(), vec![7]);
    }

    #[test]
    fn test_tail_samples_returns_most_recent() {
        let mut session = RecordingSession::new(16000);
        session.append_chunk(vec![1, 2, 3]);
        session.append_chunk(vec![4, 5]);

        assert_eq!(session.tail_samples(3), vec![3, 4, 5]);
        assert_eq!(session.tail_samples(10), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_wav_bytes_roundtrip() {
        let mut session = RecordingSession::new(8000);
        session.append_chunk(vec![0, 100, -100]);
        session.append_chunk(vec![32000]);

        let bytes = session.into_wav_bytes().unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 8000);

        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(samples, vec![0, 100, -100, 32000]);
    }

    #[test]
    fn test_state_machine_happy_path() {
        let state = RecorderState::Idle;
        assert!(state.can_start());

        let state = state.on_event(RecorderEvent::StartRequested);
        assert_eq!(state, RecorderState::RequestingPermission);

        let state = state.on_event(RecorderEvent::PermissionGranted);
        assert_eq!(state, RecorderState::Recording);
        assert!(state.can_stop());
        assert!(!state.can_start());

        let state = state.on_event(RecorderEvent::Stopped);
        assert_eq!(state, RecorderState::Idle);
    }

    #[test]
    fn test_state_machine_permission_denied() {
        let state = RecorderState::RequestingPermission;
        let state = state.on_event(RecorderEvent::PermissionDenied);
        assert_eq!(state, RecorderState::Idle);
        assert!(state.can_start());
    }

    #[test]
    fn test_state_machine_ignores_invalid_events() {
        // Stop while idle does nothing
        let state = RecorderState::Idle.on_event(RecorderEvent::Stopped);
        assert_eq!(state, RecorderState::Idle);

        // Start while already recording does nothing
        let state = RecorderState::Recording.on_event(RecorderEvent::StartRequested);
        assert_eq!(state, RecorderState::Recording);
    }
}
