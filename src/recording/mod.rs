//! Audio recording feature for vnote.
//!
//! Provides microphone capture, the recording session data model and state
//! machine, and the terminal UI for the record workflow.

pub mod audio;
pub mod session;
pub mod ui;

pub use audio::AudioRecorder;
pub use session::{format_elapsed, RecorderEvent, RecorderState, RecordingSession};
pub use ui::{RecorderCommand, RecorderTui};
