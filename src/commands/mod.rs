//! Application command handlers for vnote.
//!
//! This module organizes command handling into separate submodules, each responsible for a
//! specific application command.
//!
//! # Commands
//! - `record`: Record a voice note and upload it to the server
//! - `say`: Submit text for server-side text-to-speech synthesis
//! - `latest`: Fetch and play the most recently generated speech clip
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

use std::time::Duration;

pub mod config;
pub mod latest;
pub mod list_devices;
pub mod logs;
pub mod record;
pub mod say;

pub use config::handle_config;
pub use latest::handle_latest;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
pub use say::handle_say;

/// Delay between a successful upload and the view refresh that follows it.
///
/// Gives the server a moment to finish storing and processing the upload
/// before its state is re-read.
pub(crate) const REFRESH_DELAY: Duration = Duration::from_secs(1);
