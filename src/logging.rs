//! File-based tracing setup.
//!
//! Log records go to a daily-rotated file under the XDG state directory,
//! never to the terminal, so the recorder TUI and cliclack prompts stay
//! clean. At startup rotated files older than a week are pruned.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Rotated files kept after pruning (one per day).
const KEPT_LOG_FILES: usize = 7;

/// Holds the non-blocking writer guard so buffered records are flushed
/// when the process exits.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Installs the global tracing subscriber writing to `vnote.log`.
///
/// The filter comes from `RUST_LOG` and falls back to `info`. Calling this
/// twice is an error.
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If a subscriber was already installed
pub fn init_logging() -> Result<(), anyhow::Error> {
    let log_dir = get_log_dir()?;

    // Prune before the appender creates today's file
    if let Err(e) = prune_rotated_logs(&log_dir) {
        eprintln!("Warning: Failed to cleanup old logs: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "vnote.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log file: {}", log_dir.display());
    Ok(())
}

/// Resolves and creates the log directory.
///
/// `$XDG_STATE_HOME/vnote` when the variable is set, `~/.local/state/vnote`
/// otherwise. Also used by the `logs` command to locate the files it tails.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the directory cannot be created
pub fn get_log_dir() -> Result<PathBuf, anyhow::Error> {
    let log_dir = if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(xdg_state).join("vnote")
    } else {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        home.join(".local/state/vnote")
    };

    std::fs::create_dir_all(&log_dir)?;

    Ok(log_dir)
}

/// Deletes rotated log files beyond the newest [`KEPT_LOG_FILES`].
///
/// Only files named `vnote.log.YYYY-MM-DD` are considered; a failed delete
/// is logged and skipped.
///
/// # Errors
/// - If the log directory cannot be read
fn prune_rotated_logs(log_dir: &Path) -> Result<(), anyhow::Error> {
    let mut rotated: Vec<(PathBuf, std::time::SystemTime)> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !is_rotated_log(&path) {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    // Newest first, so everything past the cutoff index goes
    rotated.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in rotated.iter().skip(KEPT_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }

    Ok(())
}

/// Matches the `vnote.log.YYYY-MM-DD` names produced by daily rotation.
fn is_rotated_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with("vnote.log.") && name.matches('-').count() == 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotated_log_names_are_recognized() {
        assert!(is_rotated_log(Path::new("/tmp/vnote.log.2025-08-23")));
        assert!(!is_rotated_log(Path::new("/tmp/vnote.log")));
        assert!(!is_rotated_log(Path::new("/tmp/other.log.2025-08-23")));
    }
}
