//! Configuration management for vnote.
//!
//! Handles loading and saving application configuration from a TOML file in
//! the user's config directory, and resolves the local data directory where
//! recording copies and downloaded clips are kept.

pub mod file;

pub use file::{AudioConfig, ServerConfig, VnoteConfig};

use std::path::PathBuf;

/// Returns the local data directory (`~/.local/share/vnote`), creating it if needed.
///
/// Local copies of uploaded recordings and downloaded speech clips live here.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the directory cannot be created
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("vnote");

    std::fs::create_dir_all(&dir)?;

    Ok(dir)
}
