//! Configuration file management for vnote.
//!
//! Loads and saves application configuration from a TOML file in the user's
//! config directory. A default configuration is written on first run so the
//! tool works out of the box against a local server.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Voice note server connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the vnote server, e.g. "http://localhost:5000"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds for upload and synthesis calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `vnote list-devices`
    /// - device name from `vnote list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Recording sample rate in Hz (actual rate depends on the device)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
        }
    }
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VnoteConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

impl VnoteConfig {
    /// Loads configuration from the user's config directory, writing a
    /// default config file first if none exists yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the config file cannot be read or written
    /// - If the TOML is malformed
    pub fn load_or_init() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            let defaults = VnoteConfig::default();
            defaults.save()?;
            tracing::info!(
                "Created default configuration at {}",
                config_path.display()
            );
            return Ok(defaults);
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: VnoteConfig = toml::from_str(&config_content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", config_path.display()))?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating the parent directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("vnote");

    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("vnote.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VnoteConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:5000");
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.sample_rate, 16000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: VnoteConfig = toml::from_str(
            r#"
            [server]
            base_url = "https://notes.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "https://notes.example.com");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.audio.device, "default");
    }

    #[test]
    fn test_roundtrip() {
        let config = VnoteConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: VnoteConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.server.base_url, config.server.base_url);
        assert_eq!(parsed.audio.sample_rate, config.audio.sample_rate);
    }
}
