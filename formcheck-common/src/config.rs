//! Configuration file loading
//!
//! FormCheck services read an optional TOML file from the platform config
//! directory; environment variables take priority over file values (the
//! resolution itself lives in each service's `config` module).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration shared by FormCheck services
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// HTTP listen port
    pub listen_port: Option<u16>,
    /// Path to the ffmpeg binary (defaults to PATH lookup)
    pub ffmpeg_path: Option<String>,
    /// Path to the ffprobe binary (defaults to PATH lookup)
    pub ffprobe_path: Option<String>,
    /// Base URL of the face/emotion detector service
    pub emotion_endpoint: Option<String>,
    /// Number of tail sample instants per analyzed video
    pub tail_count: Option<usize>,
}

/// Default configuration file path for the platform
///
/// `~/.config/formcheck/config.toml` on Linux (or the platform equivalent),
/// falling back to `/etc/formcheck/config.toml` where it exists.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        let user_config = dir.join("formcheck").join("config.toml");
        if user_config.exists() {
            return Some(user_config);
        }
    }
    let system_config = PathBuf::from("/etc/formcheck/config.toml");
    if system_config.exists() {
        return Some(system_config);
    }
    None
}

/// Load a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load the configuration file from the default location, if present
///
/// A missing file is not an error; a present-but-malformed file is.
pub fn load_default_config() -> Result<TomlConfig> {
    match default_config_path() {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            load_toml_config(&path)
        }
        None => Ok(TomlConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "listen_port = 6000\nffmpeg_path = \"/usr/bin/ffmpeg\"\ntail_count = 4"
        )
        .unwrap();

        let config = load_toml_config(file.path()).unwrap();
        assert_eq!(config.listen_port, Some(6000));
        assert_eq!(config.ffmpeg_path.as_deref(), Some("/usr/bin/ffmpeg"));
        assert_eq!(config.ffprobe_path, None);
        assert_eq!(config.tail_count, Some(4));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = load_toml_config(file.path()).unwrap();
        assert_eq!(config.listen_port, None);
        assert_eq!(config.emotion_endpoint, None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen_port = \"not a port").unwrap();
        assert!(load_toml_config(file.path()).is_err());
    }
}
