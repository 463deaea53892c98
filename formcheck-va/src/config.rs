//! Configuration resolution for formcheck-va
//!
//! Each setting resolves with ENV → TOML → compiled-default priority; a
//! warning is logged when multiple sources configure the same key.

use formcheck_common::config::TomlConfig;
use tracing::warn;

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 5731;

/// Default detector endpoint (a local sidecar in development)
pub const DEFAULT_EMOTION_ENDPOINT: &str = "http://127.0.0.1:5741";

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub listen_port: u16,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub emotion_endpoint: String,
    pub tail_count: usize,
}

impl ServiceConfig {
    /// Resolve the full configuration against a loaded TOML file
    pub fn resolve(toml_config: &TomlConfig) -> Self {
        Self {
            listen_port: resolve_parsed(
                "FORMCHECK_PORT",
                toml_config.listen_port,
                DEFAULT_PORT,
                "listen_port",
            ),
            ffmpeg_path: resolve_string(
                "FORMCHECK_FFMPEG",
                toml_config.ffmpeg_path.as_deref(),
                "ffmpeg",
                "ffmpeg_path",
            ),
            ffprobe_path: resolve_string(
                "FORMCHECK_FFPROBE",
                toml_config.ffprobe_path.as_deref(),
                "ffprobe",
                "ffprobe_path",
            ),
            emotion_endpoint: resolve_string(
                "FORMCHECK_EMOTION_ENDPOINT",
                toml_config.emotion_endpoint.as_deref(),
                DEFAULT_EMOTION_ENDPOINT,
                "emotion_endpoint",
            ),
            tail_count: resolve_parsed(
                "FORMCHECK_TAIL_COUNT",
                toml_config.tail_count,
                crate::scoring::timestamps::DEFAULT_TAIL_COUNT,
                "tail_count",
            ),
        }
    }
}

/// ENV → TOML → default resolution for string settings
fn resolve_string(env_key: &str, toml_value: Option<&str>, default: &str, name: &str) -> String {
    let env_value = std::env::var(env_key).ok().filter(|v| !v.trim().is_empty());

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} configured in both environment and TOML; using environment ({})",
            name, env_key
        );
    }

    env_value
        .or_else(|| toml_value.map(str::to_string))
        .unwrap_or_else(|| default.to_string())
}

/// ENV → TOML → default resolution for parseable settings
///
/// An unparseable environment value falls through to the next source with
/// a warning rather than aborting startup.
fn resolve_parsed<T>(env_key: &str, toml_value: Option<T>, default: T, name: &str) -> T
where
    T: std::str::FromStr + Copy,
{
    if let Ok(raw) = std::env::var(env_key) {
        match raw.trim().parse() {
            Ok(value) => {
                if toml_value.is_some() {
                    warn!(
                        "{} configured in both environment and TOML; using environment ({})",
                        name, env_key
                    );
                }
                return value;
            }
            Err(_) => {
                warn!("{} ignored: unparseable value {:?}", env_key, raw);
            }
        }
    }
    toml_value.unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_with_empty_config() {
        let config = ServiceConfig::resolve(&TomlConfig::default());
        assert_eq!(config.listen_port, DEFAULT_PORT);
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.emotion_endpoint, DEFAULT_EMOTION_ENDPOINT);
        assert_eq!(config.tail_count, 10);
    }

    #[test]
    fn toml_values_override_defaults() {
        let toml_config = TomlConfig {
            listen_port: Some(6100),
            ffmpeg_path: Some("/opt/ffmpeg/bin/ffmpeg".to_string()),
            ffprobe_path: None,
            emotion_endpoint: Some("http://detector.internal:8080".to_string()),
            tail_count: Some(4),
        };
        let config = ServiceConfig::resolve(&toml_config);
        assert_eq!(config.listen_port, 6100);
        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.emotion_endpoint, "http://detector.internal:8080");
        assert_eq!(config.tail_count, 4);
    }
}
