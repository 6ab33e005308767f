//! Configuration system using TOML files plus environment overrides.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\slsk-playlist\config.toml
//! - macOS: ~/Library/Application Support/slsk-playlist/config.toml
//! - Linux: ~/.config/slsk-playlist/config.toml
//!
//! After the file is read, environment variables (and a `.env` file in the
//! working directory) override individual settings. Credentials usually
//! come from the environment so they stay out of the config file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// slskd daemon connection
    pub daemon: DaemonConfig,

    /// Music catalog (playlist source) credentials
    pub catalog: CatalogConfig,

    /// Search and download behaviour
    pub download: DownloadConfig,
}

/// slskd daemon settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Host name or URL; `http://` is assumed when no scheme is given
    pub host: String,

    /// Port used when the host carries none
    pub port: u16,

    /// Web UI username
    pub username: Option<String>,

    /// Web UI password
    pub password: Option<String>,

    /// Optional API key, sent as `X-API-Key`
    pub api_key: Option<String>,

    /// Per-request timeout for reachability probes
    pub probe_timeout_secs: u64,

    /// Per-request timeout for every other control API call
    pub request_timeout_secs: u64,

    /// Number of one-second polls while waiting for the P2P login
    pub link_attempts: u32,

    /// Delay between P2P link state polls
    pub link_poll_interval_ms: u64,

    /// Reissue the connect command every this many polls while still disconnected
    pub reconnect_after: u32,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5030,
            username: Some("admin".to_string()),
            password: None,
            api_key: None,
            probe_timeout_secs: 10,
            request_timeout_secs: 30,
            link_attempts: 30,
            link_poll_interval_ms: 1000,
            reconnect_after: 5,
        }
    }
}

/// Catalog credentials. Absent credentials mean anonymous, public-only access.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl CatalogConfig {
    /// Both halves of the client credentials, if configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        }
    }
}

/// Upper bound for `max_concurrent`
pub const MAX_CONCURRENT_LIMIT: usize = 64;

/// Search, ranking and download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Where the daemon should place finished files
    pub directory: PathBuf,

    /// Tracks processed at once
    pub max_concurrent: usize,

    /// Accepted container extensions, lower case
    pub audio_formats: Vec<String>,

    /// Filenames advertising a lower `<N>kbps` encoding are rejected
    pub min_bitrate: u32,

    /// Files smaller than this are rejected
    pub min_file_size_bytes: u64,

    /// Upper bound on waiting for one search job
    pub search_timeout_secs: u64,

    /// Delay between search state checks
    pub search_poll_interval_ms: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./downloads"),
            max_concurrent: 3,
            audio_formats: vec!["mp3".to_string(), "flac".to_string(), "m4a".to_string()],
            min_bitrate: 192,
            min_file_size_bytes: 1024 * 1024,
            search_timeout_secs: 60,
            search_poll_interval_ms: 2000,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("slsk-playlist"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location, then apply the environment.
///
/// A missing config file is not an error; a malformed one is.
pub fn load() -> Result<Config, ConfigError> {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let mut config = match config_path() {
        Some(path) if path.exists() => load_from(&path)?,
        Some(path) => {
            tracing::debug!("No config file found at {:?}, using defaults", path);
            Config::default()
        }
        None => {
            tracing::warn!("Could not determine config directory, using defaults");
            Config::default()
        }
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    Ok(config)
}

/// Load configuration from a specific file without applying the environment.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

impl Config {
    /// Override settings from environment-style variables.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("SLSKD_HOST") {
            self.daemon.host = host;
        }
        if let Some(port) = get("SLSKD_PORT") {
            self.daemon.port = parse_number("SLSKD_PORT", &port)?;
        }
        if let Some(username) = get("SLSKD_USERNAME") {
            self.daemon.username = Some(username);
        }
        if let Some(password) = get("SLSKD_PASSWORD") {
            self.daemon.password = Some(password);
        }
        if let Some(api_key) = get("SLSKD_API_KEY") {
            self.daemon.api_key = Some(api_key);
        }
        if let Some(id) = get("SPOTIFY_CLIENT_ID") {
            self.catalog.client_id = Some(id);
        }
        if let Some(secret) = get("SPOTIFY_CLIENT_SECRET") {
            self.catalog.client_secret = Some(secret);
        }
        if let Some(dir) = get("DOWNLOAD_DIR") {
            self.download.directory = PathBuf::from(dir);
        }
        if let Some(max) = get("MAX_CONCURRENT_DOWNLOADS") {
            self.download.max_concurrent = parse_number("MAX_CONCURRENT_DOWNLOADS", &max)?;
        }
        if let Some(formats) = get("AUDIO_FORMATS") {
            self.download.audio_formats = formats
                .split(',')
                .map(|f| f.trim().trim_start_matches('.').to_lowercase())
                .filter(|f| !f.is_empty())
                .collect();
        }
        if let Some(min) = get("MIN_BITRATE") {
            self.download.min_bitrate = parse_number("MIN_BITRATE", &min)?;
        }
        Ok(())
    }

    /// Check mandatory settings before any network activity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if is_blank(&self.daemon.username) {
            missing.push("SLSKD_USERNAME".to_string());
        }
        if is_blank(&self.daemon.password) {
            missing.push("SLSKD_PASSWORD".to_string());
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials(missing));
        }

        if self.daemon.host.trim().is_empty() {
            return Err(ConfigError::InvalidUrl("SLSKD_HOST is empty".to_string()));
        }
        let concurrency = self.download.max_concurrent;
        if concurrency == 0 || concurrency > MAX_CONCURRENT_LIMIT {
            return Err(ConfigError::InvalidValue {
                key: "MAX_CONCURRENT_DOWNLOADS".to_string(),
                value: concurrency.to_string(),
            });
        }
        Ok(())
    }

    /// Create the download directory if needed.
    pub fn ensure_download_dir(&self) -> Result<(), ConfigError> {
        let dir = &self.download.directory;
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.clone(), e))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Missing required settings: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid daemon URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to create directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[daemon]"));
        assert!(toml.contains("[catalog]"));
        assert!(toml.contains("[download]"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[daemon]
host = "slskd.lan"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.daemon.host, "slskd.lan");
        assert_eq!(config.daemon.port, 5030);
        assert_eq!(config.daemon.username.as_deref(), Some("admin"));
        assert_eq!(config.download.max_concurrent, 3);
        assert_eq!(config.download.audio_formats, vec!["mp3", "flac", "m4a"]);
        assert_eq!(config.download.min_bitrate, 192);
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("SLSKD_HOST", "https://seek.example"),
                ("SLSKD_PORT", "6000"),
                ("SLSKD_PASSWORD", "hunter2"),
                ("MAX_CONCURRENT_DOWNLOADS", "2"),
                ("AUDIO_FORMATS", "MP3, .flac"),
                ("MIN_BITRATE", "256"),
            ]))
            .unwrap();

        assert_eq!(config.daemon.host, "https://seek.example");
        assert_eq!(config.daemon.port, 6000);
        assert_eq!(config.daemon.password.as_deref(), Some("hunter2"));
        assert_eq!(config.download.max_concurrent, 2);
        assert_eq!(config.download.audio_formats, vec!["mp3", "flac"]);
        assert_eq!(config.download.min_bitrate, 256);
    }

    #[test]
    fn test_env_rejects_bad_numbers() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("SLSKD_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SLSKD_PORT"));
    }

    #[test]
    fn test_validate_requires_daemon_password() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        match err {
            ConfigError::MissingCredentials(missing) => {
                assert_eq!(missing, vec!["SLSKD_PASSWORD".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_requires_username_and_password() {
        let mut config = Config::default();
        config.daemon.username = Some("  ".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SLSKD_USERNAME"));
        assert!(err.to_string().contains("SLSKD_PASSWORD"));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let mut config = Config::default();
        config.daemon.password = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_concurrency() {
        let mut config = Config::default();
        config.daemon.password = Some("secret".to_string());

        config.download.max_concurrent = MAX_CONCURRENT_LIMIT;
        assert!(config.validate().is_ok());

        for bad in [0, MAX_CONCURRENT_LIMIT + 1, usize::MAX] {
            config.download.max_concurrent = bad;
            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MAX_CONCURRENT_DOWNLOADS"),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn test_catalog_credentials_need_both_halves() {
        let mut catalog = CatalogConfig {
            client_id: Some("id".to_string()),
            client_secret: None,
        };
        assert!(catalog.credentials().is_none());
        catalog.client_secret = Some("secret".to_string());
        assert_eq!(catalog.credentials(), Some(("id", "secret")));
    }

    #[test]
    fn test_load_from_file_and_create_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let downloads = dir.path().join("music").join("incoming");
        std::fs::write(
            &path,
            format!(
                "[download]\ndirectory = {:?}\nmax_concurrent = 1\n",
                downloads.to_string_lossy()
            ),
        )
        .unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.download.max_concurrent, 1);
        config.ensure_download_dir().unwrap();
        assert!(downloads.is_dir());
    }

    #[test]
    fn test_load_from_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[daemon\nhost = ").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(..))));
    }
}
