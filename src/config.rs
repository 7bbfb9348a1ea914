//! Configuration system using TOML files.
//!
//! The config file is looked up in this order:
//! - the path given with `--config`
//! - `./config.toml` in the working directory
//! - the OS-standard config directory (`~/.config/tracker-sync/config.toml`
//!   on Linux, `%APPDATA%\tracker-sync\config.toml` on Windows)
//!
//! The file is parsed into raw serde structs, then validated once into an
//! immutable [`RunConfig`]. Validation reports every problem at once rather
//! than stopping at the first one.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::metadata::MetadataBackend;

const DEFAULT_LOGS_DIRECTORY: &str = "./logs";
const DEFAULT_TORRENTS_DIRECTORY: &str = "./torrents";
const DEFAULT_NUMBER_OF_REQUESTS: u32 = 5;
const DEFAULT_PER_SECONDS: u64 = 10;

// ============================================================================
// Raw file layout
// ============================================================================

/// Config file as written by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub settings: SettingsSection,
    pub trackers: Vec<TrackerSection>,
}

/// `[settings]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSection {
    pub music_directory: Option<PathBuf>,
    pub logs_directory: Option<PathBuf>,
    pub torrents_directory: Option<PathBuf>,
    pub metadata_backend: MetadataBackend,
}

/// One `[[trackers]]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSection {
    pub name: Option<String>,
    pub url: Option<String>,
    pub api_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub torrent_directory: Option<PathBuf>,
    pub number_of_requests: Option<u32>,
    pub per_seconds: Option<u64>,
    pub ignore_already_found: Option<bool>,
    pub ignore_already_not_found: Option<bool>,
}

// ============================================================================
// Validated configuration
// ============================================================================

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub music_directory: PathBuf,
    pub logs_directory: PathBuf,
    pub metadata_backend: MetadataBackend,
    /// In configuration order, which is also processing order
    pub trackers: Vec<TrackerConfig>,
}

/// Validated settings of one tracker
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Identifier, also used in log file names
    pub name: String,
    pub url: String,
    pub auth: AuthMode,
    pub torrent_directory: PathBuf,
    pub rate_limit: RateLimit,
    pub skip: SkipPolicy,
}

/// How to authenticate against a tracker
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    Token(String),
    Credentials { username: String, password: String },
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Token(_) => f.write_str("Token(***)"),
            AuthMode::Credentials { username, .. } => f
                .debug_struct("Credentials")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// At most `requests` API calls per `per_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests: u32,
    pub per_seconds: u64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests: DEFAULT_NUMBER_OF_REQUESTS,
            per_seconds: DEFAULT_PER_SECONDS,
        }
    }
}

/// Which previously recorded albums are skipped on this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipPolicy {
    pub already_found: bool,
    pub already_not_found: bool,
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self {
            already_found: true,
            already_not_found: true,
        }
    }
}

// ============================================================================
// Loading and validation
// ============================================================================

/// Resolve which config file to read
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from("config.toml");
    if local.exists() {
        return Some(local);
    }

    config_path()
}

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tracker-sync"))
}

/// Get the full path to the config file in the OS config directory
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Read, parse and validate a config file
pub fn load(path: &Path) -> Result<RunConfig, ConfigError> {
    tracing::info!("Trying to load config file {:?}", path);

    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let file: ConfigFile =
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

    let config = file.validate()?;
    tracing::info!(
        "Loaded config with {} tracker(s), music directory {:?}",
        config.trackers.len(),
        config.music_directory
    );
    Ok(config)
}

impl ConfigFile {
    /// Turn the raw file into a [`RunConfig`], collecting every problem
    pub fn validate(self) -> Result<RunConfig, ConfigError> {
        let mut problems = Vec::new();

        let music_directory = match self.settings.music_directory {
            Some(dir) if dir.is_dir() => Some(dir),
            Some(dir) => {
                problems.push(format!("settings: music directory {:?} not found", dir));
                None
            }
            None => {
                problems.push("settings: music_directory is required".to_string());
                None
            }
        };

        let logs_directory = self
            .settings
            .logs_directory
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGS_DIRECTORY));
        let torrents_root = self
            .settings
            .torrents_directory
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TORRENTS_DIRECTORY));

        if self.trackers.is_empty() {
            problems.push("at least one [[trackers]] entry is required".to_string());
        }

        let mut seen_names = HashSet::new();
        let mut trackers = Vec::with_capacity(self.trackers.len());

        for (index, section) in self.trackers.into_iter().enumerate() {
            if let Some(tracker) =
                section.validate(index, &torrents_root, &mut seen_names, &mut problems)
            {
                trackers.push(tracker);
            }
        }

        match music_directory {
            Some(music_directory) if problems.is_empty() => Ok(RunConfig {
                music_directory,
                logs_directory,
                metadata_backend: self.settings.metadata_backend,
                trackers,
            }),
            _ => Err(ConfigError::Invalid(problems)),
        }
    }
}

impl TrackerSection {
    fn validate(
        self,
        index: usize,
        torrents_root: &Path,
        seen_names: &mut HashSet<String>,
        problems: &mut Vec<String>,
    ) -> Option<TrackerConfig> {
        let label = match &self.name {
            Some(name) => format!("tracker {:?}", name),
            None => format!("tracker #{}", index + 1),
        };
        let before = problems.len();

        let name = match self.name {
            Some(name) if is_valid_name(&name) => {
                if !seen_names.insert(name.clone()) {
                    problems.push(format!("{}: duplicate tracker name", label));
                }
                Some(name)
            }
            Some(_) => {
                problems.push(format!(
                    "{}: name must be non-empty and contain only letters, digits, '-' or '_'",
                    label
                ));
                None
            }
            None => {
                problems.push(format!("{}: name is required", label));
                None
            }
        };

        let url = match self.url {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => Some(url),
            Some(url) => {
                problems.push(format!("{}: url {:?} must start with http(s)://", label, url));
                None
            }
            None => {
                problems.push(format!("{}: URL of the tracker must be provided", label));
                None
            }
        };

        let auth = match (self.api_token, self.username, self.password) {
            (Some(token), None, None) if !token.trim().is_empty() => {
                Some(AuthMode::Token(token))
            }
            (Some(_), None, None) => {
                problems.push(format!("{}: api_token is empty", label));
                None
            }
            (None, Some(username), Some(password)) => {
                Some(AuthMode::Credentials { username, password })
            }
            (None, None, None) => {
                problems.push(format!(
                    "{}: missing credentials (api_token, or username and password)",
                    label
                ));
                None
            }
            (Some(_), _, _) => {
                problems.push(format!(
                    "{}: api_token and username/password are mutually exclusive",
                    label
                ));
                None
            }
            (None, _, _) => {
                problems.push(format!(
                    "{}: username and password must be given together",
                    label
                ));
                None
            }
        };

        let rate_limit = RateLimit {
            requests: self.number_of_requests.unwrap_or(DEFAULT_NUMBER_OF_REQUESTS),
            per_seconds: self.per_seconds.unwrap_or(DEFAULT_PER_SECONDS),
        };
        if rate_limit.requests == 0 {
            problems.push(format!("{}: number_of_requests must be at least 1", label));
        }
        if rate_limit.per_seconds == 0 {
            problems.push(format!("{}: per_seconds must be at least 1", label));
        }

        let skip = SkipPolicy {
            already_found: self.ignore_already_found.unwrap_or(true),
            already_not_found: self.ignore_already_not_found.unwrap_or(true),
        };

        if problems.len() != before {
            return None;
        }

        let name = name?;
        let torrent_directory = self
            .torrent_directory
            .unwrap_or_else(|| torrents_root.join(&name));

        Some(TrackerConfig {
            name,
            url: url?,
            auth: auth?,
            torrent_directory,
            rate_limit,
            skip,
        })
    }
}

/// Tracker names end up in file names, so keep them simple
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl RunConfig {
    /// Create the logs directory and every torrent directory if missing
    pub fn prepare_directories(&self) -> Result<(), ConfigError> {
        let dirs = std::iter::once(&self.logs_directory)
            .chain(self.trackers.iter().map(|t| &t.torrent_directory));

        for dir in dirs {
            if !dir.exists() {
                tracing::warn!("{:?} doesn't exist. Creating it", dir);
                std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.clone(), e))?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No config file found. Pass --config or create ./config.toml")]
    NotFound,

    #[error("Failed to read config file {0:?}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0:?}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Invalid configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),

    #[error("Failed to create directory {0:?}: {1}")]
    CreateDir(PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
