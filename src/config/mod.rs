//! Configuration management using the prefer crate.
//!
//! A config file (TOML, YAML or JSON) is discovered under the name
//! `diarybatch` or given explicitly, applied over [`Settings::default`], and
//! finally overridden by environment variables.

mod settings;

pub use settings::{
    FrameSettings, KeywordSettings, ModerationSettings, Settings, DEFAULT_CHUNK_SIZE,
    DEFAULT_DATABASE_FILENAME, DEFAULT_SKIP_LIMIT,
};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {format} config {}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Config file contents. Every field is optional; unset fields keep the
/// defaults from [`Settings`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename inside the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<KeywordSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames: Option<FrameSettings>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover a `diarybatch` config file in the standard locations.
    /// Falls back to defaults when none is found or it cannot be parsed.
    pub async fn load() -> Self {
        let Ok(pref_config) = prefer::load("diarybatch").await else {
            debug!("No config file found, using defaults");
            return Self::default();
        };
        let Some(path) = pref_config.source_path() else {
            return Self::default();
        };

        match Self::load_from_path(path).await {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file, parsed by extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        match path.extension().and_then(|e| e.to_str()).unwrap_or("json") {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }

    /// Directory of the config file, used to resolve relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Expand `~` and resolve relative paths against `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref url) = self.database_url {
            settings.database_url = Some(url.clone());
        }
        if let Some(chunk_size) = self.chunk_size {
            settings.chunk_size = chunk_size;
        }
        if let Some(skip_limit) = self.skip_limit {
            settings.skip_limit = skip_limit;
        }
        if let Some(timeout) = self.item_timeout_secs {
            settings.item_timeout_secs = Some(timeout);
        }
        if let Some(ref moderation) = self.moderation {
            settings.moderation = moderation.clone();
        }
        if let Some(ref keywords) = self.keywords {
            settings.keywords = keywords.clone();
        }
        if let Some(ref frames) = self.frames {
            settings.frames = frames.clone();
            settings.frames.ffmpeg_path =
                shellexpand::tilde(&frames.ffmpeg_path).into_owned();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Database URL from the command line; wins over everything else.
    pub database_url: Option<String>,
}

/// Apply `DATABASE_URL`, `DIARYBATCH_CHUNK_SIZE` and `DIARYBATCH_SKIP_LIMIT`.
pub fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.is_empty()) {
        settings.database_url = Some(url);
    }
    if let Some(value) = lookup("DIARYBATCH_CHUNK_SIZE") {
        settings.chunk_size = parse_env("DIARYBATCH_CHUNK_SIZE", value)?;
    }
    if let Some(value) = lookup("DIARYBATCH_SKIP_LIMIT") {
        settings.skip_limit = parse_env("DIARYBATCH_SKIP_LIMIT", value)?;
    }
    Ok(())
}

fn parse_env(name: &'static str, value: String) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

/// Load settings from config file, environment and command line, in
/// increasing priority.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;

    if let Some(url) = options.database_url {
        settings.database_url = Some(url);
    }

    Ok((settings, config))
}
