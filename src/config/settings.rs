//! Runtime settings with their defaults.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::services::FrameSelection;

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "diarybatch.db";

pub const DEFAULT_CHUNK_SIZE: usize = 10;
pub const DEFAULT_SKIP_LIMIT: usize = 1000;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename inside `data_dir`.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
    /// Items per committed chunk, shared by both jobs.
    pub chunk_size: usize,
    /// Skippable failures tolerated by the moderation step.
    pub skip_limit: usize,
    /// Per-item processing timeout. `None` waits indefinitely.
    pub item_timeout_secs: Option<u64>,
    pub moderation: ModerationSettings,
    pub keywords: KeywordSettings,
    pub frames: FrameSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("diarybatch");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            skip_limit: DEFAULT_SKIP_LIMIT,
            item_timeout_secs: None,
            moderation: ModerationSettings::default(),
            keywords: KeywordSettings::default(),
            frames: FrameSettings::default(),
        }
    }
}

impl Settings {
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        match self.database_url {
            Some(ref url) => url.clone(),
            None => format!("sqlite:{}", self.database_path().display()),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    pub fn item_timeout(&self) -> Option<Duration> {
        self.item_timeout_secs.map(Duration::from_secs)
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory {}: {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }
}

/// Image moderation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationSettings {
    pub region: String,
    /// Minimum label confidence, in percent, for a file to be blocked.
    pub min_confidence: f32,
}

impl Default for ModerationSettings {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            min_confidence: 60.0,
        }
    }
}

/// Key phrase extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSettings {
    pub region: String,
    pub language_code: String,
    /// Phrases scoring below this are dropped.
    pub min_score: f32,
}

impl Default for KeywordSettings {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            language_code: "ko".to_string(),
            min_score: 0.0,
        }
    }
}

/// Still-frame extraction from video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    pub ffmpeg_path: String,
    /// Seconds of video between extracted frames.
    pub interval_secs: u32,
    /// ffmpeg `-q:v` value; 31 is the smallest JPEG.
    pub quality: u8,
    pub file_prefix: String,
    pub selection: FrameSelection,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            interval_secs: 3,
            quality: 31,
            file_prefix: "EXTRACT_".to_string(),
            selection: FrameSelection::Middle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::with_data_dir(PathBuf::from("/var/lib/diarybatch"));

        assert_eq!(settings.chunk_size, 10);
        assert_eq!(settings.skip_limit, 1000);
        assert!(settings.item_timeout().is_none());
        assert_eq!(settings.moderation.region, "us-west-2");
        assert_eq!(settings.moderation.min_confidence, 60.0);
        assert_eq!(settings.frames.interval_secs, 3);
        assert_eq!(settings.frames.selection, FrameSelection::Middle);
        assert_eq!(
            settings.database_url(),
            "sqlite:/var/lib/diarybatch/diarybatch.db"
        );
    }

    #[test]
    fn test_explicit_database_url_wins() {
        let mut settings = Settings::default();
        settings.database_url = Some("sqlite:/tmp/other.db".to_string());
        assert_eq!(settings.database_url(), "sqlite:/tmp/other.db");
    }
}
