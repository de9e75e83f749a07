//! Still-frame extraction from video.
//!
//! Frames are written as `<prefix><n>.jpg` with `n` counting up from 1 in
//! extraction order, one every `interval_secs` seconds of video.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::batch::{ErrorKind, ItemError};
use crate::config::FrameSettings;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Frame extraction failed ({status}): {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("Failed to list frames in {}: {source}", dir.display())]
    Io {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FrameError {
    /// A missing or unrunnable extractor affects every item; anything else is
    /// specific to one video.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::Spawn { .. } => ErrorKind::Fatal,
            FrameError::Failed { .. } | FrameError::Io { .. } => ErrorKind::Skippable,
        }
    }
}

impl From<FrameError> for ItemError {
    fn from(e: FrameError) -> Self {
        ItemError::new(e.kind(), e.to_string())
    }
}

/// Which extracted frame represents the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSelection {
    First,
    /// `frames[len / 2]`
    #[default]
    Middle,
    Last,
}

impl FrameSelection {
    pub fn select<'a>(&self, frames: &'a [PathBuf]) -> Option<&'a PathBuf> {
        match self {
            FrameSelection::First => frames.first(),
            FrameSelection::Middle => frames.get(frames.len() / 2),
            FrameSelection::Last => frames.last(),
        }
    }
}

#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Extract frames of `source` into `out_dir`, returned in extraction order.
    async fn extract(&self, source: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, FrameError>;
}

pub struct FfmpegFrameExtractor {
    ffmpeg_path: String,
    interval_secs: u32,
    quality: u8,
    file_prefix: String,
}

impl FfmpegFrameExtractor {
    pub fn new(settings: &FrameSettings) -> Self {
        Self {
            ffmpeg_path: settings.ffmpeg_path.clone(),
            interval_secs: settings.interval_secs.max(1),
            quality: settings.quality,
            file_prefix: settings.file_prefix.clone(),
        }
    }

    fn output_pattern(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(format!("{}%d.jpg", self.file_prefix))
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract(&self, source: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, FrameError> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y", "-i"])
            .arg(source)
            .arg("-vf")
            .arg(format!("fps=1/{}", self.interval_secs))
            .arg("-q:v")
            .arg(self.quality.to_string())
            .arg(self.output_pattern(out_dir))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!("Running {:?}", cmd);
        let output = cmd.output().await.map_err(|source| FrameError::Spawn {
            program: self.ffmpeg_path.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(FrameError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        list_frames(out_dir, &self.file_prefix)
    }
}

/// Frames named `<prefix><n>.jpg` in `dir`, ordered by `n`.
pub fn list_frames(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, FrameError> {
    let io_err = |source| FrameError::Io {
        dir: dir.to_path_buf(),
        source,
    };

    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let sequence = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(prefix))
            .and_then(|n| n.strip_suffix(".jpg"))
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(sequence) = sequence {
            frames.push((sequence, path));
        }
    }

    frames.sort_by_key(|(sequence, _)| *sequence);
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}
