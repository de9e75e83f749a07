//! External collaborators used by the jobs.
//!
//! Each service is a trait with one production adapter, so jobs can be
//! driven by fakes in tests.

pub mod frames;
pub mod keywords;
pub mod moderation;

use std::path::PathBuf;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use thiserror::Error;

pub use frames::{FfmpegFrameExtractor, FrameError, FrameExtractor, FrameSelection};
pub use keywords::{ComprehendExtractor, KeywordExtractor};
pub use moderation::{ModerationClassifier, RekognitionClassifier};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to read {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{service} request failed: {message}")]
    Request {
        service: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn request(service: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Request {
            service,
            message: message.to_string(),
        }
    }
}

/// Shared AWS configuration for one job run. Credentials come from the
/// standard provider chain.
pub async fn aws_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
