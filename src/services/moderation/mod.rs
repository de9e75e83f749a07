//! Image moderation.

mod rekognition;

pub use rekognition::RekognitionClassifier;

use std::path::Path;

use async_trait::async_trait;
use tracing::warn;

use super::ServiceError;

#[async_trait]
pub trait ModerationClassifier: Send + Sync {
    /// `true` when at least one moderation label is detected at or above the
    /// classifier's confidence threshold.
    async fn detect(&self, still: &Path) -> Result<bool, ServiceError>;
}

/// How a classification attempt resolved.
#[derive(Debug)]
pub enum Verdict {
    Blocked,
    Allowed,
    /// The classifier failed; the item is treated as allowed.
    FailedOpen(ServiceError),
}

impl Verdict {
    pub fn from_detection(result: Result<bool, ServiceError>) -> Self {
        match result {
            Ok(true) => Verdict::Blocked,
            Ok(false) => Verdict::Allowed,
            Err(e) => Verdict::FailedOpen(e),
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Blocked)
    }
}

/// Classify `still`, resolving classifier failures as not blocked.
pub async fn classify(classifier: &dyn ModerationClassifier, still: &Path) -> Verdict {
    let verdict = Verdict::from_detection(classifier.detect(still).await);
    if let Verdict::FailedOpen(e) = &verdict {
        warn!(still = %still.display(), "Moderation failed, treating as not blocked: {}", e);
    }
    verdict
}
