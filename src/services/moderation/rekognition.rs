//! AWS Rekognition moderation adapter.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::Image;
use aws_sdk_rekognition::Client;
use tracing::debug;

use super::ModerationClassifier;
use crate::config::ModerationSettings;
use crate::services::ServiceError;

/// Sends image bytes to `DetectModerationLabels`.
#[derive(Clone)]
pub struct RekognitionClassifier {
    client: Client,
    min_confidence: f32,
}

impl RekognitionClassifier {
    pub fn new(client: Client, min_confidence: f32) -> Self {
        Self {
            client,
            min_confidence,
        }
    }

    pub async fn from_settings(settings: &ModerationSettings) -> Self {
        let config = crate::services::aws_config(&settings.region).await;
        Self::new(Client::new(&config), settings.min_confidence)
    }
}

#[async_trait]
impl ModerationClassifier for RekognitionClassifier {
    async fn detect(&self, still: &Path) -> Result<bool, ServiceError> {
        let bytes = tokio::fs::read(still)
            .await
            .map_err(|source| ServiceError::Input {
                path: still.to_path_buf(),
                source,
            })?;

        let output = self
            .client
            .detect_moderation_labels()
            .image(Image::builder().bytes(Blob::new(bytes)).build())
            .min_confidence(self.min_confidence)
            .send()
            .await
            .map_err(|e| ServiceError::request("rekognition", DisplayErrorContext(&e)))?;

        let labels = output.moderation_labels();
        for label in labels {
            debug!(
                still = %still.display(),
                label = label.name().unwrap_or_default(),
                parent = label.parent_name().unwrap_or_default(),
                confidence = label.confidence().unwrap_or_default(),
                "Moderation label"
            );
        }

        Ok(!labels.is_empty())
    }
}
