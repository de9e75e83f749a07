//! Content moderation job.
//!
//! Reads media files that have not been checked yet, classifies a
//! representative still of each image or video and stores the verdict.
//! Originals live under `<base>/image/<id>` and `<base>/video/<id>`; frames
//! extracted from videos go to `<base>/thumbnail/<id>/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::batch::{
    BatchError, ChunkStep, CursorReader, ItemError, ItemProcessor, ItemWriter, Job, PageSource,
    SkipPolicy,
};
use crate::config::Settings;
use crate::models::{MediaFile, MediaType};
use crate::repository::{DieselDbContext, DieselMediaFileRepository};
use crate::services::frames::{FrameExtractor, FrameSelection};
use crate::services::moderation::{classify, ModerationClassifier};

pub const JOB_NAME: &str = "check-content";
pub const STEP_NAME: &str = "check-content";

const THUMBNAIL_DIR: &str = "thumbnail";

/// Unchecked media files, paged by id.
pub struct UncheckedMediaSource {
    repo: DieselMediaFileRepository,
}

impl UncheckedMediaSource {
    pub fn new(repo: DieselMediaFileRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl PageSource for UncheckedMediaSource {
    type Item = MediaFile;
    type Key = String;

    async fn fetch_page(
        &self,
        after: Option<&String>,
        limit: usize,
    ) -> Result<Vec<MediaFile>, BatchError> {
        Ok(self
            .repo
            .fetch_unchecked(after.map(String::as_str), limit)
            .await?)
    }

    fn key_of(&self, item: &MediaFile) -> String {
        item.id.clone()
    }
}

pub struct ModerationProcessor {
    base_dir: PathBuf,
    frames: Arc<dyn FrameExtractor>,
    classifier: Arc<dyn ModerationClassifier>,
    selection: FrameSelection,
}

impl ModerationProcessor {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        frames: Arc<dyn FrameExtractor>,
        classifier: Arc<dyn ModerationClassifier>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            frames,
            classifier,
            selection: FrameSelection::default(),
        }
    }

    pub fn with_selection(mut self, selection: FrameSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Location of the original upload, or `None` for types that are not
    /// moderated.
    pub fn source_path(&self, file: &MediaFile) -> Option<PathBuf> {
        file.kind()
            .source_dir()
            .map(|dir| self.base_dir.join(dir).join(&file.id))
    }

    pub fn thumbnail_dir(&self, media_id: &str) -> PathBuf {
        self.base_dir.join(THUMBNAIL_DIR).join(media_id)
    }

    async fn video_still(&self, media_id: &str, source: &Path) -> Result<PathBuf, ItemError> {
        let out_dir = self.thumbnail_dir(media_id);
        tokio::fs::create_dir_all(&out_dir).await.map_err(|e| {
            ItemError::fatal(format!(
                "Failed to create thumbnail directory {}: {}",
                out_dir.display(),
                e
            ))
        })?;

        let frames = self.frames.extract(source, &out_dir).await?;
        let still = self.selection.select(&frames).cloned().ok_or_else(|| {
            ItemError::skippable(format!("No frames extracted from {}", source.display()))
        })?;

        debug!(
            media_id,
            frames = frames.len(),
            still = %still.display(),
            "Selected representative still"
        );
        Ok(still)
    }
}

#[async_trait]
impl ItemProcessor for ModerationProcessor {
    type Input = MediaFile;
    type Output = MediaFile;

    async fn process(&self, mut item: MediaFile) -> Result<Option<MediaFile>, ItemError> {
        let Some(source) = self.source_path(&item) else {
            debug!(media_id = %item.id, media_type = %item.media_type, "Not moderated");
            return Ok(Some(item));
        };

        let still = match item.kind() {
            MediaType::Video => self.video_still(&item.id, &source).await?,
            _ => source,
        };

        let verdict = classify(self.classifier.as_ref(), &still).await;
        item.blocked = verdict.is_blocked();
        item.checked = true;
        debug!(media_id = %item.id, blocked = item.blocked, "Moderated");

        Ok(Some(item))
    }
}

/// Stores `blocked`/`checked` for every file of a chunk.
pub struct MediaVerdictWriter {
    repo: DieselMediaFileRepository,
}

impl MediaVerdictWriter {
    pub fn new(repo: DieselMediaFileRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ItemWriter for MediaVerdictWriter {
    type Item = MediaFile;

    async fn write(&self, items: Vec<MediaFile>) -> Result<(), BatchError> {
        self.repo.update_verdicts(&items).await?;
        Ok(())
    }
}

/// Assemble the moderation job for the content under `base_dir`.
pub fn build_job(
    ctx: &DieselDbContext,
    settings: &Settings,
    base_dir: impl Into<PathBuf>,
    frames: Arc<dyn FrameExtractor>,
    classifier: Arc<dyn ModerationClassifier>,
) -> Job {
    let reader = CursorReader::new(
        UncheckedMediaSource::new(ctx.media_files()),
        settings.chunk_size,
    );
    let processor = ModerationProcessor::new(base_dir, frames, classifier)
        .with_selection(settings.frames.selection);
    let writer = MediaVerdictWriter::new(ctx.media_files());

    let step = ChunkStep::new(STEP_NAME, reader, processor, writer)
        .chunk_size(settings.chunk_size)
        .skip_policy(SkipPolicy::limit(settings.skip_limit))
        .item_timeout(settings.item_timeout());

    Job::new(JOB_NAME).step(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::frames::FrameError;
    use crate::services::ServiceError;

    struct NoFrames;

    #[async_trait]
    impl FrameExtractor for NoFrames {
        async fn extract(&self, _: &Path, _: &Path) -> Result<Vec<PathBuf>, FrameError> {
            Ok(Vec::new())
        }
    }

    struct Blocks;

    #[async_trait]
    impl ModerationClassifier for Blocks {
        async fn detect(&self, _: &Path) -> Result<bool, ServiceError> {
            Ok(true)
        }
    }

    fn processor(base: &Path) -> ModerationProcessor {
        ModerationProcessor::new(base, Arc::new(NoFrames), Arc::new(Blocks))
    }

    #[test]
    fn test_source_paths() {
        let p = processor(Path::new("/srv/content"));

        assert_eq!(
            p.source_path(&MediaFile::new("abc", "IMAGE")),
            Some(PathBuf::from("/srv/content/image/abc"))
        );
        assert_eq!(
            p.source_path(&MediaFile::new("abc", "video")),
            Some(PathBuf::from("/srv/content/video/abc"))
        );
        assert_eq!(p.source_path(&MediaFile::new("abc", "audio")), None);
        assert_eq!(
            p.thumbnail_dir("abc"),
            PathBuf::from("/srv/content/thumbnail/abc")
        );
    }

    #[tokio::test]
    async fn test_other_types_pass_through_untouched() {
        let p = processor(Path::new("/srv/content"));
        let mut file = MediaFile::new("a1", "audio");
        file.blocked = true;

        let out = p.process(file.clone()).await.unwrap().unwrap();
        assert_eq!(out, file);
    }

    #[tokio::test]
    async fn test_video_without_frames_is_skippable() {
        let dir = tempfile::tempdir().unwrap();
        let p = processor(dir.path());

        let err = p.process(MediaFile::new("v1", "video")).await.unwrap_err();

        assert!(err.is_skippable());
        assert!(dir.path().join("thumbnail/v1").is_dir());
    }

    #[tokio::test]
    async fn test_image_is_classified_and_checked() {
        let p = processor(Path::new("/srv/content"));

        let out = p
            .process(MediaFile::new("i1", "Image"))
            .await
            .unwrap()
            .unwrap();

        assert!(out.blocked);
        assert!(out.checked);
    }
}
