//! Monthly keyword job.
//!
//! Step `get-keywords` extracts keywords from every record created in the
//! month of the execution date. Step `count-keywords` then re-reads that
//! month's record/keyword join and counts each occurrence into the member's
//! diary for the month. Neither step tolerates item failures.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use crate::batch::{
    flatten, BatchError, ChunkStep, CursorReader, ItemError, ItemProcessor, ItemWriter, Job,
    PageSource, PassThrough, SkipPolicy,
};
use crate::config::Settings;
use crate::models::{Keyword, MonthWindow, Record, RecordKeyword, RecordKeywordExtended};
use crate::repository::{DieselDbContext, DieselDiaryRepository, DieselRecordRepository};
use crate::services::keywords::KeywordExtractor;

pub const JOB_NAME: &str = "extract-keyword";
pub const GET_KEYWORDS_STEP: &str = "get-keywords";
pub const COUNT_KEYWORDS_STEP: &str = "count-keywords";

/// Records created inside the window, paged by id.
pub struct MonthRecordSource {
    repo: DieselRecordRepository,
    window: MonthWindow,
}

impl MonthRecordSource {
    pub fn new(repo: DieselRecordRepository, window: MonthWindow) -> Self {
        Self { repo, window }
    }
}

#[async_trait]
impl PageSource for MonthRecordSource {
    type Item = Record;
    type Key = i32;

    async fn fetch_page(&self, after: Option<&i32>, limit: usize) -> Result<Vec<Record>, BatchError> {
        Ok(self
            .repo
            .fetch_in_window(&self.window, after.copied(), limit)
            .await?)
    }

    fn key_of(&self, item: &Record) -> i32 {
        item.id
    }
}

/// Keywords of the window's records joined with owner and month, paged by
/// keyword row id.
pub struct KeywordOccurrenceSource {
    repo: DieselRecordRepository,
    window: MonthWindow,
}

impl KeywordOccurrenceSource {
    pub fn new(repo: DieselRecordRepository, window: MonthWindow) -> Self {
        Self { repo, window }
    }
}

#[async_trait]
impl PageSource for KeywordOccurrenceSource {
    type Item = RecordKeywordExtended;
    type Key = i32;

    async fn fetch_page(
        &self,
        after: Option<&i32>,
        limit: usize,
    ) -> Result<Vec<RecordKeywordExtended>, BatchError> {
        Ok(self
            .repo
            .fetch_keyword_occurrences(&self.window, after.copied(), limit)
            .await?)
    }

    fn key_of(&self, item: &RecordKeywordExtended) -> i32 {
        item.record_keyword_id
    }
}

/// Turns one record into its (possibly empty) list of keywords.
pub struct KeywordProcessor {
    extractor: Arc<dyn KeywordExtractor>,
    min_score: f32,
}

impl KeywordProcessor {
    pub fn new(extractor: Arc<dyn KeywordExtractor>, min_score: f32) -> Self {
        Self {
            extractor,
            min_score,
        }
    }
}

/// Trim, drop blanks and low scores, and collapse repeated words while
/// keeping the extractor's order.
pub fn select_keywords(record_id: i32, keywords: Vec<Keyword>, min_score: f32) -> Vec<RecordKeyword> {
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .filter(|kw| kw.score >= min_score)
        .filter_map(|kw| {
            let word = kw.word.trim();
            (!word.is_empty() && seen.insert(word.to_string()))
                .then(|| RecordKeyword::new(record_id, word))
        })
        .collect()
}

#[async_trait]
impl ItemProcessor for KeywordProcessor {
    type Input = Record;
    type Output = Vec<RecordKeyword>;

    async fn process(&self, record: Record) -> Result<Option<Vec<RecordKeyword>>, ItemError> {
        if record.content.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }

        let keywords = self.extractor.extract(&record).await.map_err(|e| {
            ItemError::fatal(format!(
                "Keyword extraction failed for record {}: {}",
                record.id, e
            ))
        })?;

        let selected = select_keywords(record.id, keywords, self.min_score);
        debug!(record_id = record.id, keywords = selected.len(), "Extracted keywords");
        Ok(Some(selected))
    }
}

/// Flattens a chunk of keyword lists and inserts the pairs, ignoring ones
/// that already exist.
pub struct KeywordListWriter {
    repo: DieselRecordRepository,
}

impl KeywordListWriter {
    pub fn new(repo: DieselRecordRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ItemWriter for KeywordListWriter {
    type Item = Vec<RecordKeyword>;

    async fn write(&self, items: Vec<Vec<RecordKeyword>>) -> Result<(), BatchError> {
        let batch = flatten(items);
        let inserted = self.repo.insert_keywords(&batch).await?;
        debug!(pairs = batch.len(), inserted, "Stored record keywords");
        Ok(())
    }
}

/// Counts every occurrence into its member's monthly diary.
///
/// Counting is not idempotent: running the step again for a month that was
/// already counted, even partially, adds the same occurrences a second time.
pub struct DiaryFrequencyWriter {
    repo: DieselDiaryRepository,
}

impl DiaryFrequencyWriter {
    pub fn new(repo: DieselDiaryRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ItemWriter for DiaryFrequencyWriter {
    type Item = RecordKeywordExtended;

    async fn write(&self, items: Vec<RecordKeywordExtended>) -> Result<(), BatchError> {
        self.repo.record_occurrences(&items).await?;
        Ok(())
    }
}

/// Assemble the keyword job for the month containing `execution_date`.
pub fn build_job(
    ctx: &DieselDbContext,
    settings: &Settings,
    execution_date: NaiveDate,
    extractor: Arc<dyn KeywordExtractor>,
) -> Job {
    let window = MonthWindow::containing(execution_date);
    debug!(%window, "Keyword window");

    let get_keywords = ChunkStep::new(
        GET_KEYWORDS_STEP,
        CursorReader::new(
            MonthRecordSource::new(ctx.records(), window),
            settings.chunk_size,
        ),
        KeywordProcessor::new(extractor, settings.keywords.min_score),
        KeywordListWriter::new(ctx.records()),
    )
    .chunk_size(settings.chunk_size)
    .skip_policy(SkipPolicy::never())
    .item_timeout(settings.item_timeout());

    let count_keywords = ChunkStep::new(
        COUNT_KEYWORDS_STEP,
        CursorReader::new(
            KeywordOccurrenceSource::new(ctx.records(), window),
            settings.chunk_size,
        ),
        PassThrough::<RecordKeywordExtended>::new(),
        DiaryFrequencyWriter::new(ctx.diaries()),
    )
    .chunk_size(settings.chunk_size)
    .skip_policy(SkipPolicy::never());

    Job::new(JOB_NAME).step(get_keywords).step(count_keywords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExtractor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl KeywordExtractor for CountingExtractor {
        async fn extract(&self, _record: &Record) -> Result<Vec<Keyword>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Keyword::new("walk", 0.9)])
        }
    }

    fn record(content: &str) -> Record {
        Record {
            id: 7,
            member_id: "m1".to_string(),
            content: content.to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 3, 3)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_select_keywords_normalizes() {
        let keywords = vec![
            Keyword::new("  park ", 0.9),
            Keyword::new("park", 0.8),
            Keyword::new("", 0.99),
            Keyword::new("noise", 0.1),
            Keyword::new("coffee", 0.5),
        ];

        let selected = select_keywords(3, keywords, 0.3);

        assert_eq!(
            selected,
            vec![RecordKeyword::new(3, "park"), RecordKeyword::new(3, "coffee")]
        );
    }

    #[tokio::test]
    async fn test_blank_record_skips_extractor() {
        let extractor = Arc::new(CountingExtractor {
            calls: AtomicUsize::new(0),
        });
        let processor = KeywordProcessor::new(extractor.clone(), 0.0);

        let out = processor.process(record("   ")).await.unwrap();

        assert_eq!(out, Some(Vec::new()));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_keywords_bound_to_record() {
        let extractor = Arc::new(CountingExtractor {
            calls: AtomicUsize::new(0),
        });
        let processor = KeywordProcessor::new(extractor, 0.0);

        let out = processor.process(record("went for a walk")).await.unwrap();

        assert_eq!(out, Some(vec![RecordKeyword::new(7, "walk")]));
    }
}
