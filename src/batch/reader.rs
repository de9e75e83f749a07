//! Keyset-paginated reader.
//!
//! The cursor remembers the key of the last item handed out and fetches the
//! next page strictly after it, so rows updated by earlier chunks (for
//! example `checked = true`) never shift the window.

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{BatchError, ItemReader};

/// One page of rows ordered by a stable key.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send + 'static;
    type Key: Clone + Send + Sync + 'static;

    /// Fetch up to `limit` items whose key is strictly greater than `after`.
    async fn fetch_page(
        &self,
        after: Option<&Self::Key>,
        limit: usize,
    ) -> Result<Vec<Self::Item>, BatchError>;

    fn key_of(&self, item: &Self::Item) -> Self::Key;
}

pub struct CursorReader<S: PageSource> {
    source: S,
    fetch_size: usize,
    buffer: VecDeque<S::Item>,
    cursor: Option<S::Key>,
    exhausted: bool,
}

impl<S: PageSource> CursorReader<S> {
    pub fn new(source: S, fetch_size: usize) -> Self {
        Self {
            source,
            fetch_size: fetch_size.max(1),
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
        }
    }

    async fn fill(&mut self) -> Result<(), BatchError> {
        let page = self
            .source
            .fetch_page(self.cursor.as_ref(), self.fetch_size)
            .await?;

        if page.len() < self.fetch_size {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.cursor = Some(self.source.key_of(last));
        }
        self.buffer.extend(page);
        Ok(())
    }
}

#[async_trait]
impl<S: PageSource> ItemReader for CursorReader<S> {
    type Item = S::Item;

    async fn read(&mut self) -> Result<Option<S::Item>, BatchError> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fill().await?;
        }
        Ok(self.buffer.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Numbers {
        rows: Vec<u32>,
        queries: AtomicUsize,
    }

    #[async_trait]
    impl PageSource for Numbers {
        type Item = u32;
        type Key = u32;

        async fn fetch_page(
            &self,
            after: Option<&u32>,
            limit: usize,
        ) -> Result<Vec<u32>, BatchError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .iter()
                .copied()
                .filter(|n| after.map_or(true, |a| n > a))
                .take(limit)
                .collect())
        }

        fn key_of(&self, item: &u32) -> u32 {
            *item
        }
    }

    #[tokio::test]
    async fn test_reads_all_pages_in_order() {
        let source = Numbers {
            rows: (1..=7).collect(),
            queries: AtomicUsize::new(0),
        };
        let mut reader = CursorReader::new(source, 3);

        let mut seen = Vec::new();
        while let Some(n) = reader.read().await.unwrap() {
            seen.push(n);
        }

        assert_eq!(seen, (1..=7).collect::<Vec<_>>());
        // 3 + 3 + 1, the short page ends the cursor
        assert_eq!(reader.source.queries.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_one_empty_page() {
        let source = Numbers {
            rows: (1..=4).collect(),
            queries: AtomicUsize::new(0),
        };
        let mut reader = CursorReader::new(source, 2);

        let mut count = 0;
        while reader.read().await.unwrap().is_some() {
            count += 1;
        }

        assert_eq!(count, 4);
        assert_eq!(reader.source.queries.load(Ordering::SeqCst), 3);
        assert!(reader.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_source() {
        let source = Numbers {
            rows: vec![],
            queries: AtomicUsize::new(0),
        };
        let mut reader = CursorReader::new(source, 10);
        assert!(reader.read().await.unwrap().is_none());
    }
}
