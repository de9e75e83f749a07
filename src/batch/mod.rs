//! Chunk-oriented batch engine.
//!
//! A step reads items from an [`ItemReader`], transforms each one with an
//! [`ItemProcessor`], buffers the results into fixed-size chunks and hands
//! every full chunk (plus the final partial one) to an [`ItemWriter`].
//! Item failures go through a [`SkipPolicy`]; reader and writer failures end
//! the step. A [`Job`] runs steps strictly in order.

mod error;
mod event;
mod job;
mod reader;
mod skip;
mod step;

pub use error::{BatchError, ErrorKind, ItemError};
pub use event::StepEvent;
pub use job::{Job, JobResult, JobStatus};
pub use reader::{CursorReader, PageSource};
pub use skip::SkipPolicy;
pub use step::{ChunkStep, Step, StepExecution, StepStatus};

use std::marker::PhantomData;

use async_trait::async_trait;

/// Source of items for a step. `None` marks the end of input.
#[async_trait]
pub trait ItemReader: Send {
    type Item: Send + 'static;

    async fn read(&mut self) -> Result<Option<Self::Item>, BatchError>;
}

/// Per-item transformation.
///
/// `Ok(None)` filters the item out of the chunk without counting a skip.
#[async_trait]
pub trait ItemProcessor: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;

    async fn process(&self, item: Self::Input) -> Result<Option<Self::Output>, ItemError>;
}

/// Sink for one committed chunk.
///
/// Implementations must apply the whole chunk atomically.
#[async_trait]
pub trait ItemWriter: Send + Sync {
    type Item: Send + 'static;

    async fn write(&self, items: Vec<Self::Item>) -> Result<(), BatchError>;
}

/// Identity processor for steps that only move data from reader to writer.
pub struct PassThrough<T>(PhantomData<fn() -> T>);

impl<T> PassThrough<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for PassThrough<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send + 'static> ItemProcessor for PassThrough<T> {
    type Input = T;
    type Output = T;

    async fn process(&self, item: T) -> Result<Option<T>, ItemError> {
        Ok(Some(item))
    }
}

/// Flattens a chunk of per-item lists into one insertion batch.
pub fn flatten<T>(chunk: Vec<Vec<T>>) -> Vec<T> {
    chunk.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_keeps_order_and_drops_empty_lists() {
        let chunk = vec![vec![1, 2], vec![], vec![3], vec![4, 5, 6]];
        assert_eq!(flatten(chunk), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_flatten_empty_chunk() {
        let chunk: Vec<Vec<u8>> = vec![vec![], vec![]];
        assert!(flatten(chunk).is_empty());
    }

    #[tokio::test]
    async fn test_pass_through_returns_item() {
        let processor = PassThrough::<String>::new();
        let out = processor.process("kept".to_string()).await.unwrap();
        assert_eq!(out.as_deref(), Some("kept"));
    }
}
