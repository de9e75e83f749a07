//! Chunk step: the read, transform, skip, commit loop.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{
    BatchError, ItemError, ItemProcessor, ItemReader, ItemWriter, SkipPolicy, StepEvent,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Failed { cause: String },
}

/// Outcome and counters of one step run.
#[derive(Debug, Clone)]
pub struct StepExecution {
    pub step_name: String,
    pub status: StepStatus,
    pub read_count: usize,
    pub write_count: usize,
    pub skip_count: usize,
    pub filter_count: usize,
    pub commit_count: usize,
}

impl StepExecution {
    fn started(step_name: &str) -> Self {
        Self {
            step_name: step_name.to_string(),
            status: StepStatus::Completed,
            read_count: 0,
            write_count: 0,
            skip_count: 0,
            filter_count: 0,
            commit_count: 0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.status {
            StepStatus::Completed => None,
            StepStatus::Failed { cause } => Some(cause),
        }
    }
}

/// A unit of work inside a job.
#[async_trait]
pub trait Step: Send {
    fn name(&self) -> &str;

    async fn execute(&mut self, event_tx: &mpsc::Sender<StepEvent>) -> StepExecution;
}

pub struct ChunkStep<R, P, W> {
    name: String,
    reader: R,
    processor: P,
    writer: W,
    chunk_size: usize,
    skip_policy: SkipPolicy,
    item_timeout: Option<Duration>,
}

impl<R, P, W> ChunkStep<R, P, W>
where
    R: ItemReader,
    P: ItemProcessor<Input = R::Item>,
    W: ItemWriter<Item = P::Output>,
{
    pub fn new(name: impl Into<String>, reader: R, processor: P, writer: W) -> Self {
        Self {
            name: name.into(),
            reader,
            processor,
            writer,
            chunk_size: 10,
            skip_policy: SkipPolicy::never(),
            item_timeout: None,
        }
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn skip_policy(mut self, skip_policy: SkipPolicy) -> Self {
        self.skip_policy = skip_policy;
        self
    }

    pub fn item_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.item_timeout = timeout;
        self
    }

    /// Drain the reader. On error the in-flight chunk is dropped uncommitted.
    async fn drain(
        &mut self,
        execution: &mut StepExecution,
        event_tx: &mpsc::Sender<StepEvent>,
    ) -> Result<(), BatchError> {
        let Self {
            name,
            reader,
            processor,
            writer,
            chunk_size,
            skip_policy,
            item_timeout,
        } = self;
        let mut chunk: Vec<P::Output> = Vec::with_capacity(*chunk_size);

        while let Some(item) = reader.read().await? {
            execution.read_count += 1;

            match process_one(processor, *item_timeout, item).await {
                Ok(Some(output)) => chunk.push(output),
                Ok(None) => execution.filter_count += 1,
                Err(err) if skip_policy.should_skip(&err, execution.skip_count) => {
                    execution.skip_count += 1;
                    warn!(
                        step = %name,
                        skipped = execution.skip_count,
                        "Skipping item: {}",
                        err
                    );
                    let _ = event_tx
                        .send(StepEvent::ItemSkipped {
                            step: name.clone(),
                            reason: err.to_string(),
                            skip_count: execution.skip_count,
                        })
                        .await;
                }
                // With no skip budget the item's own failure is the cause
                Err(err) if err.is_skippable() && skip_policy.skip_limit() > 0 => {
                    return Err(BatchError::SkipLimitExceeded {
                        limit: skip_policy.skip_limit(),
                        cause: err,
                    });
                }
                Err(err) => return Err(BatchError::Item(err)),
            }

            if chunk.len() >= *chunk_size {
                commit(name, writer, &mut chunk, execution, event_tx).await?;
            }
        }

        if !chunk.is_empty() {
            commit(name, writer, &mut chunk, execution, event_tx).await?;
        }
        Ok(())
    }
}

async fn process_one<P: ItemProcessor>(
    processor: &P,
    item_timeout: Option<Duration>,
    item: P::Input,
) -> Result<Option<P::Output>, ItemError> {
    match item_timeout {
        Some(limit) => tokio::time::timeout(limit, processor.process(item))
            .await
            .unwrap_or_else(|_| {
                Err(ItemError::skippable(format!(
                    "processing timed out after {}s",
                    limit.as_secs_f64()
                )))
            }),
        None => processor.process(item).await,
    }
}

async fn commit<W: ItemWriter>(
    name: &str,
    writer: &W,
    chunk: &mut Vec<W::Item>,
    execution: &mut StepExecution,
    event_tx: &mpsc::Sender<StepEvent>,
) -> Result<(), BatchError> {
    let items = std::mem::take(chunk);
    let size = items.len();

    writer.write(items).await?;

    execution.write_count += size;
    execution.commit_count += 1;
    debug!(step = %name, items = size, "Committed chunk");
    let _ = event_tx
        .send(StepEvent::ChunkCommitted {
            step: name.to_string(),
            items: size,
            total_written: execution.write_count,
        })
        .await;
    Ok(())
}

#[async_trait]
impl<R, P, W> Step for ChunkStep<R, P, W>
where
    R: ItemReader,
    P: ItemProcessor<Input = R::Item>,
    W: ItemWriter<Item = P::Output>,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&mut self, event_tx: &mpsc::Sender<StepEvent>) -> StepExecution {
        let mut execution = StepExecution::started(&self.name);
        info!(step = %self.name, chunk_size = self.chunk_size, "Step started");
        let _ = event_tx
            .send(StepEvent::StepStarted {
                step: self.name.clone(),
            })
            .await;

        match self.drain(&mut execution, event_tx).await {
            Ok(()) => {
                info!(
                    step = %self.name,
                    read = execution.read_count,
                    written = execution.write_count,
                    skipped = execution.skip_count,
                    filtered = execution.filter_count,
                    "Step completed"
                );
                let _ = event_tx
                    .send(StepEvent::StepCompleted {
                        step: self.name.clone(),
                        read: execution.read_count,
                        written: execution.write_count,
                        skipped: execution.skip_count,
                        filtered: execution.filter_count,
                    })
                    .await;
            }
            Err(e) => {
                error!(step = %self.name, "Step failed: {}", e);
                let cause = e.to_string();
                let _ = event_tx
                    .send(StepEvent::StepFailed {
                        step: self.name.clone(),
                        cause: cause.clone(),
                    })
                    .await;
                execution.status = StepStatus::Failed { cause };
            }
        }

        execution
    }
}
