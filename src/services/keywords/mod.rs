//! Key phrase extraction.

mod comprehend;

pub use comprehend::ComprehendExtractor;

use async_trait::async_trait;

use super::ServiceError;
use crate::models::{Keyword, Record};

#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    /// Salient phrases of the record's text with their scores. An empty list
    /// is a valid answer.
    async fn extract(&self, record: &Record) -> Result<Vec<Keyword>, ServiceError>;
}
