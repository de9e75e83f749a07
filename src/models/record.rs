//! Diary records and the keywords extracted from them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A member's free-text diary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i32,
    pub member_id: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

/// Keyword as reported by the extractor, before it is bound to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub score: f32,
}

impl Keyword {
    pub fn new(word: impl Into<String>, score: f32) -> Self {
        Self {
            word: word.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKeyword {
    pub record_id: i32,
    pub keyword: String,
}

impl RecordKeyword {
    pub fn new(record_id: i32, keyword: impl Into<String>) -> Self {
        Self {
            record_id,
            keyword: keyword.into(),
        }
    }
}

/// One keyword occurrence joined with its record's owner and month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeywordExtended {
    /// Cursor key for paging through the join.
    pub record_keyword_id: i32,
    pub diary_year: i32,
    pub diary_month: i32,
    pub member_id: String,
    pub keyword: String,
}
