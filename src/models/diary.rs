//! Per-member monthly keyword summaries.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diary {
    pub id: i32,
    pub member_id: String,
    pub year: i32,
    pub month: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiaryKeyword {
    pub diary_id: i32,
    pub keyword: String,
    /// Number of occurrences counted so far, always at least 1.
    pub freq: i32,
}
