//! The two batch jobs, assembled from the chunk engine.
//!
//! - `check-content`: moderate unchecked media files.
//! - `extract-keyword`: extract record keywords for a month, then fold them
//!   into per-member monthly diary frequencies.

pub mod check_content;
pub mod extract_keyword;
