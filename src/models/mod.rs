//! Domain models for diarybatch.

mod diary;
mod media_file;
mod record;
mod window;

pub use diary::{Diary, DiaryKeyword};
pub use media_file::{MediaFile, MediaType};
pub use record::{Keyword, Record, RecordKeyword, RecordKeywordExtended};
pub use window::MonthWindow;
