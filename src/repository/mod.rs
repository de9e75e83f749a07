//! Persistence layer: SQLite via Diesel, schema managed by cetane.

mod diesel_context;
mod diesel_diary;
mod diesel_media_file;
mod diesel_models;
mod diesel_record;
mod migrations;
mod pool;

pub use diesel_context::DieselDbContext;
pub use diesel_diary::DieselDiaryRepository;
pub use diesel_media_file::DieselMediaFileRepository;
pub use diesel_record::DieselRecordRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, DieselError, SqliteConn};
