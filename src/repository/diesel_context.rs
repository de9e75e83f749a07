//! Database context tying the connection factory to the repositories.

use std::path::Path;

use super::diesel_diary::DieselDiaryRepository;
use super::diesel_media_file::DieselMediaFileRepository;
use super::diesel_record::DieselRecordRepository;
use super::pool::{DbPool, DieselError};

/// Create one context per command, then hand repositories to the jobs.
///
/// # Example
/// ```ignore
/// let ctx = DieselDbContext::from_url(&settings.database_url());
/// ctx.init_schema().await?;
/// let pending = ctx.media_files().count_unchecked().await?;
/// ```
#[derive(Clone)]
pub struct DieselDbContext {
    pool: DbPool,
}

impl DieselDbContext {
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: DbPool::new(database_url),
        }
    }

    pub fn from_path(db_path: &Path) -> Self {
        Self {
            pool: DbPool::from_path(db_path),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Run pending migrations.
    pub async fn init_schema(&self) -> Result<Vec<String>, DieselError> {
        super::migrations::run_migrations(self.pool.database_url()).await
    }

    pub fn media_files(&self) -> DieselMediaFileRepository {
        DieselMediaFileRepository::new(self.pool.clone())
    }

    pub fn records(&self) -> DieselRecordRepository {
        DieselRecordRepository::new(self.pool.clone())
    }

    pub fn diaries(&self) -> DieselDiaryRepository {
        DieselDiaryRepository::new(self.pool.clone())
    }
}
