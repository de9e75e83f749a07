//! Diesel-based media file repository for SQLite.

use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::diesel_models::{MediaFileRecord, NewMediaFile};
use super::pool::{DbPool, DieselError};
use crate::models::MediaFile;
use crate::schema::media_file;

#[derive(Clone)]
pub struct DieselMediaFileRepository {
    pool: DbPool,
}

impl DieselMediaFileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> Result<Option<MediaFile>, DieselError> {
        let mut conn = self.pool.get().await?;

        media_file::table
            .find(id)
            .select(MediaFileRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(MediaFile::from))
    }

    pub async fn insert(&self, file: &MediaFile) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(media_file::table)
            .values(NewMediaFile {
                media_file_id: &file.id,
                media_type_id: &file.media_type,
                media_file_blocked: file.blocked,
                media_file_checked: file.checked,
            })
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Next page of unchecked files ordered by id, strictly after `after`.
    pub async fn fetch_unchecked(
        &self,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MediaFile>, DieselError> {
        let mut conn = self.pool.get().await?;

        let mut query = media_file::table
            .filter(media_file::media_file_checked.eq(false))
            .select(MediaFileRecord::as_select())
            .into_boxed();
        if let Some(after) = after {
            query = query.filter(media_file::media_file_id.gt(after));
        }

        let records: Vec<MediaFileRecord> = query
            .order(media_file::media_file_id.asc())
            .limit(limit as i64)
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(MediaFile::from).collect())
    }

    pub async fn count_unchecked(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        let count: i64 = media_file::table
            .filter(media_file::media_file_checked.eq(false))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count as u64)
    }

    /// Persist moderation verdicts for a whole chunk in one transaction.
    pub async fn update_verdicts(&self, files: &[MediaFile]) -> Result<usize, DieselError> {
        if files.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                let mut updated = 0;
                for file in files {
                    updated += diesel::update(media_file::table.find(file.id.as_str()))
                        .set((
                            media_file::media_file_blocked.eq(file.blocked),
                            media_file::media_file_checked.eq(file.checked),
                        ))
                        .execute(conn)
                        .await?;
                }
                Ok::<_, DieselError>(updated)
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::migrated_pool;

    #[tokio::test]
    async fn test_fetch_unchecked_pages_by_id() {
        let (pool, _dir) = migrated_pool().await;
        let repo = DieselMediaFileRepository::new(pool);

        for id in ["c", "a", "d", "b"] {
            repo.insert(&MediaFile::new(id, "image")).await.unwrap();
        }
        let mut done = MediaFile::new("aa", "video");
        done.checked = true;
        repo.insert(&done).await.unwrap();

        let first = repo.fetch_unchecked(None, 2).await.unwrap();
        let ids: Vec<_> = first.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let second = repo.fetch_unchecked(Some("b"), 2).await.unwrap();
        let ids: Vec<_> = second.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);

        assert!(repo.fetch_unchecked(Some("d"), 2).await.unwrap().is_empty());
        assert_eq!(repo.count_unchecked().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_update_verdicts() {
        let (pool, _dir) = migrated_pool().await;
        let repo = DieselMediaFileRepository::new(pool);

        repo.insert(&MediaFile::new("m1", "image")).await.unwrap();
        repo.insert(&MediaFile::new("m2", "video")).await.unwrap();

        let mut m1 = MediaFile::new("m1", "image");
        m1.blocked = true;
        m1.checked = true;
        let mut m2 = MediaFile::new("m2", "video");
        m2.checked = true;

        let updated = repo.update_verdicts(&[m1, m2]).await.unwrap();
        assert_eq!(updated, 2);

        let stored = repo.get("m1").await.unwrap().unwrap();
        assert!(stored.blocked && stored.checked);
        let stored = repo.get("m2").await.unwrap().unwrap();
        assert!(!stored.blocked && stored.checked);
        assert_eq!(repo.count_unchecked().await.unwrap(), 0);
    }
}
