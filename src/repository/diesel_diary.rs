//! Diesel-based diary repository for SQLite.
//!
//! Keyword frequencies are maintained with a two-phase write per occurrence:
//! `ensure_diary` creates the member's month row if needed, then
//! `bump_keyword_frequency` resolves that row's id and upserts the keyword
//! count. Both phases of every occurrence in a chunk share one transaction.

use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::diesel_models::{DiaryKeywordRecord, DiaryRecord, NewDiary, NewDiaryKeyword};
use super::pool::{DbPool, DieselError, SqliteConn};
use crate::models::{Diary, DiaryKeyword, RecordKeywordExtended};
use crate::schema::{diary, diary_keyword};

#[derive(Clone)]
pub struct DieselDiaryRepository {
    pool: DbPool,
}

impl DieselDiaryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Count every occurrence once against its member's monthly diary.
    pub async fn record_occurrences(
        &self,
        occurrences: &[RecordKeywordExtended],
    ) -> Result<usize, DieselError> {
        if occurrences.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                for occ in occurrences {
                    ensure_diary(conn, &occ.member_id, occ.diary_year, occ.diary_month).await?;
                    bump_keyword_frequency(
                        conn,
                        &occ.member_id,
                        occ.diary_year,
                        occ.diary_month,
                        &occ.keyword,
                    )
                    .await?;
                }
                Ok::<_, DieselError>(occurrences.len())
            })
        })
        .await
    }

    pub async fn find_diary(
        &self,
        member_id: &str,
        year: i32,
        month: i32,
    ) -> Result<Option<Diary>, DieselError> {
        let mut conn = self.pool.get().await?;

        diary::table
            .filter(diary::member_id.eq(member_id))
            .filter(diary::diary_year.eq(year))
            .filter(diary::diary_month.eq(month))
            .select(DiaryRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Diary::from))
    }

    /// Keywords of one diary, most frequent first.
    pub async fn diary_keywords(&self, diary_id: i32) -> Result<Vec<DiaryKeyword>, DieselError> {
        let mut conn = self.pool.get().await?;

        let records: Vec<DiaryKeywordRecord> = diary_keyword::table
            .filter(diary_keyword::diary_id.eq(diary_id))
            .order((
                diary_keyword::diary_freq.desc(),
                diary_keyword::keyword.asc(),
            ))
            .select(DiaryKeywordRecord::as_select())
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(DiaryKeyword::from).collect())
    }

    pub async fn count(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        let count: i64 = diary::table.select(count_star()).first(&mut conn).await?;
        Ok(count as u64)
    }
}

/// Phase one: insert the diary row unless it already exists.
async fn ensure_diary(
    conn: &mut SqliteConn,
    member_id: &str,
    year: i32,
    month: i32,
) -> Result<(), DieselError> {
    diesel::insert_or_ignore_into(diary::table)
        .values(NewDiary {
            member_id,
            diary_year: year,
            diary_month: month,
        })
        .execute(conn)
        .await?;
    Ok(())
}

/// Phase two: look up the diary id and add one to the keyword's count,
/// starting at 1 for a keyword the diary has not seen yet.
async fn bump_keyword_frequency(
    conn: &mut SqliteConn,
    member_id: &str,
    year: i32,
    month: i32,
    keyword: &str,
) -> Result<(), DieselError> {
    let diary_id: i32 = diary::table
        .filter(diary::member_id.eq(member_id))
        .filter(diary::diary_year.eq(year))
        .filter(diary::diary_month.eq(month))
        .select(diary::diary_id)
        .first(conn)
        .await?;

    diesel::insert_into(diary_keyword::table)
        .values(NewDiaryKeyword {
            diary_id,
            keyword,
            diary_freq: 1,
        })
        .on_conflict((diary_keyword::diary_id, diary_keyword::keyword))
        .do_update()
        .set(diary_keyword::diary_freq.eq(diary_keyword::diary_freq + 1))
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::migrated_pool;

    fn occurrence(id: i32, member: &str, keyword: &str) -> RecordKeywordExtended {
        RecordKeywordExtended {
            record_keyword_id: id,
            diary_year: 2024,
            diary_month: 3,
            member_id: member.to_string(),
            keyword: keyword.to_string(),
        }
    }

    #[tokio::test]
    async fn test_repeated_keyword_counts_each_occurrence() {
        let (pool, _dir) = migrated_pool().await;
        let repo = DieselDiaryRepository::new(pool);

        let batch: Vec<_> = (1..=4).map(|i| occurrence(i, "m1", "coffee")).collect();
        repo.record_occurrences(&batch[..3]).await.unwrap();
        repo.record_occurrences(&batch[3..]).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let diary = repo.find_diary("m1", 2024, 3).await.unwrap().unwrap();
        let keywords = repo.diary_keywords(diary.id).await.unwrap();
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].keyword, "coffee");
        assert_eq!(keywords[0].freq, 4);
    }

    #[tokio::test]
    async fn test_diaries_are_per_member_and_month() {
        let (pool, _dir) = migrated_pool().await;
        let repo = DieselDiaryRepository::new(pool);

        let mut april = occurrence(3, "m1", "tea");
        april.diary_month = 4;
        repo.record_occurrences(&[
            occurrence(1, "m1", "tea"),
            occurrence(2, "m2", "tea"),
            april,
        ])
        .await
        .unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);
        let m2 = repo.find_diary("m2", 2024, 3).await.unwrap().unwrap();
        assert_eq!(repo.diary_keywords(m2.id).await.unwrap()[0].freq, 1);
        assert!(repo.find_diary("m2", 2024, 4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_chunk_is_noop() {
        let (pool, _dir) = migrated_pool().await;
        let repo = DieselDiaryRepository::new(pool);

        assert_eq!(repo.record_occurrences(&[]).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
