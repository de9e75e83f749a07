//! Diesel-based record and record keyword repository for SQLite.

use chrono::{Datelike, NaiveDateTime};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use super::diesel_models::{NewRecord, NewRecordKeyword, RecordRecord};
use super::pool::{DbPool, DieselError};
use crate::models::{MonthWindow, Record, RecordKeyword, RecordKeywordExtended};
use crate::schema::{record, record_keyword};

#[derive(Clone)]
pub struct DieselRecordRepository {
    pool: DbPool,
}

impl DieselRecordRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or replace a record under its own id.
    pub async fn save(&self, rec: &Record) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;

        diesel::replace_into(record::table)
            .values(NewRecord {
                record_id: rec.id,
                member_id: &rec.member_id,
                record_content: &rec.content,
                record_created_at: rec.created_at,
            })
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Next page of records created inside `window`, ordered by id.
    pub async fn fetch_in_window(
        &self,
        window: &MonthWindow,
        after: Option<i32>,
        limit: usize,
    ) -> Result<Vec<Record>, DieselError> {
        let mut conn = self.pool.get().await?;

        let mut query = record::table
            .filter(record::record_created_at.ge(window.start()))
            .filter(record::record_created_at.lt(window.end()))
            .select(RecordRecord::as_select())
            .into_boxed();
        if let Some(after) = after {
            query = query.filter(record::record_id.gt(after));
        }

        let records: Vec<RecordRecord> = query
            .order(record::record_id.asc())
            .limit(limit as i64)
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(Record::from).collect())
    }

    pub async fn count_in_window(&self, window: &MonthWindow) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        let count: i64 = record::table
            .filter(record::record_created_at.ge(window.start()))
            .filter(record::record_created_at.lt(window.end()))
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count as u64)
    }

    /// Insert keyword pairs, ignoring ones already stored. Returns the number
    /// of new rows.
    pub async fn insert_keywords(&self, keywords: &[RecordKeyword]) -> Result<usize, DieselError> {
        if keywords.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await?;

        conn.transaction(|conn| {
            Box::pin(async move {
                let mut inserted = 0;
                // SQLite doesn't support batch insert_or_ignore, insert one at a time
                for kw in keywords {
                    inserted += diesel::insert_or_ignore_into(record_keyword::table)
                        .values(NewRecordKeyword {
                            record_id: kw.record_id,
                            keyword: &kw.keyword,
                        })
                        .execute(conn)
                        .await?;
                }
                Ok::<_, DieselError>(inserted)
            })
        })
        .await
    }

    pub async fn keywords_for(&self, record_id: i32) -> Result<Vec<String>, DieselError> {
        let mut conn = self.pool.get().await?;

        record_keyword::table
            .filter(record_keyword::record_id.eq(record_id))
            .order(record_keyword::keyword.asc())
            .select(record_keyword::keyword)
            .load(&mut conn)
            .await
    }

    /// Next page of keyword occurrences joined with their record, limited to
    /// records created inside `window` and ordered by keyword row id.
    pub async fn fetch_keyword_occurrences(
        &self,
        window: &MonthWindow,
        after: Option<i32>,
        limit: usize,
    ) -> Result<Vec<RecordKeywordExtended>, DieselError> {
        let mut conn = self.pool.get().await?;

        let mut query = record_keyword::table
            .inner_join(record::table)
            .filter(record::record_created_at.ge(window.start()))
            .filter(record::record_created_at.lt(window.end()))
            .select((
                record_keyword::record_keyword_id,
                record::member_id,
                record::record_created_at,
                record_keyword::keyword,
            ))
            .into_boxed();
        if let Some(after) = after {
            query = query.filter(record_keyword::record_keyword_id.gt(after));
        }

        let rows: Vec<(i32, String, NaiveDateTime, String)> = query
            .order(record_keyword::record_keyword_id.asc())
            .limit(limit as i64)
            .load(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(
                |(record_keyword_id, member_id, created_at, keyword)| RecordKeywordExtended {
                    record_keyword_id,
                    diary_year: created_at.year(),
                    diary_month: created_at.month() as i32,
                    member_id,
                    keyword,
                },
            )
            .collect())
    }
}
