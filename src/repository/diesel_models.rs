//! Diesel ORM models for database tables.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::{Diary, DiaryKeyword, MediaFile, Record};
use crate::schema;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::media_file)]
#[diesel(primary_key(media_file_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MediaFileRecord {
    pub media_file_id: String,
    pub media_type_id: String,
    pub media_file_blocked: bool,
    pub media_file_checked: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::media_file)]
pub struct NewMediaFile<'a> {
    pub media_file_id: &'a str,
    pub media_type_id: &'a str,
    pub media_file_blocked: bool,
    pub media_file_checked: bool,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::record)]
#[diesel(primary_key(record_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecordRecord {
    pub record_id: i32,
    pub member_id: String,
    pub record_content: String,
    pub record_created_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::record)]
pub struct NewRecord<'a> {
    pub record_id: i32,
    pub member_id: &'a str,
    pub record_content: &'a str,
    pub record_created_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::record_keyword)]
pub struct NewRecordKeyword<'a> {
    pub record_id: i32,
    pub keyword: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::diary)]
#[diesel(primary_key(diary_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DiaryRecord {
    pub diary_id: i32,
    pub member_id: String,
    pub diary_year: i32,
    pub diary_month: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::diary)]
pub struct NewDiary<'a> {
    pub member_id: &'a str,
    pub diary_year: i32,
    pub diary_month: i32,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = schema::diary_keyword)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DiaryKeywordRecord {
    pub diary_keyword_id: i32,
    pub diary_id: i32,
    pub keyword: String,
    pub diary_freq: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = schema::diary_keyword)]
pub struct NewDiaryKeyword<'a> {
    pub diary_id: i32,
    pub keyword: &'a str,
    pub diary_freq: i32,
}

impl From<MediaFileRecord> for MediaFile {
    fn from(record: MediaFileRecord) -> Self {
        MediaFile {
            id: record.media_file_id,
            media_type: record.media_type_id,
            blocked: record.media_file_blocked,
            checked: record.media_file_checked,
        }
    }
}

impl From<RecordRecord> for Record {
    fn from(record: RecordRecord) -> Self {
        Record {
            id: record.record_id,
            member_id: record.member_id,
            content: record.record_content,
            created_at: record.record_created_at,
        }
    }
}

impl From<DiaryRecord> for Diary {
    fn from(record: DiaryRecord) -> Self {
        Diary {
            id: record.diary_id,
            member_id: record.member_id,
            year: record.diary_year,
            month: record.diary_month,
        }
    }
}

impl From<DiaryKeywordRecord> for DiaryKeyword {
    fn from(record: DiaryKeywordRecord) -> Self {
        DiaryKeyword {
            diary_id: record.diary_id,
            keyword: record.keyword,
            freq: record.diary_freq,
        }
    }
}
