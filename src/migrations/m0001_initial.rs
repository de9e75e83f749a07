use cetane::prelude::*;

pub fn migration() -> Migration {
    Migration::new("0001_initial_schema").operation(
        RunSql::portable().for_backend(
            "sqlite",
            r#"CREATE TABLE IF NOT EXISTS media_file (
    media_file_id TEXT PRIMARY KEY NOT NULL,
    media_type_id TEXT NOT NULL,
    media_file_blocked BOOLEAN NOT NULL DEFAULT 0,
    media_file_checked BOOLEAN NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_media_file_checked ON media_file(media_file_checked);

CREATE TABLE IF NOT EXISTS record (
    record_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    member_id TEXT NOT NULL,
    record_content TEXT NOT NULL DEFAULT '',
    record_created_at TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_record_created_at ON record(record_created_at);

CREATE TABLE IF NOT EXISTS record_keyword (
    record_keyword_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    record_id INTEGER NOT NULL REFERENCES record(record_id),
    record_keyword TEXT NOT NULL,
    UNIQUE(record_id, record_keyword)
);"#,
        ),
    )
}
