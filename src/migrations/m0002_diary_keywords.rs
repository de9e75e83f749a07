use cetane::prelude::*;

pub fn migration() -> Migration {
    Migration::new("0002_diary_keywords")
        .depends_on(&["0001_initial_schema"])
        .operation(
            RunSql::portable().for_backend(
                "sqlite",
                r#"CREATE TABLE IF NOT EXISTS diary (
    diary_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    member_id TEXT NOT NULL,
    diary_year INTEGER NOT NULL,
    diary_month INTEGER NOT NULL,
    UNIQUE(member_id, diary_year, diary_month)
);

CREATE TABLE IF NOT EXISTS diary_keyword (
    diary_keyword_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    diary_id INTEGER NOT NULL REFERENCES diary(diary_id),
    diary_keyword TEXT NOT NULL,
    diary_freq INTEGER NOT NULL DEFAULT 1 CHECK (diary_freq >= 1),
    UNIQUE(diary_id, diary_keyword)
);"#,
            ),
        )
}
