//! Migration schema tests.
//!
//! Applies the cetane registry to an in-memory SQLite database and checks
//! the resulting tables, columns and uniqueness constraints.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::{Connection, Result as SqliteResult};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnInfo {
    col_type: String,
    not_null: bool,
    primary_key: bool,
}

fn extract_columns(conn: &Connection, table: &str) -> SqliteResult<BTreeMap<String, ColumnInfo>> {
    let mut pragma = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
    let rows = pragma.query_map([], |row| {
        Ok((
            row.get::<_, String>(1)?,
            ColumnInfo {
                col_type: row.get::<_, String>(2)?.to_uppercase(),
                not_null: row.get(3)?,
                primary_key: row.get::<_, i32>(5)? > 0,
            },
        ))
    })?;
    rows.collect()
}

fn extract_tables(conn: &Connection) -> SqliteResult<BTreeSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt.query_map([], |row| row.get(0))?;
    names.collect()
}

/// Column lists of every unique index on `table`, including the implicit
/// indexes SQLite creates for `UNIQUE(...)` constraints.
fn unique_column_sets(conn: &Connection, table: &str) -> SqliteResult<BTreeSet<Vec<String>>> {
    let mut list = conn.prepare(&format!("PRAGMA index_list(\"{}\")", table))?;
    let indexes: Vec<(String, bool)> = list
        .query_map([], |row| Ok((row.get(1)?, row.get(2)?)))?
        .collect::<SqliteResult<Vec<_>>>()?;

    let mut sets = BTreeSet::new();
    for (name, unique) in indexes {
        if !unique {
            continue;
        }
        let mut info = conn.prepare(&format!("PRAGMA index_info(\"{}\")", name))?;
        let columns: Vec<String> = info
            .query_map([], |row| row.get(2))?
            .collect::<SqliteResult<Vec<_>>>()?;
        sets.insert(columns);
    }
    Ok(sets)
}

fn run_cetane_migrations(conn: &Connection) -> SqliteResult<()> {
    use cetane::backend::Sqlite;

    let registry = diarybatch::migrations::registry();
    let backend = Sqlite;

    let ordered_names = registry
        .resolve_order()
        .expect("Failed to resolve migration order");

    for name in ordered_names {
        let migration = registry
            .get(name)
            .expect("Migration not found after resolve");
        for stmt in migration.forward_sql(&backend) {
            if stmt.trim().is_empty() {
                continue;
            }
            conn.execute_batch(&stmt)?;
        }
    }

    Ok(())
}

fn migrated() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to open DB");
    run_cetane_migrations(&conn).expect("Migrations failed");
    conn
}

#[test]
fn test_creates_expected_tables() {
    let conn = migrated();
    let tables = extract_tables(&conn).unwrap();

    for expected in [
        "media_file",
        "record",
        "record_keyword",
        "diary",
        "diary_keyword",
    ] {
        assert!(tables.contains(expected), "missing table {}", expected);
    }
}

#[test]
fn test_media_file_columns() {
    let conn = migrated();
    let columns = extract_columns(&conn, "media_file").unwrap();

    assert!(columns["media_file_id"].primary_key);
    assert_eq!(columns["media_file_id"].col_type, "TEXT");
    assert!(columns["media_type_id"].not_null);
    assert!(columns["media_file_blocked"].not_null);
    assert!(columns["media_file_checked"].not_null);
}

#[test]
fn test_keyword_uniqueness_constraints() {
    let conn = migrated();

    let record_keyword = unique_column_sets(&conn, "record_keyword").unwrap();
    assert!(record_keyword.contains(&vec![
        "record_id".to_string(),
        "record_keyword".to_string()
    ]));

    let diary = unique_column_sets(&conn, "diary").unwrap();
    assert!(diary.contains(&vec![
        "member_id".to_string(),
        "diary_year".to_string(),
        "diary_month".to_string()
    ]));

    let diary_keyword = unique_column_sets(&conn, "diary_keyword").unwrap();
    assert!(diary_keyword.contains(&vec![
        "diary_id".to_string(),
        "diary_keyword".to_string()
    ]));
}

#[test]
fn test_diary_freq_must_be_positive() {
    let conn = migrated();
    conn.execute_batch(
        "INSERT INTO diary (member_id, diary_year, diary_month) VALUES ('m1', 2024, 3);",
    )
    .unwrap();

    let result = conn.execute_batch(
        "INSERT INTO diary_keyword (diary_id, diary_keyword, diary_freq) VALUES (1, 'rain', 0);",
    );
    assert!(result.is_err());
}

#[test]
fn test_individual_migrations_generate_valid_sql() {
    use cetane::backend::Sqlite;

    let registry = diarybatch::migrations::registry();
    let backend = Sqlite;

    let ordered_names = registry
        .resolve_order()
        .expect("Failed to resolve migration order");
    assert_eq!(ordered_names.len(), 2);

    // Each prefix of the migration order must apply cleanly
    for i in 0..ordered_names.len() {
        let conn = Connection::open_in_memory().expect("Failed to open DB");

        for prior_name in &ordered_names[..=i] {
            let migration = registry.get(prior_name).expect("Migration not found");
            for stmt in &migration.forward_sql(&backend) {
                if stmt.trim().is_empty() {
                    continue;
                }
                conn.execute_batch(stmt).unwrap_or_else(|e| {
                    panic!("Migration {} failed: {}\nSQL: {}", migration.name, e, stmt)
                });
            }
        }
    }
}
