//! SQLite schema of the Sparkify star schema.
//!
//! Four dimension tables keyed by their natural keys and one fact table with a
//! surrogate rowid. Tables are listed referenced-first so creation can run in
//! order and dropping in reverse.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub const ARTISTS_TABLE_NAME: &str = "artists";
pub const SONGS_TABLE_NAME: &str = "songs";
pub const USERS_TABLE_NAME: &str = "users";
pub const TIMES_TABLE_NAME: &str = "times";
pub const SONGPLAYS_TABLE_NAME: &str = "songplays";

// =============================================================================
// Dimension Tables
// =============================================================================

const ARTISTS_TABLE: Table = Table {
    name: ARTISTS_TABLE_NAME,
    columns: &[
        sqlite_column!(
            "artist_id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("location", &SqlType::Text, non_null = true),
        sqlite_column!("latitude", &SqlType::Real),
        sqlite_column!("longitude", &SqlType::Real),
    ],
    indices: &[("idx_artists_name", "name")],
};

const SONGS_TABLE: Table = Table {
    name: SONGS_TABLE_NAME,
    columns: &[
        sqlite_column!(
            "song_id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!(
            "artist_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: ARTISTS_TABLE_NAME,
                foreign_column: "artist_id",
                on_delete: ForeignKeyOnChange::Restrict,
            })
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("duration", &SqlType::Real, non_null = true), // seconds
    ],
    // Serves the song lookup done for every songplay
    indices: &[("idx_songs_title_duration", "title, duration")],
};

const USERS_TABLE: Table = Table {
    name: USERS_TABLE_NAME,
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!("first_name", &SqlType::Text, non_null = true),
        sqlite_column!("last_name", &SqlType::Text, non_null = true),
        sqlite_column!("gender", &SqlType::Text, non_null = true),
        sqlite_column!("level", &SqlType::Text, non_null = true), // 'free', 'paid'
    ],
    indices: &[],
};

const TIMES_TABLE: Table = Table {
    name: TIMES_TABLE_NAME,
    columns: &[
        sqlite_column!(
            "start_time",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true
        ), // naive UTC, 'YYYY-MM-DD HH:MM:SS' plus '.fff' when sub-second
        sqlite_column!("hour", &SqlType::Integer, non_null = true),
        sqlite_column!("day", &SqlType::Integer, non_null = true),
        sqlite_column!("week", &SqlType::Integer, non_null = true),
        sqlite_column!("month", &SqlType::Integer, non_null = true),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("weekday", &SqlType::Integer, non_null = true),
    ],
    indices: &[],
};

// =============================================================================
// Fact Table
// =============================================================================

const SONGPLAYS_TABLE: Table = Table {
    name: SONGPLAYS_TABLE_NAME,
    columns: &[
        sqlite_column!(
            "songplay_id",
            &SqlType::Integer,
            is_primary_key = true,
            non_null = true
        ),
        sqlite_column!(
            "start_time",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: TIMES_TABLE_NAME,
                foreign_column: "start_time",
                on_delete: ForeignKeyOnChange::Restrict,
            })
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: USERS_TABLE_NAME,
                foreign_column: "user_id",
                on_delete: ForeignKeyOnChange::Restrict,
            })
        ),
        sqlite_column!(
            "song_id",
            &SqlType::Text,
            foreign_key = Some(&ForeignKey {
                foreign_table: SONGS_TABLE_NAME,
                foreign_column: "song_id",
                on_delete: ForeignKeyOnChange::SetNull,
            })
        ),
        sqlite_column!(
            "artist_id",
            &SqlType::Text,
            foreign_key = Some(&ForeignKey {
                foreign_table: ARTISTS_TABLE_NAME,
                foreign_column: "artist_id",
                on_delete: ForeignKeyOnChange::SetNull,
            })
        ),
        sqlite_column!("session_id", &SqlType::Integer, non_null = true),
        sqlite_column!("location", &SqlType::Text, non_null = true),
        sqlite_column!("user_agent", &SqlType::Text, non_null = true),
    ],
    indices: &[
        ("idx_songplays_start_time", "start_time"),
        ("idx_songplays_user", "user_id"),
    ],
};

// =============================================================================
// Versioned Schema Definition
// =============================================================================

pub const STAR_SCHEMA: VersionedSchema = VersionedSchema {
    version: 0,
    tables: &[
        ARTISTS_TABLE,
        SONGS_TABLE,
        USERS_TABLE,
        TIMES_TABLE,
        SONGPLAYS_TABLE,
    ],
};

/// Creates all five tables and their indices if they do not exist.
///
/// Fails without touching the version stamp when the database was stamped by
/// another schema version or holds tables that don't match the definition.
pub fn create_all(conn: &Connection) -> Result<()> {
    STAR_SCHEMA
        .create(conn)
        .context("Failed to create star schema")
}

/// Drops all five tables if they exist, the fact table first.
pub fn drop_all(conn: &Connection) -> Result<()> {
    STAR_SCHEMA.drop(conn).context("Failed to drop star schema")
}

/// Makes sure the database holds the star schema, creating whatever is missing.
pub fn ensure(conn: &Connection) -> Result<()> {
    create_all(conn).context("Existing database does not match the star schema")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_persistence::{VersionedSchema, BASE_DB_VERSION};

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<String>>>()
            .unwrap()
    }

    #[test]
    fn test_schema_creates_successfully() {
        let conn = Connection::open_in_memory().unwrap();
        create_all(&conn).unwrap();
        STAR_SCHEMA.validate(&conn).unwrap();

        assert_eq!(
            table_names(&conn),
            vec!["artists", "songplays", "songs", "times", "users"]
        );
    }

    #[test]
    fn test_create_and_drop_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();

        create_all(&conn).unwrap();
        create_all(&conn).unwrap();
        drop_all(&conn).unwrap();
        drop_all(&conn).unwrap();
        assert!(table_names(&conn).is_empty());

        create_all(&conn).unwrap();
        ensure(&conn).unwrap();
        assert_eq!(table_names(&conn).len(), 5);
    }

    #[test]
    fn test_ensure_rejects_lax_legacy_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE users (
                user_id INTEGER PRIMARY KEY,
                first_name TEXT,
                last_name TEXT,
                gender TEXT,
                level TEXT
            )",
            [],
        )
        .unwrap();

        let err = format!("{:#}", ensure(&conn).unwrap_err());
        assert!(err.contains("users"));
        assert!(err.contains("non-null mismatch"));
    }

    #[test]
    fn test_ensure_stamps_version() {
        let conn = Connection::open_in_memory().unwrap();
        ensure(&conn).unwrap();
        assert_eq!(
            VersionedSchema::stamped_version(&conn).unwrap(),
            Some(STAR_SCHEMA.version)
        );
    }

    #[test]
    fn test_create_all_rejects_other_schema_version() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", BASE_DB_VERSION + 5)
            .unwrap();

        assert!(create_all(&conn).is_err());
        let user_version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(user_version, (BASE_DB_VERSION + 5) as i64);
        assert!(table_names(&conn).is_empty());
    }

    #[test]
    fn test_ensure_leaves_lax_schema_unstamped() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE artists (
                artist_id TEXT PRIMARY KEY,
                name TEXT,
                location TEXT,
                latitude REAL,
                longitude REAL
            )",
            [],
        )
        .unwrap();

        assert!(ensure(&conn).is_err());
        assert_eq!(VersionedSchema::stamped_version(&conn).unwrap(), None);
    }

    #[test]
    fn test_songplay_requires_known_user_when_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();
        create_all(&conn).unwrap();

        conn.execute(
            "INSERT INTO times (start_time, hour, day, week, month, year, weekday)
             VALUES ('2018-11-12 02:35:45.796', 2, 12, 46, 11, 2018, 0)",
            [],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO songplays (start_time, user_id, session_id, location, user_agent)
             VALUES ('2018-11-12 02:35:45.796', 42, 1, 'Somewhere', 'Agent')",
            [],
        );
        assert!(result.is_err());
    }
}
