//! The warehouse: one SQLite connection plus the statements that write to it.

use super::models::TableCounts;
use super::schema::{
    self, ARTISTS_TABLE_NAME, SONGPLAYS_TABLE_NAME, SONGS_TABLE_NAME, TIMES_TABLE_NAME,
    USERS_TABLE_NAME,
};
use super::statements::SqlStatements;
use crate::error::EtlError;
use crate::ingest::{
    process_data, LoadSummary, LogFileTransformer, SongFileTransformer, JSON_SUFFIX,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// Opens `path` with foreign key enforcement on, without touching the schema.
pub fn open_connection<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)
        .map_err(EtlError::from)
        .with_context(|| format!("Failed to open warehouse database {}", path.display()))?;
    enable_foreign_keys(&conn)
        .with_context(|| format!("Failed to configure warehouse database {}", path.display()))?;
    Ok(conn)
}

fn enable_foreign_keys(conn: &Connection) -> Result<(), EtlError> {
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(())
}

pub struct Warehouse {
    conn: Connection,
    statements: SqlStatements,
}

impl Warehouse {
    /// Opens the database at `path`, creating the star schema if missing and
    /// validating it otherwise.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = open_connection(path)?;
        let warehouse = Self::from_connection(conn)?;

        let counts = warehouse.table_counts()?;
        info!(
            "Opened warehouse {}: {} songs, {} artists, {} users, {} songplays",
            path.display(),
            counts.songs,
            counts.artists,
            counts.users,
            counts.songplays
        );
        Ok(warehouse)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(EtlError::from)
            .context("Failed to open in-memory warehouse")?;
        enable_foreign_keys(&conn)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::ensure(&conn)?;
        Ok(Self {
            conn,
            statements: SqlStatements::default(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Loads every catalog file under `root`.
    pub fn load_song_data<P: AsRef<Path>>(&mut self, root: P) -> Result<LoadSummary> {
        let root = root.as_ref();
        info!("Loading song data from {}", root.display());
        let transformer = SongFileTransformer::new(&self.statements);
        let summary = process_data(&mut self.conn, root, JSON_SUFFIX, &transformer)?;
        info!(
            "Song data loaded: {} files, {} new songs, {} new artists",
            summary.files_processed, summary.rows.songs, summary.rows.artists
        );
        Ok(summary)
    }

    /// Loads every event batch under `root`.
    pub fn load_log_data<P: AsRef<Path>>(&mut self, root: P) -> Result<LoadSummary> {
        let root = root.as_ref();
        info!("Loading log data from {}", root.display());
        let transformer = LogFileTransformer::new(&self.statements);
        let summary = process_data(&mut self.conn, root, JSON_SUFFIX, &transformer)?;
        info!(
            "Log data loaded: {} files, {} songplays ({} matched to a song), {} new time rows, {} events skipped",
            summary.files_processed,
            summary.rows.songplays,
            summary.rows.resolved_songplays,
            summary.rows.times,
            summary.rows.skipped_events
        );
        Ok(summary)
    }

    pub fn table_counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
                .map_err(EtlError::from)
                .with_context(|| format!("Failed to count rows of {}", table))?;
            Ok(n as usize)
        };
        Ok(TableCounts {
            songs: count(SONGS_TABLE_NAME)?,
            artists: count(ARTISTS_TABLE_NAME)?,
            users: count(USERS_TABLE_NAME)?,
            times: count(TIMES_TABLE_NAME)?,
            songplays: count(SONGPLAYS_TABLE_NAME)?,
        })
    }

    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| EtlError::from(err))
            .context("Failed to close warehouse database")
    }
}
