//! Per-file load loop with a commit checkpoint after every file.

use super::listing::list_files;
use crate::error::EtlError;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::ops::AddAssign;
use std::path::Path;
use tracing::{debug, info};

/// Rows changed by one file, as reported by SQLite.
///
/// Inserts skipped by a conflict policy are not counted. Upserts that update
/// an existing row are, so `users` counts every sighting of a user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileReport {
    pub artists: usize,
    pub songs: usize,
    pub times: usize,
    pub users: usize,
    pub songplays: usize,
    /// Songplays whose song and artist were found in the catalog.
    pub resolved_songplays: usize,
    /// Events dropped because they are not song plays.
    pub skipped_events: usize,
}

impl AddAssign for FileReport {
    fn add_assign(&mut self, other: Self) {
        self.artists += other.artists;
        self.songs += other.songs;
        self.times += other.times;
        self.users += other.users;
        self.songplays += other.songplays;
        self.resolved_songplays += other.resolved_songplays;
        self.skipped_events += other.skipped_events;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub files_processed: usize,
    pub rows: FileReport,
}

/// Transforms one input file and writes its rows through `conn`.
///
/// Implementations must not commit, the driver owns the transaction.
pub trait FileTransformer {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    fn transform(&self, conn: &Connection, path: &Path) -> Result<FileReport, EtlError>;
}

/// Runs `transformer` on every file under `root` ending with `suffix`.
///
/// Each file is processed in its own transaction, committed before the next
/// file starts. The first failure stops the pass: its transaction is dropped
/// uncommitted and the error carries the failing path.
pub fn process_data<T: FileTransformer + ?Sized>(
    conn: &mut Connection,
    root: &Path,
    suffix: &str,
    transformer: &T,
) -> Result<LoadSummary> {
    let files = list_files(root, suffix)?;
    let num_files = files.len();
    info!("{} files found in {}", num_files, root.display());

    let mut summary = LoadSummary::default();
    for (i, path) in files.iter().enumerate() {
        let tx = conn.transaction().map_err(EtlError::from)?;
        let report = transformer.transform(&tx, path).with_context(|| {
            format!(
                "Failed to process {} file {}",
                transformer.name(),
                path.display()
            )
        })?;
        tx.commit()
            .map_err(EtlError::from)
            .with_context(|| format!("Failed to commit {}", path.display()))?;

        debug!("{}: {:?}", path.display(), report);
        summary.files_processed += 1;
        summary.rows += report;
        info!("{}/{} files processed.", i + 1, num_files);
    }
    Ok(summary)
}
