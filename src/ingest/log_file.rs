use super::driver::{FileReport, FileTransformer};
use super::records::EventRecord;
use super::time_dimension::{start_time_from_millis, time_row};
use crate::error::EtlError;
use crate::warehouse::statements::SqlStatements;
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::warn;

/// A parsed event together with its converted timestamp.
struct TimedEvent {
    start_time: NaiveDateTime,
    record: EventRecord,
}

/// Parses every non-blank line of an event batch, in file order.
fn read_events(path: &Path) -> Result<Vec<TimedEvent>, EtlError> {
    let content = fs::read_to_string(path).map_err(|source| EtlError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut events = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let record: EventRecord = serde_json::from_str(line)
            .map_err(|err| EtlError::malformed_line(path, line_number, err))?;
        let start_time = start_time_from_millis(record.ts).ok_or_else(|| {
            EtlError::malformed_line(
                path,
                line_number,
                format!("timestamp out of range: {}", record.ts),
            )
        })?;
        events.push(TimedEvent { start_time, record });
    }
    Ok(events)
}

/// Loads event batches: time rows, then user rows, then one songplay per
/// `NextSong` event.
pub struct LogFileTransformer<'a> {
    statements: &'a SqlStatements,
}

impl<'a> LogFileTransformer<'a> {
    pub fn new(statements: &'a SqlStatements) -> Self {
        Self { statements }
    }

    fn load_times(&self, conn: &Connection, events: &[TimedEvent]) -> Result<usize, EtlError> {
        let mut seen = HashSet::new();
        let mut inserted = 0;
        for event in events {
            if seen.insert(event.start_time) {
                inserted += self
                    .statements
                    .insert_time(conn, &time_row(event.start_time))?;
            }
        }
        Ok(inserted)
    }

    fn load_users(&self, conn: &Connection, events: &[TimedEvent]) -> Result<usize, EtlError> {
        let mut changed = 0;
        for user in events.iter().filter_map(|e| e.record.user_row()) {
            changed += self.statements.upsert_user(conn, &user)?;
        }
        Ok(changed)
    }

    fn load_songplays(
        &self,
        conn: &Connection,
        events: &[TimedEvent],
        report: &mut FileReport,
    ) -> Result<(), EtlError> {
        for event in events {
            let song = match event.record.song_lookup_key() {
                Some((title, artist_name, duration)) => {
                    self.statements
                        .find_song(conn, title, artist_name, duration)?
                }
                None => None,
            };
            if song.is_some() {
                report.resolved_songplays += 1;
            }
            let songplay = event.record.songplay_row(event.start_time, song);
            report.songplays += self.statements.insert_songplay(conn, &songplay)?;
        }
        Ok(())
    }
}

impl FileTransformer for LogFileTransformer<'_> {
    fn name(&self) -> &'static str {
        "log"
    }

    fn transform(&self, conn: &Connection, path: &Path) -> Result<FileReport, EtlError> {
        let events = read_events(path)?;
        if events.is_empty() {
            warn!("No events in {}", path.display());
            return Ok(FileReport::default());
        }

        let total = events.len();
        let plays: Vec<TimedEvent> = events
            .into_iter()
            .filter(|e| e.record.is_next_song())
            .collect();

        let mut report = FileReport {
            skipped_events: total - plays.len(),
            ..Default::default()
        };
        report.times = self.load_times(conn, &plays)?;
        report.users = self.load_users(conn, &plays)?;
        self.load_songplays(conn, &plays, &mut report)?;
        Ok(report)
    }
}
