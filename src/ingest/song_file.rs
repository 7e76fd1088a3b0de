use super::driver::{FileReport, FileTransformer};
use super::records::SongRecord;
use crate::error::EtlError;
use crate::warehouse::statements::SqlStatements;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

/// Loads catalog files: one JSON object per file, one song and its artist.
pub struct SongFileTransformer<'a> {
    statements: &'a SqlStatements,
}

impl<'a> SongFileTransformer<'a> {
    pub fn new(statements: &'a SqlStatements) -> Self {
        Self { statements }
    }
}

pub fn read_song_record(path: &Path) -> Result<SongRecord, EtlError> {
    let content = fs::read_to_string(path).map_err(|source| EtlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|err| EtlError::malformed(path, err))
}

impl FileTransformer for SongFileTransformer<'_> {
    fn name(&self) -> &'static str {
        "song"
    }

    fn transform(&self, conn: &Connection, path: &Path) -> Result<FileReport, EtlError> {
        let record = read_song_record(path)?;

        // Artist first so the song's foreign key holds when it is enforced
        let artists = self.statements.insert_artist(conn, &record.artist_row())?;
        let songs = self.statements.insert_song(conn, &record.song_row())?;

        Ok(FileReport {
            artists,
            songs,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::schema;
    use tempfile::TempDir;

    const SONG_JSON: &str = r#"{"num_songs": 1, "artist_id": "ARJIE2Y1187B994AB7",
        "artist_latitude": null, "artist_longitude": null, "artist_location": "",
        "artist_name": "Line Renaud", "song_id": "SOUPIRU12A6D4FA1E1",
        "title": "Der Kleine Dompfaff", "duration": 152.92036, "year": 0}"#;

    fn setup() -> (TempDir, Connection) {
        let dir = TempDir::new().unwrap();
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();
        schema::create_all(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn loads_song_and_artist() {
        let (dir, conn) = setup();
        let path = dir.path().join("TRAAABD128F429CF47.json");
        fs::write(&path, SONG_JSON).unwrap();
        let statements = SqlStatements::default();
        let transformer = SongFileTransformer::new(&statements);

        let report = transformer.transform(&conn, &path).unwrap();
        assert_eq!(report.songs, 1);
        assert_eq!(report.artists, 1);

        let (title, artist_id, year): (String, String, i32) = conn
            .query_row("SELECT title, artist_id, year FROM songs", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!(title, "Der Kleine Dompfaff");
        assert_eq!(artist_id, "ARJIE2Y1187B994AB7");
        assert_eq!(year, 0);

        let (name, latitude): (String, Option<f64>) = conn
            .query_row("SELECT name, latitude FROM artists", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(name, "Line Renaud");
        assert_eq!(latitude, None);
    }

    #[test]
    fn reprocessing_is_a_no_op() {
        let (dir, conn) = setup();
        let path = dir.path().join("song.json");
        fs::write(&path, SONG_JSON).unwrap();
        let statements = SqlStatements::default();
        let transformer = SongFileTransformer::new(&statements);

        transformer.transform(&conn, &path).unwrap();
        let report = transformer.transform(&conn, &path).unwrap();
        assert_eq!(report, FileReport::default());

        let songs: i64 = conn
            .query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))
            .unwrap();
        let artists: i64 = conn
            .query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))
            .unwrap();
        assert_eq!((songs, artists), (1, 1));
    }

    #[test]
    fn malformed_file_is_reported_with_its_path() {
        let (dir, conn) = setup();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"song_id": "SO1"}"#).unwrap();
        let statements = SqlStatements::default();
        let transformer = SongFileTransformer::new(&statements);

        match transformer.transform(&conn, &path) {
            Err(EtlError::MalformedRecord {
                path: err_path,
                line,
                ..
            }) => {
                assert_eq!(err_path, path);
                assert_eq!(line, None);
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn two_documents_in_one_file_are_malformed() {
        let (dir, conn) = setup();
        let path = dir.path().join("double.json");
        fs::write(&path, format!("{}\n{}", SONG_JSON, SONG_JSON)).unwrap();
        let statements = SqlStatements::default();
        let transformer = SongFileTransformer::new(&statements);

        assert!(matches!(
            transformer.transform(&conn, &path),
            Err(EtlError::MalformedRecord { .. })
        ));
    }
}
