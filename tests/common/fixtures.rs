//! Input file fixtures written into a temporary data directory.

use super::constants::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory laid out like the production data folder:
/// `song_data/`, `log_data/` and the database file next to them.
pub struct TestData {
    pub dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("song_data")).unwrap();
        fs::create_dir_all(dir.path().join("log_data")).unwrap();
        TestData { dir }
    }

    pub fn song_root(&self) -> PathBuf {
        self.dir.path().join("song_data")
    }

    pub fn log_root(&self) -> PathBuf {
        self.dir.path().join("log_data")
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("sparkifydb.sqlite")
    }

    /// Writes one catalog document at `song_data/<relative>`.
    pub fn write_song(&self, relative: &str, song: &Value) -> PathBuf {
        write(&self.song_root(), relative, &song.to_string())
    }

    /// Writes the three catalog songs in a nested layout.
    pub fn write_catalog(&self) {
        self.write_song("A/A/A/TRAAAAW128F429D538.json", &song_1());
        self.write_song("A/A/B/TRAABCL128F4286650.json", &song_2());
        self.write_song("A/B/C/TRABCEI128F424C983.json", &song_3());
    }

    /// Writes one event per line at `log_data/<relative>`.
    pub fn write_events(&self, relative: &str, events: &[Value]) -> PathBuf {
        let lines: Vec<String> = events.iter().map(Value::to_string).collect();
        write(&self.log_root(), relative, &lines.join("\n"))
    }

    /// Writes raw content at `log_data/<relative>`.
    pub fn write_log_raw(&self, relative: &str, content: &str) -> PathBuf {
        write(&self.log_root(), relative, content)
    }
}

fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn song(
    song_id: &str,
    title: &str,
    duration: f64,
    artist_id: &str,
    artist_name: &str,
) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": 0,
    })
}

pub fn song_1() -> Value {
    song(SONG_1_ID, SONG_1_TITLE, SONG_1_DURATION, ARTIST_1_ID, ARTIST_1_NAME)
}

pub fn song_2() -> Value {
    song(SONG_2_ID, SONG_2_TITLE, SONG_2_DURATION, ARTIST_2_ID, ARTIST_2_NAME)
}

pub fn song_3() -> Value {
    song(SONG_3_ID, SONG_3_TITLE, SONG_3_DURATION, ARTIST_3_ID, ARTIST_3_NAME)
}

/// A logged-in `NextSong` event for a song not in the catalog.
pub fn next_song(ts: i64, user_id: i64, level: &str) -> Value {
    json!({
        "artist": "Des'ree",
        "auth": "Logged In",
        "firstName": "Lily",
        "gender": "F",
        "itemInSession": 1,
        "lastName": "Koch",
        "length": 246.30812,
        "level": level,
        "location": "Chicago-Naperville-Elgin, IL-IN-WI",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1540344794796.0,
        "sessionId": 139,
        "song": "You Gotta Be",
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (X11; Linux x86_64)",
        "userId": user_id.to_string(),
    })
}

/// A `NextSong` event playing `title` by `artist` for `length` seconds.
pub fn next_song_of(ts: i64, user_id: i64, title: &str, artist: &str, length: f64) -> Value {
    let mut event = next_song(ts, user_id, "free");
    event["song"] = json!(title);
    event["artist"] = json!(artist);
    event["length"] = json!(length);
    event
}

/// A non-`NextSong` event, optionally logged out.
pub fn page_view(ts: i64, page: &str, user_id: Option<i64>) -> Value {
    let mut event = next_song(ts, user_id.unwrap_or(0), "free");
    event["page"] = json!(page);
    event["song"] = Value::Null;
    event["artist"] = Value::Null;
    event["length"] = Value::Null;
    if user_id.is_none() {
        event["userId"] = json!("");
        event["auth"] = json!("Logged Out");
    }
    event
}
