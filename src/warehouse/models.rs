//! Typed rows of the star schema.

use chrono::NaiveDateTime;

/// Dimension row for the `songs` table.
#[derive(Clone, Debug, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub artist_id: String,
    pub title: String,
    pub year: i32,
    /// Seconds.
    pub duration: f64,
}

/// Dimension row for the `artists` table.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Dimension row for the `users` table.
///
/// Only `level` changes after the first insert. The descriptive fields are
/// optional because event records may carry nulls, the store rejects them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

/// Dimension row for the `times` table, every field derived from `start_time`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: NaiveDateTime,
    pub hour: u32,
    pub day: u32,
    /// ISO 8601 week number.
    pub week: u32,
    pub month: u32,
    pub year: i32,
    /// Monday = 0 .. Sunday = 6.
    pub weekday: u32,
}

/// A catalog match for an event, song and artist always come as a pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSong {
    pub song_id: String,
    pub artist_id: String,
}

/// Fact row for the `songplays` table. `songplay_id` is assigned by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct SongplayRow {
    pub start_time: NaiveDateTime,
    pub user_id: Option<i64>,
    pub song: Option<ResolvedSong>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl SongplayRow {
    pub fn song_id(&self) -> Option<&str> {
        self.song.as_ref().map(|s| s.song_id.as_str())
    }

    pub fn artist_id(&self) -> Option<&str> {
        self.song.as_ref().map(|s| s.artist_id.as_str())
    }
}

/// Row counts of every table in the star schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub songs: usize,
    pub artists: usize,
    pub users: usize,
    pub times: usize,
    pub songplays: usize,
}
