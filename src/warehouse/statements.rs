//! Parameterized statements used by the transformers.
//!
//! The statement set is a plain value handed to each transformer, so the
//! conflict policies live in one place next to the code that binds them.

use super::models::{ArtistRow, ResolvedSong, SongRow, SongplayRow, TimeRow, UserRow};
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Clone, Copy, Debug)]
pub struct SqlStatements {
    /// Insert-if-absent on `artist_id`.
    pub artist_insert: &'static str,
    /// Insert-if-absent on `song_id`.
    pub song_insert: &'static str,
    /// Insert, overwriting only `level` when `user_id` exists.
    pub user_upsert: &'static str,
    /// Insert-if-absent on `start_time`.
    pub time_insert: &'static str,
    /// Plain insert, every event is a new fact.
    pub songplay_insert: &'static str,
    /// Song and artist ids for an exact (title, artist name, duration) match.
    pub song_select: &'static str,
}

pub const SPARKIFY_STATEMENTS: SqlStatements = SqlStatements {
    artist_insert: "INSERT INTO artists (artist_id, name, location, latitude, longitude)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (artist_id) DO NOTHING",
    song_insert: "INSERT INTO songs (song_id, artist_id, title, year, duration)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (song_id) DO NOTHING",
    user_upsert: "INSERT INTO users (user_id, first_name, last_name, gender, level)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (user_id) DO UPDATE SET level = excluded.level",
    time_insert: "INSERT INTO times (start_time, hour, day, week, month, year, weekday)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT (start_time) DO NOTHING",
    songplay_insert: "INSERT INTO songplays
        (start_time, user_id, song_id, artist_id, session_id, location, user_agent)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    song_select: "SELECT songs.song_id, artists.artist_id
        FROM songs
        INNER JOIN artists ON songs.artist_id = artists.artist_id
        WHERE songs.title = ?1 AND artists.name = ?2 AND songs.duration = ?3
        ORDER BY songs.song_id
        LIMIT 1",
};

impl Default for SqlStatements {
    fn default() -> Self {
        SPARKIFY_STATEMENTS
    }
}

// Each method returns the number of rows the statement changed, 0 when the
// conflict policy turned the insert into a no-op.
impl SqlStatements {
    pub fn insert_artist(&self, conn: &Connection, artist: &ArtistRow) -> rusqlite::Result<usize> {
        conn.prepare_cached(self.artist_insert)?.execute(params![
            artist.artist_id,
            artist.name,
            artist.location,
            artist.latitude,
            artist.longitude,
        ])
    }

    pub fn insert_song(&self, conn: &Connection, song: &SongRow) -> rusqlite::Result<usize> {
        conn.prepare_cached(self.song_insert)?.execute(params![
            song.song_id,
            song.artist_id,
            song.title,
            song.year,
            song.duration,
        ])
    }

    pub fn upsert_user(&self, conn: &Connection, user: &UserRow) -> rusqlite::Result<usize> {
        conn.prepare_cached(self.user_upsert)?.execute(params![
            user.user_id,
            user.first_name,
            user.last_name,
            user.gender,
            user.level,
        ])
    }

    pub fn insert_time(&self, conn: &Connection, time: &TimeRow) -> rusqlite::Result<usize> {
        conn.prepare_cached(self.time_insert)?.execute(params![
            time.start_time,
            time.hour,
            time.day,
            time.week,
            time.month,
            time.year,
            time.weekday,
        ])
    }

    pub fn insert_songplay(
        &self,
        conn: &Connection,
        songplay: &SongplayRow,
    ) -> rusqlite::Result<usize> {
        conn.prepare_cached(self.songplay_insert)?.execute(params![
            songplay.start_time,
            songplay.user_id,
            songplay.song_id(),
            songplay.artist_id(),
            songplay.session_id,
            songplay.location,
            songplay.user_agent,
        ])
    }

    pub fn find_song(
        &self,
        conn: &Connection,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> rusqlite::Result<Option<ResolvedSong>> {
        conn.prepare_cached(self.song_select)?
            .query_row(params![title, artist_name, duration], |row| {
                Ok(ResolvedSong {
                    song_id: row.get(0)?,
                    artist_id: row.get(1)?,
                })
            })
            .optional()
    }
}
