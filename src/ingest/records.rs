//! Typed input records for the two file formats.

use crate::warehouse::models::{ArtistRow, ResolvedSong, SongRow, SongplayRow, UserRow};
use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer};

/// Event page marking a song being played, the only events that are loaded.
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// Integers that some producers write as JSON strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Text(String),
}

fn deserialize_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(year) => i32::try_from(year)
            .map_err(|_| de::Error::custom(format!("year out of range: {}", year))),
        IntOrString::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid year: {:?}", text))),
    }
}

/// Empty strings and nulls mean "no user", logged-out events carry them.
fn deserialize_user_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrString::Int(id)) => Ok(Some(id)),
        Some(IntOrString::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(IntOrString::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid userId: {:?}", text))),
    }
}

/// One catalog document: a song and the artist performing it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub artist_id: String,
    pub title: String,
    #[serde(deserialize_with = "deserialize_year")]
    pub year: i32,
    pub duration: f64,
    pub artist_name: String,
    pub artist_location: String,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

impl SongRecord {
    pub fn song_row(&self) -> SongRow {
        SongRow {
            song_id: self.song_id.clone(),
            artist_id: self.artist_id.clone(),
            title: self.title.clone(),
            year: self.year,
            duration: self.duration,
        }
    }

    pub fn artist_row(&self) -> ArtistRow {
        ArtistRow {
            artist_id: self.artist_id.clone(),
            name: self.artist_name.clone(),
            location: self.artist_location.clone(),
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        }
    }
}

/// One line of an event batch.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Epoch milliseconds.
    pub ts: i64,
    pub page: String,
    #[serde(default, deserialize_with = "deserialize_user_id")]
    pub user_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    /// Song duration in seconds.
    pub length: Option<f64>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl EventRecord {
    pub fn is_next_song(&self) -> bool {
        self.page == NEXT_SONG_PAGE
    }

    /// `None` for events without a user id.
    pub fn user_row(&self) -> Option<UserRow> {
        self.user_id.map(|user_id| UserRow {
            user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender.clone(),
            level: self.level.clone(),
        })
    }

    /// The (title, artist name, duration) triple used to find the song, if complete.
    pub fn song_lookup_key(&self) -> Option<(&str, &str, f64)> {
        match (&self.song, &self.artist, self.length) {
            (Some(song), Some(artist), Some(length)) => {
                Some((song.as_str(), artist.as_str(), length))
            }
            _ => None,
        }
    }

    pub fn songplay_row(
        &self,
        start_time: NaiveDateTime,
        song: Option<ResolvedSong>,
    ) -> SongplayRow {
        SongplayRow {
            start_time,
            user_id: self.user_id,
            song,
            session_id: self.session_id,
            location: self.location.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}
