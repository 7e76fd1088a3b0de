pub mod models;
pub mod schema;
pub mod statements;
mod store;

pub use models::{ArtistRow, ResolvedSong, SongRow, SongplayRow, TableCounts, TimeRow, UserRow};
pub use statements::{SqlStatements, SPARKIFY_STATEMENTS};
pub use store::{open_connection, Warehouse};
