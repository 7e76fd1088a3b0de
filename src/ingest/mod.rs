mod driver;
mod listing;
mod log_file;
mod records;
mod song_file;
mod time_dimension;

pub use driver::{process_data, FileReport, FileTransformer, LoadSummary};
pub use listing::{list_files, JSON_SUFFIX};
pub use log_file::LogFileTransformer;
pub use records::{EventRecord, SongRecord, NEXT_SONG_PAGE};
pub use song_file::{read_song_record, SongFileTransformer};
pub use time_dimension::{start_time_from_millis, time_row};
