//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestData, song_1};
//! use sparkify_etl::Warehouse;
//!
//! #[test]
//! fn test_load_one_song() {
//!     let data = TestData::new();
//!     data.write_song("song.json", &song_1());
//!     let mut warehouse = Warehouse::open(data.db_path()).unwrap();
//!     warehouse.load_song_data(data.song_root()).unwrap();
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::*;

use rusqlite::Connection;

/// Runs a single-value query, for assertions.
#[allow(dead_code)]
pub fn query_one<T: rusqlite::types::FromSql>(conn: &Connection, sql: &str) -> T {
    conn.query_row(sql, [], |r| r.get(0))
        .unwrap_or_else(|e| panic!("query failed: {}: {}", sql, e))
}
