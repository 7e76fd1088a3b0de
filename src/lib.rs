//! Sparkify ETL library
//!
//! Loads the song catalog and the user activity logs into a SQLite star
//! schema. The `sparkify-etl` binary is a thin CLI over this crate.

pub mod config;
pub mod error;
pub mod ingest;
pub mod sqlite_persistence;
pub mod warehouse;

// Re-export commonly used types for convenience
pub use config::{AppConfig, CliConfig, FileConfig};
pub use error::EtlError;
pub use ingest::{FileReport, LoadSummary};
pub use warehouse::{TableCounts, Warehouse};
