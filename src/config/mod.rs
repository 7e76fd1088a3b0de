mod file_config;

pub use file_config::FileConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "sparkifydb.sqlite";
pub const DEFAULT_SONG_DATA: &str = "data/song_data";
pub const DEFAULT_LOG_DATA: &str = "data/log_data";

/// CLI arguments that can be used for config resolution.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub song_data: Option<PathBuf>,
    pub log_data: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Root of the catalog files.
    pub song_data: PathBuf,
    /// Root of the event batches.
    pub log_data: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present, defaults fill the rest.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let cwd = std::env::current_dir().context("Failed to read current directory")?;

        let pick = |from_file: Option<String>, from_cli: &Option<PathBuf>, default: &str| {
            let path = from_file
                .map(PathBuf::from)
                .or_else(|| from_cli.clone())
                .unwrap_or_else(|| PathBuf::from(default));
            absolutize(&cwd, path)
        };

        Ok(AppConfig {
            db_path: pick(file.db_path, &cli.db_path, DEFAULT_DB_PATH),
            song_data: pick(file.song_data, &cli.song_data, DEFAULT_SONG_DATA),
            log_data: pick(file.log_data, &cli.log_data, DEFAULT_LOG_DATA),
        })
    }
}

fn absolutize(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
