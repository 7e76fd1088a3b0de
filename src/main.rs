use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sparkify_etl::warehouse::{open_connection, schema};
use sparkify_etl::{AppConfig, CliConfig, FileConfig, Warehouse};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
struct CliArgs {
    /// Path to a TOML config file, its values override the options below.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite warehouse database file.
    #[clap(long, global = true, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Root directory of the song catalog files.
    #[clap(long, global = true, value_parser = parse_path)]
    pub song_data: Option<PathBuf>,

    /// Root directory of the event log files.
    #[clap(long, global = true, value_parser = parse_path)]
    pub log_data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Command {
    /// Loads the song data, then the log data. This is the default.
    #[default]
    Load,

    /// Creates the star schema tables if they don't exist.
    CreateTables,

    /// Drops the star schema tables if they exist.
    DropTables,

    /// Drops and recreates the star schema tables, all rows are lost.
    ResetTables,

    /// Shows the number of rows in each table.
    Stats,
}

fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Load => {
            let mut warehouse = Warehouse::open(&config.db_path)?;
            warehouse.load_song_data(&config.song_data)?;
            warehouse.load_log_data(&config.log_data)?;
            warehouse.close()
        }
        Command::CreateTables => {
            let conn = open_connection(&config.db_path)?;
            schema::create_all(&conn)?;
            info!("Created tables in {:?}", config.db_path);
            Ok(())
        }
        Command::DropTables => {
            let conn = open_connection(&config.db_path)?;
            schema::drop_all(&conn)?;
            info!("Dropped tables in {:?}", config.db_path);
            Ok(())
        }
        Command::ResetTables => {
            let conn = open_connection(&config.db_path)?;
            schema::drop_all(&conn)?;
            schema::create_all(&conn)?;
            info!("Recreated tables in {:?}", config.db_path);
            Ok(())
        }
        Command::Stats => {
            let warehouse = Warehouse::open(&config.db_path)?;
            let counts = warehouse.table_counts()?;
            println!("songs:     {}", counts.songs);
            println!("artists:   {}", counts.artists);
            println!("users:     {}", counts.users);
            println!("times:     {}", counts.times);
            println!("songplays: {}", counts.songplays);
            warehouse.close()
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.db_path.clone(),
        song_data: cli_args.song_data.clone(),
        log_data: cli_args.log_data.clone(),
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let command = cli_args.command.unwrap_or_default();
    info!("Running {:?} against {:?}", command, config.db_path);
    run(command, &config)
}
