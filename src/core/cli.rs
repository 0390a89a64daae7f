use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DATABASE, ENV_HOST, ENV_IAM_ROLE, ENV_LOG_DATA, ENV_LOG_JSONPATH,
    ENV_PASSWORD, ENV_PORT, ENV_REGION, ENV_SONG_DATA, ENV_STATEMENT_TIMEOUT_SECS, ENV_USER,
};

#[derive(Parser)]
#[command(name = "playlog-dwh")]
#[command(version, about = "Star-schema warehouse loader for playlog event data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Warehouse host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Warehouse port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Warehouse database name
    #[arg(long, global = true, env = ENV_DATABASE)]
    pub database: Option<String>,

    /// Warehouse user
    #[arg(long, global = true, env = ENV_USER)]
    pub user: Option<String>,

    /// Warehouse password
    #[arg(long, global = true, env = ENV_PASSWORD)]
    pub password: Option<String>,

    /// Statement timeout in seconds (0 disables)
    #[arg(long, global = true, env = ENV_STATEMENT_TIMEOUT_SECS)]
    pub statement_timeout_secs: Option<u64>,

    /// S3 prefix holding the raw event-log JSON files
    #[arg(long, global = true, env = ENV_LOG_DATA)]
    pub log_data: Option<String>,

    /// S3 prefix holding the raw song-metadata JSON files
    #[arg(long, global = true, env = ENV_SONG_DATA)]
    pub song_data: Option<String>,

    /// S3 location of the jsonpaths document mapping event-log fields
    #[arg(long, global = true, env = ENV_LOG_JSONPATH)]
    pub log_jsonpath: Option<String>,

    /// S3 region of the source buckets
    #[arg(long, global = true, env = ENV_REGION)]
    pub region: Option<String>,

    /// IAM role ARN the warehouse assumes when reading from S3
    #[arg(long, global = true, env = ENV_IAM_ROLE)]
    pub iam_role: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Drop and recreate every warehouse table (staging, dimensions, fact)
    CreateTables,
    /// Bulk-load staging from S3, then populate the star schema.
    /// Assumes the schema already exists (run create-tables first).
    Etl,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub statement_timeout_secs: Option<u64>,
    pub log_data: Option<String>,
    pub song_data: Option<String>,
    pub log_jsonpath: Option<String>,
    pub region: Option<String>,
    pub iam_role: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        host: cli.host,
        port: cli.port,
        database: cli.database,
        user: cli.user,
        password: cli.password,
        statement_timeout_secs: cli.statement_timeout_secs,
        log_data: cli.log_data,
        song_data: cli.song_data,
        log_jsonpath: cli.log_jsonpath,
        region: cli.region,
        iam_role: cli.iam_role,
    };
    (config, cli.command)
}
