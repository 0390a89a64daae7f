use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REGION,
    DEFAULT_STATEMENT_TIMEOUT_SECS, ENV_DATABASE, ENV_PASSWORD, ENV_USER,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Warehouse connection section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct WarehouseFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Statement timeout in seconds, 0 to disable (default: 0)
    pub statement_timeout_secs: Option<u64>,
}

/// Source data section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StorageFileConfig {
    /// S3 prefix holding the raw event-log JSON files
    pub log_data: Option<String>,
    /// S3 prefix holding the raw song-metadata JSON files
    pub song_data: Option<String>,
    /// S3 location of the jsonpaths document mapping event-log fields
    pub log_jsonpath: Option<String>,
    /// S3 region of the source buckets
    pub region: Option<String>,
    /// IAM role ARN the warehouse assumes when reading from S3
    pub iam_role: Option<String>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub warehouse: Option<WarehouseFileConfig>,
    pub storage: Option<StorageFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Resolved Config
// =============================================================================

/// Warehouse session parameters, fully resolved
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Statement timeout in seconds, 0 to rely on the engine's policy
    pub statement_timeout_secs: u64,
}

/// Source data locations for the staging bulk load.
///
/// Kept optional at resolution time: the bulk loader validates these when it
/// builds the COPY commands, so a schema-only run never requires them and a
/// bad value surfaces when the load runs, not at startup.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub log_data: Option<String>,
    pub song_data: Option<String>,
    pub log_jsonpath: Option<String>,
    pub region: String,
    pub iam_role: Option<String>,
}

/// Complete application configuration, resolved once at startup and passed
/// explicitly into the pipeline. Precedence: CLI/env > config file > defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub warehouse: WarehouseConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Resolve configuration from the config file and CLI arguments
    pub fn load(cli: &CliConfig) -> Result<Self> {
        let file = Self::load_file(cli)?;
        let wh_file = file.warehouse.clone().unwrap_or_default();
        let st_file = file.storage.clone().unwrap_or_default();

        let user = cli
            .user
            .clone()
            .or(wh_file.user)
            .filter(|u| !u.is_empty())
            .with_context(|| format!("Warehouse user is required (--user or {})", ENV_USER))?;
        let password = cli.password.clone().or(wh_file.password).with_context(|| {
            format!("Warehouse password is required (--password or {})", ENV_PASSWORD)
        })?;

        let warehouse = WarehouseConfig {
            host: cli
                .host
                .clone()
                .or(wh_file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(wh_file.port).unwrap_or(DEFAULT_PORT),
            database: cli
                .database
                .clone()
                .or(wh_file.database)
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            user,
            password,
            statement_timeout_secs: cli
                .statement_timeout_secs
                .or(wh_file.statement_timeout_secs)
                .unwrap_or(DEFAULT_STATEMENT_TIMEOUT_SECS),
        };

        if warehouse.database.is_empty() {
            bail!("Warehouse database is required (--database or {})", ENV_DATABASE);
        }

        let storage = StorageConfig {
            log_data: cli.log_data.clone().or(st_file.log_data),
            song_data: cli.song_data.clone().or(st_file.song_data),
            log_jsonpath: cli.log_jsonpath.clone().or(st_file.log_jsonpath),
            region: cli
                .region
                .clone()
                .or(st_file.region)
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            iam_role: cli.iam_role.clone().or(st_file.iam_role),
        };

        tracing::debug!(
            host = %warehouse.host,
            port = warehouse.port,
            database = %warehouse.database,
            "Configuration resolved"
        );

        Ok(Self { warehouse, storage })
    }

    /// Load the config file named by --config, or the default file if present
    fn load_file(cli: &CliConfig) -> Result<FileConfig> {
        let path = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                path.clone()
            }
            None => {
                let default = PathBuf::from(CONFIG_FILE_NAME);
                if !default.exists() {
                    return Ok(FileConfig::default());
                }
                default
            }
        };

        let config = FileConfig::load_from_file(&path)?;
        config.warn_unknown_fields();
        Ok(config)
    }
}
