// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for identifiers and log filters)
pub const APP_NAME_LOWER: &str = "playlog_dwh";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name looked up in the working directory when --config is absent
pub const CONFIG_FILE_NAME: &str = "dwh.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "DWH_CONFIG";

// =============================================================================
// Environment Variables - Logging
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "DWH_LOG";

// =============================================================================
// Environment Variables - Warehouse Connection
// =============================================================================

/// Environment variable for warehouse host
pub const ENV_HOST: &str = "DWH_HOST";

/// Environment variable for warehouse port
pub const ENV_PORT: &str = "DWH_PORT";

/// Environment variable for warehouse database name
pub const ENV_DATABASE: &str = "DWH_DATABASE";

/// Environment variable for warehouse user
pub const ENV_USER: &str = "DWH_USER";

/// Environment variable for warehouse password
pub const ENV_PASSWORD: &str = "DWH_PASSWORD";

/// Environment variable for statement timeout in seconds (0 disables)
pub const ENV_STATEMENT_TIMEOUT_SECS: &str = "DWH_STATEMENT_TIMEOUT_SECS";

// =============================================================================
// Environment Variables - Source Data
// =============================================================================

/// Environment variable for the event-log S3 prefix
pub const ENV_LOG_DATA: &str = "DWH_LOG_DATA";

/// Environment variable for the song-metadata S3 prefix
pub const ENV_SONG_DATA: &str = "DWH_SONG_DATA";

/// Environment variable for the event-log jsonpaths document
pub const ENV_LOG_JSONPATH: &str = "DWH_LOG_JSONPATH";

/// Environment variable for the S3 region of the source buckets
pub const ENV_REGION: &str = "DWH_REGION";

/// Environment variable for the IAM role ARN used by COPY
pub const ENV_IAM_ROLE: &str = "DWH_IAM_ROLE";

// =============================================================================
// Warehouse Defaults
// =============================================================================

/// Default warehouse host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default warehouse port (Redshift)
pub const DEFAULT_PORT: u16 = 5439;

/// Default database name
pub const DEFAULT_DATABASE: &str = "dev";

/// Default statement timeout in seconds (0 = rely on the engine's policy)
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 0;

/// Default S3 region for the source buckets
pub const DEFAULT_REGION: &str = "us-west-2";
