//! Staging bulk load
//!
//! Builds the engine-native COPY commands that stream the raw JSON files
//! from S3 into the two staging tables. Commands are assembled here, at call
//! time, from the storage configuration: a missing or malformed location
//! surfaces as a configuration error when the load runs, never at startup.
//!
//! Row-level policy (skip vs. abort on a malformed record) belongs to the
//! engine; the pipeline treats any COPY failure as fatal to the run.

use crate::core::config::StorageConfig;

use super::error::WarehouseError;

/// A COPY command targeting one staging table
#[derive(Debug, Clone)]
pub struct CopyCommand {
    pub table: &'static str,
    pub location: String,
    pub sql: String,
}

/// Build the staging COPY commands, one per staging table, in load order.
///
/// The event log lines use camelCase field names and irregular nesting, so
/// they are mapped by a jsonpaths document; the song metadata field names
/// already match the staging columns and load with JSON 'auto'. Timestamps
/// in both sources are epoch milliseconds.
pub fn copy_commands(storage: &StorageConfig) -> Result<Vec<CopyCommand>, WarehouseError> {
    let log_data = require_s3_uri(storage.log_data.as_deref(), "storage.log_data")?;
    let song_data = require_s3_uri(storage.song_data.as_deref(), "storage.song_data")?;
    let log_jsonpath = require_s3_uri(storage.log_jsonpath.as_deref(), "storage.log_jsonpath")?;
    let iam_role = require_value(storage.iam_role.as_deref(), "storage.iam_role")?;
    let region = require_value(Some(storage.region.as_str()), "storage.region")?;

    let events = CopyCommand {
        table: "staging_events",
        location: log_data.to_string(),
        sql: format!(
            "COPY staging_events\n\
             FROM '{log_data}'\n\
             IAM_ROLE '{iam_role}'\n\
             REGION '{region}'\n\
             FORMAT AS JSON '{log_jsonpath}'\n\
             TIMEFORMAT AS 'epochmillisecs'\n\
             COMPUPDATE OFF STATUPDATE OFF"
        ),
    };

    let songs = CopyCommand {
        table: "staging_songs",
        location: song_data.to_string(),
        sql: format!(
            "COPY staging_songs\n\
             FROM '{song_data}'\n\
             IAM_ROLE '{iam_role}'\n\
             REGION '{region}'\n\
             FORMAT AS JSON 'auto'\n\
             TIMEFORMAT AS 'epochmillisecs'\n\
             COMPUPDATE OFF STATUPDATE OFF"
        ),
    };

    Ok(vec![events, songs])
}

/// Require a present, non-empty value that is safe to splice into COPY text
fn require_value<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, WarehouseError> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WarehouseError::Config(format!("{name} is required")))?;
    if value.contains('\'') {
        return Err(WarehouseError::Config(format!(
            "{name} must not contain quote characters: {value}"
        )));
    }
    Ok(value)
}

/// Require an S3 location (COPY only accepts s3:// sources here)
fn require_s3_uri<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, WarehouseError> {
    let value = require_value(value, name)?;
    if !value.starts_with("s3://") {
        return Err(WarehouseError::Config(format!(
            "{name} must be an s3:// location, got: {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> StorageConfig {
        StorageConfig {
            log_data: Some("s3://bucket/log_data".to_string()),
            song_data: Some("s3://bucket/song_data".to_string()),
            log_jsonpath: Some("s3://bucket/log_json_path.json".to_string()),
            region: "us-west-2".to_string(),
            iam_role: Some("arn:aws:iam::123456789012:role/dwh".to_string()),
        }
    }

    #[test]
    fn test_one_copy_per_staging_table() {
        let commands = copy_commands(&storage()).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].table, "staging_events");
        assert_eq!(commands[1].table, "staging_songs");
    }

    #[test]
    fn test_events_copy_uses_jsonpaths() {
        let commands = copy_commands(&storage()).unwrap();
        let events = &commands[0].sql;
        assert!(events.contains("FROM 's3://bucket/log_data'"));
        assert!(events.contains("FORMAT AS JSON 's3://bucket/log_json_path.json'"));
        assert!(events.contains("TIMEFORMAT AS 'epochmillisecs'"));
        assert!(events.contains("IAM_ROLE 'arn:aws:iam::123456789012:role/dwh'"));
        assert!(events.contains("REGION 'us-west-2'"));
    }

    #[test]
    fn test_songs_copy_uses_auto_mapping() {
        let commands = copy_commands(&storage()).unwrap();
        let songs = &commands[1].sql;
        assert!(songs.contains("FROM 's3://bucket/song_data'"));
        assert!(songs.contains("FORMAT AS JSON 'auto'"));
    }

    #[test]
    fn test_missing_log_data_rejected() {
        let config = StorageConfig {
            log_data: None,
            ..storage()
        };
        let err = copy_commands(&config).unwrap_err();
        assert!(err.to_string().contains("storage.log_data is required"));
    }

    #[test]
    fn test_missing_iam_role_rejected() {
        let config = StorageConfig {
            iam_role: None,
            ..storage()
        };
        let err = copy_commands(&config).unwrap_err();
        assert!(err.to_string().contains("storage.iam_role is required"));
    }

    #[test]
    fn test_non_s3_location_rejected() {
        let config = StorageConfig {
            song_data: Some("file:///tmp/songs".to_string()),
            ..storage()
        };
        let err = copy_commands(&config).unwrap_err();
        assert!(err.to_string().contains("must be an s3:// location"));
    }

    #[test]
    fn test_quote_character_rejected() {
        let config = StorageConfig {
            iam_role: Some("arn:aws:iam::1:role/x' OWNER TO evil; --".to_string()),
            ..storage()
        };
        let err = copy_commands(&config).unwrap_err();
        assert!(err.to_string().contains("quote characters"));
    }

    #[test]
    fn test_empty_location_rejected() {
        let config = StorageConfig {
            log_jsonpath: Some(String::new()),
            ..storage()
        };
        let err = copy_commands(&config).unwrap_err();
        assert!(err.to_string().contains("storage.log_jsonpath is required"));
    }
}
