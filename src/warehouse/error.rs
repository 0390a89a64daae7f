//! Warehouse pipeline error types

use thiserror::Error;

use super::Phase;

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Statement failed during {phase} on {table}: {source}")]
    Query {
        phase: Phase,
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Load failed for {table} from {location}: {source}")]
    Load {
        table: &'static str,
        location: String,
        #[source]
        source: sqlx::Error,
    },
}
