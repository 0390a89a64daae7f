//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;

pub use cli::{CliConfig, Commands};
pub use config::{AppConfig, StorageConfig, WarehouseConfig};
