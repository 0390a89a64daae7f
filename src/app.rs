//! Application entry points

use anyhow::{Context, Result};

use crate::core::cli::{self, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::warehouse::WarehouseService;

pub struct App;

impl App {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        let (cli_config, command) = cli::parse();
        tracing::debug!(command = ?command, "Application starting");

        let config = AppConfig::load(&cli_config)?;

        match command {
            Commands::CreateTables => Self::create_tables(&config).await,
            Commands::Etl => Self::run_etl(&config).await,
        }
    }

    /// Rebuild the schema without touching the source data
    async fn create_tables(config: &AppConfig) -> Result<()> {
        let warehouse = WarehouseService::connect(&config.warehouse)
            .await
            .context("Failed to connect to the warehouse")?;
        let result = warehouse.create_tables().await;
        warehouse.close().await;
        result.context("Schema reset failed")
    }

    /// Load staging and populate the star schema against an existing schema
    async fn run_etl(config: &AppConfig) -> Result<()> {
        let warehouse = WarehouseService::connect(&config.warehouse)
            .await
            .context("Failed to connect to the warehouse")?;
        let result = warehouse.run_etl(&config.storage).await;
        warehouse.close().await;
        result.context("ETL run failed")
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}
