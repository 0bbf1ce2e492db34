//! # Backend Module
//!
//! Direct, synchronous access to the finance tracker's domain services and
//! storage for whatever presentation layer sits on top (desktop UI or CLI).
//! - No async, no background work: every call reads or rewrites the JSON file
//! - Configuration is injected at construction; nothing here reads the environment

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod storage;

pub use config::AppConfig;
pub use storage::JsonConnection;

/// Main backend struct that wires storage to the domain services
pub struct Backend {
    pub config: AppConfig,
    pub transaction_service: domain::TransactionService<JsonConnection>,
}

impl Backend {
    /// Open (creating if needed) the data files named by `config`
    pub fn new(config: AppConfig) -> Result<Self> {
        let connection = JsonConnection::from_config(&config).with_context(|| {
            format!(
                "Failed to open transactions file {}",
                config.transactions_path().display()
            )
        })?;
        let connection = Arc::new(connection);

        let export_service = domain::ExportService::new(&config.application_name);
        let transaction_service = domain::TransactionService::new(connection, export_service);

        info!("Backend ready, data in {}", config.data_directory.display());
        Ok(Self {
            config,
            transaction_service,
        })
    }
}
