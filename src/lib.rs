pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::budget::{BUDGET_COLLECTION, BudgetTracker};
use crate::core::config::AppConfig;
use crate::providers::GeminiExtractor;
use crate::store::KeyValueStore;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Session,
    Scan { files: Vec<PathBuf> },
    Budget { value: Option<f64> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("SubAudit starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.default_data_path()?;
    let store = KeyValueStore::open(&data_path);
    let mut budget = BudgetTracker::load(store.collection_or_memory(BUDGET_COLLECTION));
    let symbol = config.currency_symbol.as_str();

    match command {
        AppCommand::Session => {
            let extractor = Arc::new(GeminiExtractor::new(&config.gemini())?);
            cli::session::run(cli::session::Session::new(budget, extractor, symbol)).await
        }
        AppCommand::Scan { files } => {
            let extractor = GeminiExtractor::new(&config.gemini())?;
            cli::scan::run(&files, &extractor, &budget, symbol).await
        }
        AppCommand::Budget { value } => cli::budget::run(&mut budget, value, symbol),
    }
}
