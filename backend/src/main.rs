//! Command-line entry point: loads the optional YAML config named by the
//! first argument and prints an overview of the stored transactions.

use anyhow::Result;
use env_logger::Env;
use log::info;
use std::env;

use finance_tracker::backend::config::AppConfig;
use finance_tracker::Backend;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match env::args_os().nth(1) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    info!("Starting {}", config.application_name);

    let backend = Backend::new(config)?;
    let service = &backend.transaction_service;

    let transactions = service.get_all()?;
    println!("{}", backend.config.application_name);
    println!("Data file: {}", backend.config.transactions_path().display());
    println!();
    println!("{}", service.summary()?);
    println!("• Balance: {:.2}", service.calculate_balance()?);

    let categories = service.get_categories()?;
    if !categories.is_empty() {
        println!("• Categories: {}", categories.join(", "));
    }

    if !transactions.is_empty() {
        println!();
        for transaction in &transactions {
            println!("{}", transaction);
        }
    }

    Ok(())
}
