use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use stock_watcher::AppConfig;
use stock_watcher::add_product::{InquirePrompter, ProductAdder};
use stock_watcher::product_manager::ProductManager;
use stock_watcher::utils::logging::init_tracing;

#[derive(Parser)]
#[command(author, version, about = "Adds a product page to the watched item list")]
struct Args {
    /// Product URL; prompts interactively when omitted
    url: Option<String>,

    /// Custom product name; detected from the URL when omitted
    name: Option<String>,

    /// Item list to update, overrides `items.path`
    #[arg(long)]
    items: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging);

    let manager = ProductManager::new(args.items.unwrap_or(config.items.path));

    println!("{}", "=".repeat(60));
    println!("🛒 Croma Product Adder");
    println!("{}", "=".repeat(60));

    let mut adder = ProductAdder::new(&manager, InquirePrompter);
    let outcome = match args.url.as_deref() {
        Some(url) => adder.add_from_args(url.trim(), args.name.as_deref().map(str::trim)),
        None => adder.run_interactive(),
    };

    match outcome {
        Ok(outcome) if outcome.is_added() => Ok(ExitCode::SUCCESS),
        Ok(_) => Ok(ExitCode::FAILURE),
        Err(e) => {
            println!("\n❌ Failed to add product: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
