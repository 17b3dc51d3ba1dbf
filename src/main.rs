use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use stock_watcher::AppConfig;
use stock_watcher::plugins::{LogNotifier, Notifier, TelegramNotifier};
use stock_watcher::poller::StockPoller;
use stock_watcher::product_manager::ProductManager;
use stock_watcher::scheduler::PollScheduler;
use stock_watcher::scraper::ChromeFetcher;
use stock_watcher::utils::logging::init_tracing;

#[derive(Parser)]
#[command(author, version, about = "Watches product pages and alerts when they come back in stock")]
struct Args {
    /// Run a single check and exit
    #[arg(long)]
    once: bool,

    /// Item list to watch, overrides `items.path`
    #[arg(long)]
    items: Option<PathBuf>,
}

fn build_notifier(config: &AppConfig) -> Result<Arc<dyn Notifier>> {
    if config.telegram_enabled() {
        let notifier = TelegramNotifier::new(&config.telegram)?;
        info!("Telegram notifications enabled");
        Ok(Arc::new(notifier))
    } else {
        warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set, alerts will only be logged");
        Ok(Arc::new(LogNotifier::new()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if let Some(items) = args.items {
        config.items.path = items;
    }

    let _log_guard = init_tracing(&config.logging);

    info!("Starting stock watcher...");
    info!("Items file: {}", config.items.path.display());

    let fetcher = ChromeFetcher::new(&config.scraper).context("Failed to launch browser")?;
    let notifier = build_notifier(&config)?;
    let poller = Arc::new(Mutex::new(StockPoller::new(
        Box::new(fetcher),
        notifier,
        ProductManager::new(&config.items.path),
        config.delivery.clone(),
    )));

    let mut scheduler = PollScheduler::new(Arc::clone(&poller), &config.scheduler).await?;

    if let Err(e) = scheduler.run_now().await {
        error!("Check failed: {}", e);
    }

    if !args.once {
        scheduler.start().await?;
        tokio::signal::ctrl_c().await?;
        info!("Shutting down...");
        scheduler.shutdown().await?;
    }

    if let Err(e) = poller.lock().await.shutdown().await {
        warn!("Failed to close browser: {}", e);
    }
    info!("Browser closed");

    Ok(())
}
