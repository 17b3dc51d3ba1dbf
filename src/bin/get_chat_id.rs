use anyhow::{Context, Result};
use clap::Parser;

use stock_watcher::AppConfig;
use stock_watcher::add_product::InquirePrompter;
use stock_watcher::chat_lookup::wait_then_lookup;
use stock_watcher::plugins::TelegramNotifier;
use stock_watcher::utils::logging::init_tracing;

#[derive(Parser)]
#[command(author, version, about = "Prints the chat id of the latest message sent to the bot")]
struct Args {
    /// Query the bot immediately instead of waiting for Enter
    #[arg(long)]
    no_wait: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging);

    let notifier = TelegramNotifier::new(&config.telegram)
        .context("Set TELEGRAM_BOT_TOKEN in your environment or .env file")?;

    println!("{}", "=".repeat(60));
    println!("Telegram Chat ID Finder");
    println!("{}", "=".repeat(60));
    println!("\n1. Open Telegram and find your bot");
    println!("2. Send any message to the bot (e.g. /start)");
    println!("3. For a group, add the bot and send a message in the group");

    println!();
    let prompter = (!args.no_wait).then_some(InquirePrompter);

    match wait_then_lookup(&notifier, prompter).await {
        Ok(Some(chat)) => {
            println!("\n✅ Found your chat!");
            println!("   Chat ID: {}", chat.id);
            println!("   Type: {}", chat.chat_type);
            println!("   Name: {}", chat.name);
            println!("\nAdd this to your .env file:");
            println!("TELEGRAM_CHAT_ID=\"{}\"", chat.id);
        }
        Ok(None) => {
            println!("\n❌ No messages found.");
            println!("Send a message to your bot first, then run this again.");
        }
        Err(e) => {
            println!("\n❌ Error: {}", e);
        }
    }

    Ok(())
}
