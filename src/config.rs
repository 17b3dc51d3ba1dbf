use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub items: ItemsConfig,
    pub scraper: ScraperConfig,
    pub delivery: DeliveryConfig,
    pub scheduler: SchedulerConfig,
    pub telegram: TelegramConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub user_agent: String,
    pub chrome_path: Option<String>,
    /// Fixed wait after each navigation so client-side rendering can settle.
    pub render_wait_ms: u64,
    pub request_timeout: u64,
    pub window_width: u32,
    pub window_height: u32,
}

/// Page regions and phrases that mark an item as undeliverable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    pub region_selector: String,
    pub unavailable_phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base_url: String,
    pub parse_mode: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

pub const DEFAULT_DELIVERY_REGIONS: &str =
    ".delivery-not-available, .not-available-color, .cp-ship-opt, .delivery-option-margin";

pub const DEFAULT_DELIVERY_PHRASES: [&str; 4] = [
    "not available",
    "not available for",
    "not available at",
    "delivery not available",
];

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            items: ItemsConfig {
                path: PathBuf::from("items.json"),
            },
            scraper: ScraperConfig {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                chrome_path: None,
                render_wait_ms: 3000,
                request_timeout: 30,
                window_width: 1920,
                window_height: 1080,
            },
            delivery: DeliveryConfig {
                region_selector: DEFAULT_DELIVERY_REGIONS.to_string(),
                unavailable_phrases: DEFAULT_DELIVERY_PHRASES
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
            },
            scheduler: SchedulerConfig { interval_secs: 60 },
            telegram: TelegramConfig {
                bot_token: None,
                chat_id: None,
                api_base_url: "https://api.telegram.org".to_string(),
                parse_mode: "HTML".to_string(),
                timeout_secs: 10,
            },
            logging: LoggingConfig {
                filter: "stock_watcher=info".to_string(),
                directory: None,
                file_prefix: "stock-watcher.log".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is the normal case
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let defaults = Config::try_from(&AppConfig::default())?;

        let s = Config::builder()
            // Start with built-in defaults
            .add_source(defaults)
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "STOCK_WATCHER__"
            .add_source(Environment::with_prefix("STOCK_WATCHER").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        if config.scraper.chrome_path.is_none() {
            config.scraper.chrome_path = env::var("CHROME_PATH").ok();
        }
        if config.telegram.bot_token.is_none() {
            config.telegram.bot_token = env::var("TELEGRAM_BOT_TOKEN").ok();
        }
        if config.telegram.chat_id.is_none() {
            config.telegram.chat_id = env::var("TELEGRAM_CHAT_ID").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.items.path.as_os_str().is_empty() {
            return Err(ConfigError::Message("Items path must not be empty".into()));
        }

        if self.scraper.window_width == 0 || self.scraper.window_height == 0 {
            return Err(ConfigError::Message("Scraper window size must be greater than 0".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        if self.delivery.region_selector.trim().is_empty() {
            return Err(ConfigError::Message("Delivery region_selector must not be empty".into()));
        }

        if self.delivery.unavailable_phrases.iter().all(|p| p.trim().is_empty()) {
            return Err(ConfigError::Message("Delivery unavailable_phrases must not be empty".into()));
        }

        if self.scheduler.interval_secs == 0 {
            return Err(ConfigError::Message("Scheduler interval_secs must be greater than 0".into()));
        }

        if Url::parse(&self.telegram.api_base_url).is_err() {
            return Err(ConfigError::Message("Invalid Telegram API base URL format".into()));
        }

        if self.telegram.timeout_secs == 0 {
            return Err(ConfigError::Message("Telegram timeout_secs must be greater than 0".into()));
        }

        Ok(())
    }

    /// Both credentials are needed before alerts can leave the process.
    pub fn telegram_enabled(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.telegram.bot_token) && present(&self.telegram.chat_id)
    }
}
