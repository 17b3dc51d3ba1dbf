pub mod add_product;
pub mod chat_lookup;
pub mod config;
pub mod core;
pub mod models;
pub mod plugins;
pub mod poller;
pub mod product_manager;
pub mod scheduler;
pub mod scraper;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
