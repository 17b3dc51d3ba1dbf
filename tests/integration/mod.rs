// Shared fixtures for the integration suite

pub mod poller_tests;
pub mod telegram_tests;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use stock_watcher::{
    AppConfig, AppError,
    config::TelegramConfig,
    plugins::{Notifier, TelegramNotifier},
    poller::StockPoller,
    product_manager::ProductManager,
    scraper::{PageFetcher, RenderedPage},
};
use tempfile::TempDir;
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "123456:test-token";
pub const TEST_CHAT_ID: &str = "8186826029";

pub const KETTLE_URL: &str = "https://www.croma.com/philips-kettle-/p/200001";
pub const IPHONE_URL: &str = "https://www.croma.com/apple-iphone-17-256gb-lavender-/p/317401";

/// Serves canned bodies in order, per URL. A `None` entry, or an exhausted
/// queue, is a navigation failure.
#[derive(Default, Clone)]
pub struct ScriptedFetcher {
    pages: Arc<Mutex<Vec<(String, VecDeque<Option<String>>)>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, url: &str, bodies: &[Option<&str>]) -> Self {
        self.pages.lock().unwrap().push((
            url.to_string(),
            bodies.iter().map(|b| b.map(str::to_string)).collect(),
        ));
        self
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _selectors: &[String]) -> stock_watcher::Result<RenderedPage> {
        let mut pages = self.pages.lock().unwrap();
        let body = pages
            .iter_mut()
            .find(|(u, _)| u == url)
            .and_then(|(_, bodies)| bodies.pop_front())
            .flatten();

        match body {
            Some(body) => Ok(RenderedPage::new(url, format!("<html><body>{}</body></html>", body))),
            None => Err(AppError::Scraping(format!("Navigation to {} failed", url))),
        }
    }
}

pub fn telegram_config(server: &MockServer) -> TelegramConfig {
    let mut config = AppConfig::default().telegram;
    config.api_base_url = server.uri();
    config.bot_token = Some(TEST_TOKEN.to_string());
    config.chat_id = Some(TEST_CHAT_ID.to_string());
    config.timeout_secs = 5;
    config
}

pub fn telegram_notifier(server: &MockServer) -> anyhow::Result<TelegramNotifier> {
    Ok(TelegramNotifier::new(&telegram_config(server))?)
}

pub fn bot_path(method: &str) -> String {
    format!("/bot{}/{}", TEST_TOKEN, method)
}

/// Item list in a fresh temp dir, pre-filled with `items` as (url, name).
pub fn create_test_products(items: &[(&str, &str)]) -> anyhow::Result<(TempDir, ProductManager)> {
    let dir = TempDir::new()?;
    let manager = ProductManager::new(dir.path().join("items.json"));
    for (url, name) in items {
        manager.add_item(url, name)?;
    }
    Ok((dir, manager))
}

pub fn create_test_poller(
    fetcher: ScriptedFetcher,
    notifier: Arc<dyn Notifier>,
    manager: ProductManager,
) -> StockPoller {
    StockPoller::new(Box::new(fetcher), notifier, manager, AppConfig::default().delivery)
}
