use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::DeliveryConfig;
use crate::core::{AlertKind, Availability, ItemRuntimeState, classify};
use crate::models::{CheckType, Item};
use crate::plugins::traits::{Notifier, NotificationEvent};
use crate::product_manager::ProductManager;
use crate::scraper::PageFetcher;
use crate::utils::error::Result;

/// Characters of body text logged when no indicator matched.
const UNCLEAR_SAMPLE_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub name: String,
    pub url: String,
    /// `None` when the page could not be fetched.
    pub availability: Option<Availability>,
    pub alerts: Vec<AlertKind>,
    pub notification_failures: usize,
    pub error: Option<String>,
}

impl ItemReport {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub started_at: DateTime<Utc>,
    pub reports: Vec<ItemReport>,
    pub total_time_ms: u64,
}

impl PassSummary {
    pub fn checked(&self) -> usize {
        self.reports.iter().filter(|r| r.success()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| !r.success()).count()
    }

    pub fn alerts_sent(&self) -> usize {
        self.reports
            .iter()
            .map(|r| r.alerts.len() - r.notification_failures)
            .sum()
    }
}

/// Polling context: the fetcher, the alert channel and the per-URL memory
/// that keeps alerts to state transitions.
pub struct StockPoller {
    fetcher: Box<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    products: ProductManager,
    delivery: DeliveryConfig,
    states: HashMap<String, ItemRuntimeState>,
}

impl StockPoller {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
        products: ProductManager,
        delivery: DeliveryConfig,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            products,
            delivery,
            states: HashMap::new(),
        }
    }

    pub fn state(&self, url: &str) -> Option<&ItemRuntimeState> {
        self.states.get(url)
    }

    /// One pass over the item list, re-read from disk. Item failures are
    /// recorded in the summary; only an unreadable list fails the pass.
    pub async fn check_once(&mut self) -> Result<PassSummary> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        let items = self.products.load_items()?;
        info!(
            "Checking {} product(s) - {}",
            items.len(),
            started_at.format("%Y-%m-%d %H:%M:%S")
        );

        let mut reports = Vec::with_capacity(items.len());
        for item in &items {
            reports.push(self.check_item(item).await);
        }

        let summary = PassSummary {
            started_at,
            reports,
            total_time_ms: start_time.elapsed().as_millis() as u64,
        };
        info!(
            checked = summary.checked(),
            failed = summary.failed(),
            alerts = summary.alerts_sent(),
            "Check complete in {} ms",
            summary.total_time_ms
        );
        Ok(summary)
    }

    /// Regions whose rendered text classification reads, rather than source.
    fn capture_selectors(&self, item: &Item) -> Vec<String> {
        let mut selectors = vec![self.delivery.region_selector.clone(), "body".to_string()];
        if item.check_type == CheckType::Css {
            selectors.extend(item.css_selector.clone());
        }
        selectors
    }

    pub async fn check_item(&mut self, item: &Item) -> ItemReport {
        let name = item.display_name().to_string();

        let page = match self.fetcher.fetch(&item.url, &self.capture_selectors(item)).await {
            Ok(page) => page,
            Err(e) => {
                error!(product = %name, "Failed to check: {}", e);
                return ItemReport {
                    name,
                    url: item.url.clone(),
                    availability: None,
                    alerts: Vec::new(),
                    notification_failures: 0,
                    error: Some(e.to_string()),
                };
            }
        };

        let availability = classify(item, &page, &self.delivery);
        match &availability {
            Availability::DeliveryUnavailable => {
                info!(product = %name, "Delivery: not available; Stock: cannot determine")
            }
            Availability::Available(phrase) => {
                info!(product = %name, matched = %phrase, "Delivery: available; Stock: in stock")
            }
            Availability::Unavailable(phrase) => {
                info!(product = %name, matched = %phrase, "Delivery: available; Stock: out of stock")
            }
            Availability::Unknown => warn!(
                product = %name,
                looking_for = ?item
                    .available_indicators
                    .iter()
                    .chain(&item.unavailable_indicators)
                    .collect::<Vec<_>>(),
                "Delivery: available; Stock: status unclear. Page sample: {}...",
                page.body_sample(UNCLEAR_SAMPLE_CHARS)
            ),
        }

        let alerts = self
            .states
            .entry(item.url.clone())
            .or_default()
            .observe(&availability);

        let mut notification_failures = 0;
        for kind in &alerts {
            let matched = match kind {
                AlertKind::InStock => availability.matched_phrase().map(str::to_string),
                _ => None,
            };
            let event = NotificationEvent::new(*kind, &name, &item.url).with_matched(matched);

            // Runtime state has already moved on; a lost alert is not retried
            match self.notifier.notify(&event).await {
                Ok(_) => info!(product = %name, alert = ?kind, "Notification sent via {}", self.notifier.plugin_type()),
                Err(e) => {
                    notification_failures += 1;
                    error!(product = %name, alert = ?kind, "Notification failed: {}", e);
                }
            }
        }

        ItemReport {
            name,
            url: item.url.clone(),
            availability: Some(availability),
            alerts,
            notification_failures,
            error: None,
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.fetcher.shutdown().await
    }
}
