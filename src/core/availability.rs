//! Availability classification for a rendered product page.
//!
//! Delivery is checked first; only a deliverable page gets a stock verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::DeliveryConfig;
use crate::models::{CheckType, Item};
use crate::scraper::RenderedPage;

/// Outcome of checking one item, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// A delivery region says the item cannot be delivered; stock is not assessed.
    DeliveryUnavailable,
    /// An available indicator matched.
    Available(String),
    /// No available indicator matched, an unavailable one did.
    Unavailable(String),
    /// Neither indicator list matched.
    Unknown,
}

impl Availability {
    pub fn delivery_available(&self) -> bool {
        !matches!(self, Availability::DeliveryUnavailable)
    }

    pub fn matched_phrase(&self) -> Option<&str> {
        match self {
            Availability::Available(phrase) | Availability::Unavailable(phrase) => Some(phrase),
            _ => None,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::DeliveryUnavailable => write!(f, "cannot determine (delivery unavailable)"),
            Availability::Available(phrase) => write!(f, "in stock (matched \"{}\")", phrase),
            Availability::Unavailable(phrase) => write!(f, "out of stock (matched \"{}\")", phrase),
            Availability::Unknown => write!(f, "status unclear"),
        }
    }
}

/// Result of scanning the delivery regions of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryScan {
    pub unavailable: bool,
    /// Lowercased region text seen up to and including the deciding region.
    pub region_text: String,
}

/// First phrase of `phrases` contained in `haystack`, ignoring case.
/// `haystack` must already be lowercased.
pub fn first_match<'a, I>(haystack: &str, phrases: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    phrases
        .into_iter()
        .map(String::as_str)
        .filter(|phrase| !phrase.is_empty())
        .find(|phrase| haystack.contains(&phrase.to_lowercase()))
}

/// Walks the delivery regions in document order and stops at the first one
/// that carries a "not available" phrase. A missing or unparsable region
/// selector counts as "no regions".
pub fn scan_delivery(page: &RenderedPage, config: &DeliveryConfig) -> DeliveryScan {
    let regions = page.select_texts(&config.region_selector).unwrap_or_default();

    let mut scan = DeliveryScan::default();
    for region in regions {
        let text = region.to_lowercase();
        if text.is_empty() {
            continue;
        }
        scan.region_text.push(' ');
        scan.region_text.push_str(&text);
        if first_match(&text, &config.unavailable_phrases).is_some() {
            scan.unavailable = true;
            break;
        }
    }
    scan
}

/// Text the stock indicators are matched against.
pub fn stock_search_text(item: &Item, page: &RenderedPage, delivery: &DeliveryScan) -> String {
    match item.check_type {
        CheckType::Css => item
            .css_selector
            .as_deref()
            .and_then(|selector| page.first_text(selector).ok())
            .map(|text| text.to_lowercase())
            .unwrap_or_else(|| page.source_text()),
        CheckType::Text => {
            let mut text = page.source_text();
            if !delivery.region_text.is_empty() {
                text.push(' ');
                text.push_str(&delivery.region_text);
            }
            text
        }
    }
}

/// Available indicators are consulted before unavailable ones.
pub fn classify_stock(item: &Item, search_text: &str) -> Availability {
    if let Some(phrase) = first_match(search_text, &item.available_indicators) {
        return Availability::Available(phrase.to_string());
    }
    if let Some(phrase) = first_match(search_text, &item.unavailable_indicators) {
        return Availability::Unavailable(phrase.to_string());
    }
    Availability::Unknown
}

pub fn classify(item: &Item, page: &RenderedPage, delivery_config: &DeliveryConfig) -> Availability {
    let delivery = scan_delivery(page, delivery_config);
    if delivery.unavailable {
        return Availability::DeliveryUnavailable;
    }
    let search_text = stock_search_text(item, page, &delivery);
    classify_stock(item, &search_text)
}
