use serde::{Deserialize, Serialize};

use crate::models::CheckType;

pub const DEFAULT_AVAILABLE_INDICATORS: [&str; 3] = ["Buy Now", "Add to Cart", "Add to Bag"];

pub const DEFAULT_UNAVAILABLE_INDICATORS: [&str; 6] = [
    "Notify Me",
    "Out of Stock",
    "Currently unavailable",
    "Not Available",
    "Not Available for your pincode",
    "Not Available at pincode",
];

/// A monitored product page as stored in the item list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub url: String,
    #[serde(default)]
    pub check_type: CheckType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_selector: Option<String>,
    #[serde(default)]
    pub available_indicators: Vec<String>,
    #[serde(default)]
    pub unavailable_indicators: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub url: String,
}

impl Item {
    /// Builds a text-checked item with the stock indicator defaults.
    pub fn new(new_item: NewItem) -> Self {
        Self {
            name: Some(new_item.name),
            url: new_item.url,
            check_type: CheckType::Text,
            css_selector: None,
            available_indicators: DEFAULT_AVAILABLE_INDICATORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            unavailable_indicators: DEFAULT_UNAVAILABLE_INDICATORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.url,
        }
    }
}
