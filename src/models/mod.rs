use serde::{Deserialize, Serialize};

pub mod item;

pub use item::*;

/// How the stock search text is built for an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum CheckType {
    /// Whole rendered page source.
    #[default]
    Text,
    /// Text of the first element matching the item's `css_selector`.
    Css,
}

impl From<String> for CheckType {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("css") {
            CheckType::Css
        } else {
            CheckType::Text
        }
    }
}
