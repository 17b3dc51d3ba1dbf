use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

use crate::models::{Item, NewItem};
use crate::utils::error::{AppError, Result};

/// Product slug in a Croma path: `/apple-iphone-17-256gb-lavender-/p/317401`.
static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/([^/]+)-/p/").expect("slug pattern is a valid regex")
});

const EXPECTED_HOST: &str = "croma.com";

/// Turns a product URL into a readable name, e.g.
/// `/apple-iphone-17-256gb-lavender-/p/317401` -> `Apple Iphone 17 256gb Lavender`.
pub fn extract_product_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let captures = SLUG_PATTERN.captures(parsed.path())?;
    let slug = captures.get(1)?.as_str();

    let name = slug
        .split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() { None } else { Some(name) }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Owner of the persisted item list.
#[derive(Debug, Clone)]
pub struct ProductManager {
    path: PathBuf,
}

impl ProductManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty list; malformed JSON is an error.
    pub fn load_items(&self) -> Result<Vec<Item>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Item list {} not found, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| AppError::Parse {
            message: format!(
                "{} is corrupted ({}). Please fix it manually.",
                self.path.display(),
                e
            ),
        })
    }

    pub fn save_items(&self, items: &[Item]) -> Result<()> {
        let mut serialized = serde_json::to_string_pretty(items)?;
        serialized.push('\n');
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// Display name of the item already tracking `url`, if any.
    pub fn find_duplicate(&self, url: &str) -> Result<Option<String>> {
        Ok(self
            .load_items()?
            .iter()
            .find(|item| item.url == url)
            .map(|item| item.display_name().to_string()))
    }

    /// Rejects anything that is not an absolute http(s) link. Non-Croma hosts
    /// are allowed with a warning.
    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http") {
            return Err(AppError::Validation(
                "Invalid URL. Please provide a full URL starting with http:// or https://".to_string(),
            ));
        }

        if !url.contains(EXPECTED_HOST) {
            warn!("URL doesn't seem to be from {}: {}", EXPECTED_HOST, url);
        }

        Ok(())
    }

    /// Validates `url`, rejects duplicates and appends a new item with the
    /// default indicators. Returns the item and the new list length.
    pub fn add_item(&self, url: &str, name: &str) -> Result<(Item, usize)> {
        Self::validate_url(url)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Product name is required".to_string()));
        }

        let mut items = self.load_items()?;
        if let Some(existing) = items.iter().find(|item| item.url == url) {
            return Err(AppError::Duplicate {
                url: url.to_string(),
                existing_name: existing.display_name().to_string(),
            });
        }

        let item = Item::new(NewItem {
            name: name.to_string(),
            url: url.to_string(),
        });
        items.push(item.clone());
        self.save_items(&items)?;

        Ok((item, items.len()))
    }
}
