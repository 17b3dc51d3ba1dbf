//! Command-line and interactive flows for adding products to the item list.

use inquire::{Confirm, Text};

use crate::models::Item;
use crate::product_manager::{ProductManager, extract_product_name_from_url};
use crate::utils::error::{AppError, Result};

/// Source of answers for the interactive flow.
pub trait Prompter {
    fn input(&mut self, message: &str) -> Result<String>;
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

/// Terminal prompts.
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn input(&mut self, message: &str) -> Result<String> {
        Ok(Text::new(message).prompt()?.trim().to_string())
    }

    fn confirm(&mut self, message: &str) -> Result<bool> {
        Ok(Confirm::new(message).with_default(false).prompt()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added { item: Item, total: usize },
    /// Invalid or duplicate URL.
    Rejected,
    Cancelled,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added { .. })
    }
}

fn banner() -> String {
    "=".repeat(60)
}

pub struct ProductAdder<'a, P: Prompter> {
    manager: &'a ProductManager,
    prompter: P,
}

impl<'a, P: Prompter> ProductAdder<'a, P> {
    pub fn new(manager: &'a ProductManager, prompter: P) -> Self {
        Self { manager, prompter }
    }

    /// `add-product <url> [name]`: one attempt, no replacement prompts.
    pub fn add_from_args(&mut self, url: &str, custom_name: Option<&str>) -> Result<AddOutcome> {
        self.attempt(url, custom_name.map(str::to_string), false)
    }

    /// Prompts for a URL and keeps asking for a replacement link until a
    /// product is added or the user quits.
    pub fn run_interactive(&mut self) -> Result<AddOutcome> {
        println!("Enter Croma product URL:");
        let mut url = self.prompter.input("URL:")?;
        if url.is_empty() {
            println!("❌ URL is required.");
            return Ok(AddOutcome::Cancelled);
        }

        loop {
            let name = self.choose_name(&url)?;
            match self.attempt(&url, name, true)? {
                AddOutcome::Rejected => match self.ask_for_new_link()? {
                    Some(next) => url = next,
                    None => return Ok(AddOutcome::Cancelled),
                },
                outcome => return Ok(outcome),
            }
        }
    }

    /// Offers the name detected from the URL, or a custom one. `None` means
    /// "work it out again when adding".
    fn choose_name(&mut self, url: &str) -> Result<Option<String>> {
        let Some(auto_name) = extract_product_name_from_url(url) else {
            return Ok(None);
        };

        println!("\n📦 Auto-detected product name: {}", auto_name);
        if self.prompter.confirm("Use this name?")? {
            return Ok(Some(auto_name));
        }

        let custom = self.prompter.input("Enter custom name:")?;
        Ok(if custom.is_empty() { None } else { Some(custom) })
    }

    fn ask_for_new_link(&mut self) -> Result<Option<String>> {
        loop {
            println!("\n{}", "-".repeat(60));
            let url = self.prompter.input("Enter new Croma product URL (or 'q' to quit):")?;

            if url.eq_ignore_ascii_case("q") {
                println!("❌ Cancelled.");
                return Ok(None);
            }
            if url.is_empty() {
                println!("❌ URL cannot be empty. Please try again.");
                continue;
            }
            return Ok(Some(url));
        }
    }

    fn attempt(&mut self, url: &str, custom_name: Option<String>, interactive: bool) -> Result<AddOutcome> {
        if let Err(e) = ProductManager::validate_url(url) {
            println!("❌ {}", e);
            return Ok(AddOutcome::Rejected);
        }

        // Checked before asking for a name so the user is not prompted for nothing
        if let Some(existing_name) = self.manager.find_duplicate(url)? {
            self.report_duplicate(url, &existing_name, interactive);
            return Ok(AddOutcome::Rejected);
        }

        let name = match custom_name.or_else(|| extract_product_name_from_url(url)) {
            Some(name) => name,
            None => {
                let manual = self
                    .prompter
                    .input("Could not auto-detect product name. Enter name manually:")?;
                if manual.is_empty() {
                    println!("❌ Product name is required. Cancelled.");
                    return Ok(AddOutcome::Cancelled);
                }
                manual
            }
        };

        match self.manager.add_item(url, &name) {
            Ok((item, total)) => {
                println!("✅ Product added successfully!");
                println!("   Name: {}", item.display_name());
                println!("   URL: {}", item.url);
                println!("\n📝 {} product(s) in {}", total, self.manager.path().display());
                Ok(AddOutcome::Added { item, total })
            }
            Err(AppError::Duplicate { existing_name, .. }) => {
                self.report_duplicate(url, &existing_name, interactive);
                Ok(AddOutcome::Rejected)
            }
            Err(e) => Err(e),
        }
    }

    fn report_duplicate(&self, url: &str, existing_name: &str, interactive: bool) {
        println!("\n{}", banner());
        println!("❌ PRODUCT ALREADY ADDED!");
        println!("{}", banner());
        println!("📦 Product Name: {}", existing_name);
        println!("🔗 URL: {}", url);
        println!("\n⚠️  This product is already in your monitoring list.");
        if interactive {
            println!("\nPlease provide a new/different link:");
        } else {
            println!("\n💡 Tip: Use a different product URL or remove the existing one from the item list");
        }
    }
}
