use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::utils::error::{AppError, Result};

/// Chrome drops its DevTools connection after this long without traffic; it
/// has to outlast the gap between polling passes.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Elements whose content never reaches the screen.
const NON_RENDERED_TAGS: [&str; 6] = ["script", "style", "template", "noscript", "head", "title"];

/// Snapshot of a page after client-side rendering settled.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub html: String,
    /// `innerText` of every match, per selector, as the browser rendered it.
    rendered: HashMap<String, Vec<String>>,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            rendered: HashMap::new(),
        }
    }

    /// Records the rendered texts of `selector`; they take precedence over
    /// text recovered from the HTML source.
    pub fn with_rendered_texts(mut self, selector: impl Into<String>, texts: Vec<String>) -> Self {
        self.rendered.insert(
            selector.into(),
            texts.iter().map(|t| normalize_whitespace(t)).collect(),
        );
        self
    }

    /// Full page source, lowercased for phrase matching.
    pub fn source_text(&self) -> String {
        self.html.to_lowercase()
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }

    /// Rendered text of every element matching `selector`, in document order.
    pub fn select_texts(&self, selector: &str) -> Result<Vec<String>> {
        if let Some(texts) = self.rendered.get(selector) {
            return Ok(texts.clone());
        }

        let css_selector = parse_selector(selector)?;
        let document = self.document();
        Ok(document.select(&css_selector).map(element_text).collect())
    }

    /// Text of the first element matching `selector`.
    pub fn first_text(&self, selector: &str) -> Result<String> {
        let not_found = || AppError::ElementNotFound {
            selector: selector.to_string(),
        };

        if let Some(texts) = self.rendered.get(selector) {
            return texts.first().cloned().ok_or_else(not_found);
        }

        let css_selector = parse_selector(selector)?;
        let document = self.document();
        document
            .select(&css_selector)
            .next()
            .map(element_text)
            .ok_or_else(not_found)
    }

    /// Leading characters of the body text, for "status unclear" diagnostics.
    pub fn body_sample(&self, max_chars: usize) -> String {
        let text = self
            .first_text("body")
            .unwrap_or_else(|_| element_text(self.document().root_element()));
        text.chars().take(max_chars).collect()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::Parse {
        message: format!("Invalid CSS selector '{}': {:?}", selector, e),
    })
}

/// Approximates `innerText` for pages without a live browser: hidden
/// subtrees and non-rendered elements contribute nothing.
fn element_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    if is_rendered(element) {
        collect_rendered_text(element, &mut text);
    }
    normalize_whitespace(&text)
}

fn collect_rendered_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if is_rendered(child) {
                        collect_rendered_text(child, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn is_rendered(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if NON_RENDERED_TAGS.contains(&el.name()) || el.attr("hidden").is_some() {
        return false;
    }

    match el.attr("style") {
        Some(style) => {
            let style: String = style
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase();
            !style.contains("display:none") && !style.contains("visibility:hidden")
        }
        None => true,
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Script run in the tab: `innerText` of each match, or `null` for an
/// invalid selector.
fn inner_text_script(selector: &str) -> Result<String> {
    let literal = serde_json::to_string(selector)?;
    Ok(format!(
        r#"
        (function() {{
            try {{
                const nodes = document.querySelectorAll({});
                return JSON.stringify(Array.from(nodes).map(n => n.innerText || ''));
            }} catch (e) {{
                return null;
            }}
        }})()
        "#,
        literal
    ))
}

fn rendered_texts(tab: &Tab, selector: &str) -> Result<Option<Vec<String>>> {
    let result = tab
        .evaluate(&inner_text_script(selector)?, false)
        .map_err(|e| AppError::Scraping(format!("innerText evaluation failed: {}", e)))?;

    match result.value {
        Some(serde_json::Value::String(json)) => Ok(Some(serde_json::from_str(&json)?)),
        _ => Ok(None),
    }
}

/// Source of rendered product pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Loads `url` and captures the rendered text of each of `selectors`.
    async fn fetch(&self, url: &str, selectors: &[String]) -> Result<RenderedPage>;

    /// Release whatever rendering resources the fetcher holds.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Single headless Chrome instance with one reusable tab, held for the whole
/// polling lifetime. The browser process ends on `shutdown`.
pub struct ChromeFetcher {
    browser: Mutex<Option<Browser>>,
    tab: Arc<Tab>,
    render_wait: Duration,
}

impl ChromeFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .window_size(Some((config.window_width, config.window_height)))
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .args(vec![
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-software-rasterizer"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--log-level=3"),
                OsStr::new("--silent"),
            ])
            .build()
            .map_err(|e| AppError::Browser(format!("Failed to create launch options: {}", e)))?;

        if let Some(chrome_path) = &config.chrome_path {
            launch_options.path = Some(PathBuf::from(chrome_path));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| AppError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AppError::Browser(format!("Failed to create tab: {}", e)))?;

        tab.set_default_timeout(Duration::from_secs(config.request_timeout));
        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| AppError::Browser(format!("Failed to set user agent: {}", e)))?;

        info!("Headless Chrome started");

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            tab,
            render_wait: Duration::from_millis(config.render_wait_ms),
        })
    }

    pub fn is_running(&self) -> bool {
        self.browser.lock().map(|b| b.is_some()).unwrap_or(false)
    }

    fn take_browser(&self) -> Result<Option<Browser>> {
        let mut guard = self
            .browser
            .lock()
            .map_err(|_| AppError::Internal("Browser lock poisoned".to_string()))?;
        Ok(guard.take())
    }
}

#[async_trait]
impl PageFetcher for ChromeFetcher {
    async fn fetch(&self, url: &str, selectors: &[String]) -> Result<RenderedPage> {
        if !self.is_running() {
            return Err(AppError::Browser("Browser has been shut down".to_string()));
        }

        let tab = Arc::clone(&self.tab);
        let target = url.to_string();

        // headless_chrome blocks on every DevTools round-trip
        tokio::task::spawn_blocking(move || -> Result<()> {
            tab.navigate_to(&target)
                .map_err(|e| AppError::Scraping(format!("Navigation failed: {}", e)))?;
            tab.wait_until_navigated()
                .map_err(|e| AppError::Scraping(format!("Page load failed: {}", e)))?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(format!("Navigation task failed: {}", e)))??;

        tokio::time::sleep(self.render_wait).await;

        let tab = Arc::clone(&self.tab);
        let selectors = selectors.to_vec();
        let (final_url, html, captured) = tokio::task::spawn_blocking(
            move || -> Result<(String, String, Vec<(String, Vec<String>)>)> {
                let html = tab
                    .get_content()
                    .map_err(|e| AppError::Scraping(format!("Failed to get page content: {}", e)))?;

                let mut captured = Vec::with_capacity(selectors.len());
                for selector in selectors {
                    match rendered_texts(&tab, &selector) {
                        Ok(Some(texts)) => captured.push((selector, texts)),
                        Ok(None) => debug!(selector = %selector, "Selector rejected by the page"),
                        Err(e) => warn!(selector = %selector, "Failed to read rendered text: {}", e),
                    }
                }

                Ok((tab.get_url(), html, captured))
            },
        )
        .await
        .map_err(|e| AppError::Internal(format!("Content task failed: {}", e)))??;

        debug!(url, final_url = %final_url, bytes = html.len(), "Page rendered");

        let final_url = if final_url.is_empty() {
            url.to_string()
        } else {
            final_url
        };
        Ok(captured
            .into_iter()
            .fold(RenderedPage::new(final_url, html), |page, (selector, texts)| {
                page.with_rendered_texts(selector, texts)
            }))
    }

    async fn shutdown(&self) -> Result<()> {
        let Some(browser) = self.take_browser()? else {
            return Ok(());
        };

        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = tab.close(true) {
                warn!("Failed to close browser tab: {}", e);
            }
            // Dropping the last handle kills the Chrome process
            drop(browser);
        })
        .await
        .map_err(|e| AppError::Internal(format!("Shutdown task failed: {}", e)))?;

        info!("Headless Chrome released");
        Ok(())
    }
}
