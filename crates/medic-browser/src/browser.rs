//! Headless Chrome session as the element-lookup collaborator

use crate::error::Result;
use crate::lookup::{ElementActions, ElementLookup, Lookup};
use async_trait::async_trait;
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::protocol::cdp::DOM::NodeId;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use medic_core::{Locator, MedicError};
use std::ffi::OsStr;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const VISIBILITY_JS: &str = "function() { \
    const rect = this.getBoundingClientRect(); \
    const style = window.getComputedStyle(this); \
    return rect.width > 0 && rect.height > 0 \
        && style.visibility !== 'hidden' && style.display !== 'none'; \
}";

const CLEAR_VALUE_JS: &str = "function() { \
    if ('value' in this) { this.value = ''; } \
    this.dispatchEvent(new Event('input', { bubbles: true })); \
}";

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// User agent string
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: None,
        }
    }
}

/// Handle to an element located in a [`BrowserSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserElement {
    node_id: NodeId,
    locator: Locator,
}

impl BrowserElement {
    /// Locator that found this element
    pub fn locator(&self) -> &Locator {
        &self.locator
    }
}

/// How a locator is sent over CDP
#[derive(Debug, Clone, PartialEq, Eq)]
enum Query {
    Css(String),
    XPath(String),
}

fn quote_attr(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        // XPath 1.0 has no escapes; splice the double quotes in via concat()
        let parts: Vec<String> = value
            .split('"')
            .map(|part| format!("\"{}\"", part))
            .collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

fn to_query(locator: &Locator) -> Query {
    match locator {
        Locator::Id(v) => Query::Css(format!("[id={}]", quote_attr(v))),
        Locator::Css(v) => Query::Css(v.clone()),
        Locator::XPath(v) => Query::XPath(v.clone()),
        Locator::Name(v) => Query::Css(format!("[name={}]", quote_attr(v))),
        Locator::ClassName(v) => Query::Css(format!("[class~={}]", quote_attr(v))),
        Locator::TagName(v) => Query::Css(v.clone()),
        Locator::LinkText(v) => {
            Query::XPath(format!("//a[normalize-space(.)={}]", xpath_literal(v)))
        }
    }
}

/// Active browser session with Chrome DevTools Protocol
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    /// Current active tab
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance
    pub async fn launch() -> Result<Self> {
        Self::launch_with_config(BrowserConfig::default()).await
    }

    /// Launch browser with custom configuration
    pub async fn launch_with_config(config: BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{})",
            config.headless, config.window_width, config.window_height
        );

        let mut launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .build()
            .map_err(|e| MedicError::Browser(format!("Failed to launch browser: {}", e)))?;

        let user_agent_arg: Option<String> =
            config.user_agent.as_ref().map(|ua| format!("--user-agent={}", ua));
        if let Some(ref ua_arg) = user_agent_arg {
            launch_options.args.push(OsStr::new(ua_arg));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| MedicError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| MedicError::Browser(format!("Failed to create tab: {}", e)))?;

        info!("Browser launched successfully");

        Ok(Self { browser, tab })
    }

    /// Connect to an existing browser instance
    ///
    /// # Arguments
    /// * `port` - Chrome DevTools Protocol port (typically 9222)
    pub async fn connect(port: u16) -> Result<Self> {
        info!("Connecting to existing browser on port {}", port);

        let browser = Browser::connect(format!("http://127.0.0.1:{}", port))
            .map_err(|e| MedicError::Browser(format!("Failed to connect to browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| MedicError::Browser(format!("Failed to create tab: {}", e)))?;

        info!("Connected to browser successfully");

        Ok(Self { browser, tab })
    }

    /// Navigate to a URL and wait for the load to finish
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| MedicError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| MedicError::Browser(format!("Navigation timeout for {}: {}", url, e)))?;

        info!("Successfully navigated to {}", url);
        Ok(())
    }

    fn element(&self, handle: &BrowserElement) -> Result<Element<'_>> {
        Element::new(&self.tab, handle.node_id).map_err(|e| {
            MedicError::Browser(format!("Element {} is gone: {}", handle.locator, e))
        })
    }
}

#[async_trait]
impl ElementLookup for BrowserSession {
    type Element = BrowserElement;

    #[instrument(skip(self), fields(locator = %locator))]
    async fn find_element(&self, locator: &Locator) -> Result<Lookup<BrowserElement>> {
        let found = match to_query(locator) {
            Query::Css(selector) => self.tab.find_element(&selector),
            Query::XPath(expression) => self.tab.find_element_by_xpath(&expression),
        };

        match found {
            Ok(element) => Ok(Lookup::Found(BrowserElement {
                node_id: element.node_id,
                locator: locator.clone(),
            })),
            Err(e) if e.downcast_ref::<NoElementFound>().is_some() => {
                debug!("No element for {}", locator);
                Ok(Lookup::NotFound)
            }
            Err(e) => Err(MedicError::Browser(format!(
                "Lookup failed for {}: {}",
                locator, e
            ))),
        }
    }

    async fn current_markup(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| MedicError::Browser(format!("Failed to read page markup: {}", e)))
    }
}

#[async_trait]
impl ElementActions for BrowserSession {
    async fn click(&self, element: &BrowserElement) -> Result<()> {
        self.element(element)?
            .click()
            .map_err(|e| MedicError::Browser(format!("Click on {} failed: {}", element.locator, e)))?;
        Ok(())
    }

    async fn clear_and_type(&self, element: &BrowserElement, text: &str) -> Result<()> {
        let target = self.element(element)?;
        target
            .call_js_fn(CLEAR_VALUE_JS, vec![], false)
            .map_err(|e| MedicError::Browser(format!("Clearing {} failed: {}", element.locator, e)))?;
        target
            .type_into(text)
            .map_err(|e| MedicError::Browser(format!("Typing into {} failed: {}", element.locator, e)))?;
        Ok(())
    }

    async fn inner_text(&self, element: &BrowserElement) -> Result<String> {
        self.element(element)?
            .get_inner_text()
            .map_err(|e| MedicError::Browser(format!("Reading text of {} failed: {}", element.locator, e)))
    }

    async fn is_visible(&self, element: &BrowserElement) -> Result<bool> {
        let result = self
            .element(element)?
            .call_js_fn(VISIBILITY_JS, vec![], false)
            .map_err(|e| {
                MedicError::Browser(format!("Visibility check on {} failed: {}", element.locator, e))
            })?;
        Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }
}
