#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use verscout_common::observability::{LogConfig, LogFormat};
use verscout_common::Selector;
use verscout_config::ScoutConfig;
use verscout_drivers::scout_browser::browser::Browser;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "verscout-tests",
            emit_stderr: true,
            format: if std::env::var("VERSCOUT_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
            ..LogConfig::default()
        };

        verscout_common::observability::init_logging(config).unwrap_or_default()
    });
}

pub const VERSIONS_URL: &str = "https://registry.test/artifact/cdm-json-schema/versions";

/// Element handles handed out by [`FakeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeElement {
    Version(String),
    BrowseLink(String),
    Next { class: String, enabled: bool },
    Archive(Option<String>),
}

/// How the "next page" control looks on the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastPage {
    DisabledClass,
    NotEnabled,
    NoButton,
}

#[derive(Debug, Default)]
struct State {
    url: String,
    page: usize,
    navigations: Vec<String>,
    clicks: usize,
}

/// In-memory stand-in for the registry site.
///
/// The versions page has `pages.len()` pages; each row carries a version
/// and the URL of its browse page. Browse pages list archive hrefs.
pub struct FakeRegistry {
    selectors: verscout_config::SelectorConfig,
    pages: Vec<Vec<(&'static str, &'static str)>>,
    last_page: LastPage,
    browse_pages: HashMap<String, Vec<Option<&'static str>>>,
    broken_urls: HashSet<String>,
    state: Mutex<State>,
}

impl FakeRegistry {
    pub fn new(pages: Vec<Vec<(&'static str, &'static str)>>) -> Self {
        Self {
            selectors: ScoutConfig::default().selectors,
            pages,
            last_page: LastPage::DisabledClass,
            browse_pages: HashMap::new(),
            broken_urls: HashSet::new(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn last_page(mut self, last: LastPage) -> Self {
        self.last_page = last;
        self
    }

    pub fn browse_page(mut self, url: &str, archives: Vec<Option<&'static str>>) -> Self {
        self.browse_pages.insert(url.to_string(), archives);
        self
    }

    pub fn broken(mut self, url: &str) -> Self {
        self.broken_urls.insert(url.to_string());
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn clicks(&self) -> usize {
        self.state.lock().unwrap().clicks
    }

    fn on_versions_page(&self) -> bool {
        self.state.lock().unwrap().url == VERSIONS_URL
    }

    fn lookup(&self, selector: &Selector) -> Vec<FakeElement> {
        let state = self.state.lock().unwrap();
        let s = &self.selectors;

        if state.url == VERSIONS_URL {
            let rows = self.pages.get(state.page).cloned().unwrap_or_default();
            if *selector == s.version_items {
                return rows
                    .iter()
                    .map(|(v, _)| FakeElement::Version(v.to_string()))
                    .collect();
            }
            if *selector == s.browse_links {
                return rows
                    .iter()
                    .map(|(_, href)| FakeElement::BrowseLink(href.to_string()))
                    .collect();
            }
            if *selector == s.next_button {
                let last = state.page + 1 >= self.pages.len();
                return match (last, self.last_page) {
                    (false, _) => vec![FakeElement::Next {
                        class: "MuiButtonBase-root MuiPaginationItem-root".into(),
                        enabled: true,
                    }],
                    (true, LastPage::DisabledClass) => vec![FakeElement::Next {
                        class: "MuiButtonBase-root MuiPaginationItem-root Mui-disabled".into(),
                        enabled: true,
                    }],
                    (true, LastPage::NotEnabled) => vec![FakeElement::Next {
                        class: "MuiButtonBase-root".into(),
                        enabled: false,
                    }],
                    (true, LastPage::NoButton) => Vec::new(),
                };
            }
        } else if *selector == s.archive_links {
            return self
                .browse_pages
                .get(&state.url)
                .map(|links| {
                    links
                        .iter()
                        .map(|h| FakeElement::Archive(h.map(str::to_string)))
                        .collect()
                })
                .unwrap_or_default();
        }
        Vec::new()
    }
}

#[async_trait]
impl Browser for FakeRegistry {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        if self.broken_urls.contains(url) {
            bail!("net::ERR_CONNECTION_RESET at {url}");
        }
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        state.url = url.to_string();
        state.page = 0;
        Ok(())
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<FakeElement>> {
        Ok(self.lookup(selector))
    }

    async fn wait_for_all(
        &self,
        selector: &Selector,
        _timeout: Duration,
        _poll: Duration,
    ) -> Result<Vec<FakeElement>> {
        Ok(self.lookup(selector))
    }

    async fn text(&self, element: &FakeElement) -> Result<String> {
        match element {
            FakeElement::Version(v) => Ok(format!(" {v}\n")),
            _ => Ok(String::new()),
        }
    }

    async fn attribute(&self, element: &FakeElement, name: &str) -> Result<Option<String>> {
        Ok(match (element, name) {
            (FakeElement::BrowseLink(href), "href") => Some(href.clone()),
            (FakeElement::Archive(href), "href") => href.clone(),
            (FakeElement::Next { class, .. }, "class") => Some(class.clone()),
            _ => None,
        })
    }

    async fn is_enabled(&self, element: &FakeElement) -> Result<bool> {
        match element {
            FakeElement::Next { enabled, .. } => Ok(*enabled),
            _ => Ok(true),
        }
    }

    async fn click(&self, element: &FakeElement) -> Result<()> {
        if !matches!(element, FakeElement::Next { .. }) || !self.on_versions_page() {
            return Err(anyhow!("element not interactable"));
        }
        let mut state = self.state.lock().unwrap();
        state.page += 1;
        state.clicks += 1;
        Ok(())
    }
}
