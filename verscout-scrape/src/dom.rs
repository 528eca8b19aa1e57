use crate::paginate::Paginated;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use verscout_common::Selector;
use verscout_config::ScoutConfig;
use verscout_drivers::scout_browser::browser::Browser;

/// Where an item's value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Visible text, trimmed.
    Text,
    /// A named attribute such as `href`, taken as-is.
    Attribute(String),
}

/// [`Paginated`] over a live page: items and the next control are found
/// with bounded waits, the next control is clicked to advance.
pub struct DomPager<'a, B: Browser> {
    browser: &'a B,
    items: Selector,
    value: ValueSource,
    next: Selector,
    disabled_marker: String,
    timeout: Duration,
    poll: Duration,
}

impl<'a, B: Browser> DomPager<'a, B> {
    /// Pager over `items`, with next-control and wait settings from `cfg`.
    pub fn new(browser: &'a B, items: Selector, value: ValueSource, cfg: &ScoutConfig) -> Self {
        Self {
            browser,
            items,
            value,
            next: cfg.selectors.next_button.clone(),
            disabled_marker: cfg.selectors.disabled_marker.clone(),
            timeout: cfg.timing.wait_timeout(),
            poll: cfg.timing.poll_interval(),
        }
    }

    /// Version strings, read from the text of the version cells.
    pub fn versions(browser: &'a B, cfg: &ScoutConfig) -> Self {
        Self::new(
            browser,
            cfg.selectors.version_items.clone(),
            ValueSource::Text,
            cfg,
        )
    }

    /// Targets of the per-version "Browse" links.
    pub fn browse_links(browser: &'a B, cfg: &ScoutConfig) -> Self {
        Self::new(
            browser,
            cfg.selectors.browse_links.clone(),
            ValueSource::Attribute("href".into()),
            cfg,
        )
    }
}

#[async_trait]
impl<'a, B: Browser> Paginated for DomPager<'a, B> {
    type Element = B::Element;

    async fn locate_items(&mut self) -> Result<Vec<B::Element>> {
        self.browser
            .wait_for_all(&self.items, self.timeout, self.poll)
            .await
    }

    async fn extract_value(&mut self, element: &B::Element) -> Result<Option<String>> {
        let raw = match &self.value {
            ValueSource::Text => Some(self.browser.text(element).await?.trim().to_string()),
            ValueSource::Attribute(name) => self.browser.attribute(element, name).await?,
        };
        Ok(raw.filter(|v| !v.is_empty()))
    }

    async fn locate_next(&mut self) -> Result<Option<B::Element>> {
        let found = self
            .browser
            .wait_for_all(&self.next, self.timeout, self.poll)
            .await?;
        Ok(found.into_iter().next())
    }

    async fn is_disabled(&mut self, element: &B::Element) -> Result<bool> {
        let class = self.browser.attribute(element, "class").await?;
        if class.is_some_and(|c| c.contains(&self.disabled_marker)) {
            return Ok(true);
        }
        Ok(!self.browser.is_enabled(element).await?)
    }

    async fn advance(&mut self, element: B::Element) -> Result<()> {
        self.browser.click(&element).await
    }
}
