use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use verscout_common::Selector;

/// Capability set the scrapers need from a browser session.
///
/// Scrapers depend on this trait only, never on a specific automation
/// engine; [`ScoutPage`](super::page::ScoutPage) implements it over WebDriver.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Handle to a located DOM element.
    type Element: Send + Sync;

    /// Load `url` in the current window.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Locate every element matching `selector` right now, without waiting.
    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self::Element>>;

    /// Poll every `poll` until at least one element matches `selector`, then
    /// return all matches. Returns an empty vector once `timeout` elapses;
    /// only driver failures are errors.
    async fn wait_for_all(
        &self,
        selector: &Selector,
        timeout: Duration,
        poll: Duration,
    ) -> Result<Vec<Self::Element>>;

    /// Visible text of the element.
    async fn text(&self, element: &Self::Element) -> Result<String>;

    /// Attribute value, `None` if the attribute is absent.
    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool>;

    async fn click(&self, element: &Self::Element) -> Result<()>;
}
