use crate::scout_browser::browser::Browser;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{elements::Element, error::CmdError, Client, Locator};
use std::time::Duration;
use tracing::debug;
use verscout_common::Selector;

/// [`Browser`] implementation over a live WebDriver session.
///
/// Cheap to clone; every clone drives the same window.
#[derive(Clone)]
pub struct ScoutPage {
    pub(crate) client: Client,
}

pub(crate) fn locator(selector: &Selector) -> Locator<'_> {
    match selector {
        Selector::Css(s) => Locator::Css(s),
        Selector::Xpath(s) => Locator::XPath(s),
    }
}

impl ScoutPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Browser for ScoutPage {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!(target: "browser.session", %url, "navigate");
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Element>> {
        self.client
            .find_all(locator(selector))
            .await
            .with_context(|| format!("lookup of {selector} failed"))
    }

    async fn wait_for_all(
        &self,
        selector: &Selector,
        timeout: Duration,
        poll: Duration,
    ) -> Result<Vec<Element>> {
        let waited = self
            .client
            .wait()
            .at_most(timeout)
            .every(poll)
            .for_element(locator(selector))
            .await;

        match waited {
            Ok(_) => self.find_all(selector).await,
            Err(CmdError::WaitTimeout) => {
                debug!(target: "browser.session", %selector, ?timeout, "wait timed out");
                Ok(Vec::new())
            }
            Err(e) => Err(anyhow::Error::from(e).context(format!("waiting for {selector} failed"))),
        }
    }

    async fn text(&self, element: &Element) -> Result<String> {
        element.text().await.map_err(anyhow::Error::from)
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        element.attr(name).await.map_err(anyhow::Error::from)
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool> {
        element.is_enabled().await.map_err(anyhow::Error::from)
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await.context("click failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_maps_to_matching_locator() {
        let css = Selector::css("div.row");
        assert!(matches!(locator(&css), Locator::Css("div.row")));

        let xpath = Selector::xpath("//a[@data-test='item-browse-link']");
        assert!(matches!(
            locator(&xpath),
            Locator::XPath("//a[@data-test='item-browse-link']")
        ));
    }
}
