//! Visits collected "Browse" links and triggers one archive download each.
//!
//! Links are visited strictly in order on one shared session. A failure on
//! one link is recorded and the loop moves on. Whether the browser actually
//! finished a download is never checked.
use anyhow::Result;
use std::fmt;
use tracing::{info, warn};
use verscout_common::Selector;
use verscout_drivers::scout_browser::browser::Browser;
use verscout_drivers::scout_browser::pacing::Pacing;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub visited: usize,
    /// Archive URLs that were navigated to.
    pub triggered: Vec<String>,
    /// Links whose page had no archive.
    pub missing: Vec<String>,
    /// Links that failed, with the error message.
    pub failed: Vec<(String, String)>,
}

impl fmt::Display for DownloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Visited {} link(s): {} download(s) triggered, {} without archive, {} failed.",
            self.visited,
            self.triggered.len(),
            self.missing.len(),
            self.failed.len()
        )?;
        for (link, error) in &self.failed {
            writeln!(f, "  ! {link}: {error}")?;
        }
        Ok(())
    }
}

pub struct ArchiveDownloader<'a, B: Browser> {
    browser: &'a B,
    archive_links: Selector,
    suffix: String,
    pacing: Pacing,
}

impl<'a, B: Browser> ArchiveDownloader<'a, B> {
    pub fn new(
        browser: &'a B,
        archive_links: Selector,
        suffix: impl Into<String>,
        pacing: Pacing,
    ) -> Self {
        Self {
            browser,
            archive_links,
            suffix: suffix.into(),
            pacing,
        }
    }

    /// Visit every link in order; never stops early.
    pub async fn run(&self, links: &[String]) -> DownloadReport {
        let mut report = DownloadReport::default();

        for (idx, link) in links.iter().enumerate() {
            info!(target: "scrape.download", n = idx + 1, %link, "visiting browse link");
            report.visited += 1;

            match self.fetch_archive(link).await {
                Ok(Some(archive)) => report.triggered.push(archive),
                Ok(None) => {
                    info!(target: "scrape.download", %link, suffix = %self.suffix, "no archive found on this page");
                    report.missing.push(link.clone());
                }
                Err(e) => {
                    warn!(target: "scrape.download", %link, error = %format!("{e:#}"), "error visiting link");
                    report.failed.push((link.clone(), format!("{e:#}")));
                }
            }
        }

        report
    }

    async fn fetch_archive(&self, link: &str) -> Result<Option<String>> {
        self.browser.navigate(link).await?;
        self.pacing.settle().await;

        let candidates = self.browser.find_all(&self.archive_links).await?;
        for element in &candidates {
            let Some(href) = self.browser.attribute(element, "href").await? else {
                continue;
            };
            if href.ends_with(&self.suffix) {
                info!(target: "scrape.download", %href, "downloading archive");
                self.browser.navigate(&href).await?;
                self.pacing.download_settle().await;
                return Ok(Some(href));
            }
        }
        Ok(None)
    }
}
