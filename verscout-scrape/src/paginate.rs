//! The paginated extraction loop.
//!
//! [`paginate`] scans a page, accumulates values into a [`ResultSet`],
//! clicks the "next" control and repeats until pagination ends. It never
//! fails: every way the loop can end is reported as a [`StopReason`] next
//! to whatever was collected so far.
use crate::result_set::ResultSet;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use tracing::{info, warn};
use verscout_drivers::scout_browser::pacing::Pacing;

/// Page-level capabilities the extraction loop drives.
#[async_trait]
pub trait Paginated: Send {
    type Element: Send + Sync;

    /// Items on the current page, in DOM order. Empty when none appeared
    /// within the wait bound.
    async fn locate_items(&mut self) -> Result<Vec<Self::Element>>;

    /// Value of one item; `None` when it carries nothing worth keeping.
    async fn extract_value(&mut self, element: &Self::Element) -> Result<Option<String>>;

    /// The "next page" control, `None` when it did not appear within the wait bound.
    async fn locate_next(&mut self) -> Result<Option<Self::Element>>;

    async fn is_disabled(&mut self, element: &Self::Element) -> Result<bool>;

    /// Trigger the page transition.
    async fn advance(&mut self, element: Self::Element) -> Result<()>;
}

/// Why the loop stopped. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// No items appeared on `page` within the wait bound.
    NoItems { page: usize },
    /// `page` has no "next" control.
    NoNextControl { page: usize },
    /// The "next" control on `page` is disabled.
    Disabled { page: usize },
    /// A lookup, read or click failed on `page`.
    TransientError { page: usize, message: String },
}

impl StopReason {
    pub fn page(&self) -> usize {
        match self {
            Self::NoItems { page }
            | Self::NoNextControl { page }
            | Self::Disabled { page }
            | Self::TransientError { page, .. } => *page,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoItems { page } => write!(f, "no items appeared on page {page}"),
            Self::NoNextControl { page } => write!(f, "no next-page control on page {page}"),
            Self::Disabled { page } => write!(f, "next-page control disabled on page {page}"),
            Self::TransientError { page, message } => {
                write!(f, "error on page {page}: {message}")
            }
        }
    }
}

/// Outcome of one scanned page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStep {
    /// Items were collected and the next page was requested.
    Advanced { found: usize, added: usize },
    Stop(StopReason),
}

/// Accumulated values plus how the run ended.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub items: ResultSet,
    /// Pages visited, including the one that ended the run.
    pub pages: usize,
    pub stop: StopReason,
}

impl Extraction {
    /// True when pagination ended because the last page said so.
    pub fn is_complete(&self) -> bool {
        matches!(
            self.stop,
            StopReason::NoNextControl { .. } | StopReason::Disabled { .. }
        )
    }
}

/// Run the extraction loop to completion.
pub async fn paginate<P>(source: &mut P, pacing: &Pacing) -> Extraction
where
    P: Paginated + ?Sized,
{
    let mut items = ResultSet::new();
    let mut page = 1;

    loop {
        let step = match scan_page(source, page, &mut items).await {
            Ok(step) => step,
            Err(e) => PageStep::Stop(StopReason::TransientError {
                page,
                message: format!("{e:#}"),
            }),
        };

        match step {
            PageStep::Advanced { found, added } => {
                info!(target: "scrape.paginate", page, found, added, "navigating to the next page");
                pacing.settle().await;
                page += 1;
            }
            PageStep::Stop(stop) => {
                match &stop {
                    StopReason::NoNextControl { .. } | StopReason::Disabled { .. } => {
                        info!(target: "scrape.paginate", %stop, total = items.len(), "no more pages");
                    }
                    StopReason::NoItems { page: 1 } => {
                        info!(target: "scrape.paginate", %stop, "nothing to scrape");
                    }
                    StopReason::NoItems { .. } => {
                        warn!(
                            target: "scrape.paginate",
                            %stop,
                            total = items.len(),
                            "items did not appear after a page transition; results may be truncated"
                        );
                    }
                    StopReason::TransientError { .. } => {
                        warn!(target: "scrape.paginate", %stop, total = items.len(), "stopping with partial results");
                    }
                }
                return Extraction {
                    items,
                    pages: page,
                    stop,
                };
            }
        }
    }
}

async fn scan_page<P>(source: &mut P, page: usize, items: &mut ResultSet) -> Result<PageStep>
where
    P: Paginated + ?Sized,
{
    let elements = source.locate_items().await?;
    if elements.is_empty() {
        return Ok(PageStep::Stop(StopReason::NoItems { page }));
    }
    let found = elements.len();
    info!(target: "scrape.paginate", page, found, "found item element(s) on this page");

    let mut added = 0;
    for element in &elements {
        if let Some(value) = source.extract_value(element).await? {
            if items.insert(value.as_str()) {
                added += 1;
                info!(target: "scrape.paginate", %value, "added");
            }
        }
    }

    let Some(next) = source.locate_next().await? else {
        return Ok(PageStep::Stop(StopReason::NoNextControl { page }));
    };
    if source.is_disabled(&next).await? {
        return Ok(PageStep::Stop(StopReason::Disabled { page }));
    }
    source.advance(next).await?;

    Ok(PageStep::Advanced { found, added })
}
