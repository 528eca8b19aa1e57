//! Scraping workflows for a paginated registry versions page.
//!
//! - [`paginate`]: the paginated extraction loop and its stop reasons
//! - [`dom`]: [`paginate::Paginated`] over a live [`Browser`](verscout_drivers::scout_browser::browser::Browser)
//! - [`download`]: visits "Browse" links and triggers archive downloads
//! - [`snapshot`]: the flat CSV snapshot file
//! - [`compare`]: scrape vs. snapshot set difference
mod csv;

pub mod compare;
pub mod dom;
pub mod download;
pub mod paginate;
pub mod result_set;
pub mod snapshot;

pub use compare::{compare, Comparison};
pub use dom::{DomPager, ValueSource};
pub use download::{ArchiveDownloader, DownloadReport};
pub use paginate::{paginate, Extraction, PageStep, Paginated, StopReason};
pub use result_set::ResultSet;
pub use snapshot::SnapshotFile;
