//! Driver layer for browser automation.
//!
//! This crate exposes the capability interface the scrapers depend on and
//! its WebDriver implementation.
//!
//! - [`scout_browser::browser::Browser`]: navigate / locate / read / click capability set
//! - [`scout_browser::driver::ScoutDriver`]: WebDriver session with scoped release
//! - [`scout_browser::page::ScoutPage`]: `Browser` implementation over a live session
//! - [`scout_browser::pacing::Pacing`]: fixed settle delays between page transitions
pub mod scout_browser;
