//! Common types and utilities shared across verscout crates.
//!
//! This crate defines the shared error type, the element [`Selector`], and the
//! observability helpers used throughout the workspace. It stays
//! dependency‑minimal so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`Selector`]: how a DOM element is located (CSS or XPath)
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`ScoutError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use verscout_common::Selector;
//!
//! let next = Selector::xpath("//button[@aria-label='goto next page']");
//! assert_eq!(next.to_string(), "xpath://button[@aria-label='goto next page']");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub mod observability;

/// Locator for DOM elements on the target page.
///
/// Deserialises from `{ css: "..." }` or `{ xpath: "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    Css(String),
    Xpath(String),
}

impl Selector {
    pub fn css(s: impl Into<String>) -> Self {
        Self::Css(s.into())
    }

    pub fn xpath(s: impl Into<String>) -> Self {
        Self::Xpath(s.into())
    }

    /// Raw expression without the locator kind.
    pub fn expr(&self) -> &str {
        match self {
            Self::Css(s) | Self::Xpath(s) => s,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expr().trim().is_empty()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css:{s}"),
            Self::Xpath(s) => write!(f, "xpath:{s}"),
        }
    }
}

/// Error types used across the verscout workspace.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    /// The browser driver (WebDriver session, navigation, lookup) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The snapshot file could not be written.
    #[error("Snapshot error at {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenient alias for results that use [`ScoutError`].
pub type Result<T> = std::result::Result<T, ScoutError>;
