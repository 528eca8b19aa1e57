use clap::{Parser, Subcommand};
use std::path::PathBuf;
use verscout_common::ScoutError;
use verscout_config::{ScoutConfig, ScoutConfigLoader};

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "verscout.yaml";

#[derive(Parser, Debug)]
#[command(name = "verscout")]
#[command(about = "Scrape artifact versions from a registry page and track them in a CSV snapshot")]
#[command(version)]
pub struct Cli {
    /// YAML config file (default: ./verscout.yaml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Versions page to scrape
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Snapshot CSV file
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long, global = true)]
    pub headless: bool,

    /// WebDriver endpoint, e.g. http://localhost:9515
    #[arg(long, global = true, env = "VERSCOUT_WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Scrape versions and compare them with the snapshot
    Check,
    /// Scrape versions and overwrite the snapshot
    Snapshot,
    /// Collect "Browse" links and download one archive per version
    Crawl,
}

impl Cli {
    /// Load config from file + env, then apply command-line overrides.
    pub fn load_config(&self) -> Result<ScoutConfig, ScoutError> {
        let loader = match &self.config {
            Some(path) => ScoutConfigLoader::new().with_file(path),
            None => ScoutConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
        };
        let mut cfg = loader
            .load()
            .map_err(|e| ScoutError::Config(e.to_string()))?;

        if let Some(url) = &self.url {
            cfg.target.url = url.clone();
        }
        if let Some(path) = &self.snapshot {
            cfg.snapshot.path = path.clone();
        }
        if self.headless {
            cfg.browser.headless = true;
        }
        if let Some(url) = &self.webdriver_url {
            cfg.browser.webdriver_url = url.clone();
        }

        cfg.validate()
            .map_err(|e| ScoutError::Config(e.to_string()))?;
        Ok(cfg)
    }
}
