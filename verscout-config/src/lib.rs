//! Loader for verscout configuration with YAML + environment overlays.
//!
//! Every field has a default, so an empty configuration reproduces the
//! stock run against the CDM JSON schema versions page. Files add to the
//! defaults, and `VERSCOUT__SECTION__FIELD` environment variables win
//! over files. String values may reference `${VAR}`; placeholders are
//! expanded after all sources are merged.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use verscout_common::observability::{LogConfig, LogFormat};
use verscout_common::Selector;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_TARGET_URL: &str =
    "https://central.sonatype.com/artifact/org.finos.cdm/cdm-json-schema/versions";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub version: Option<String>,
    pub target: TargetConfig,
    pub browser: BrowserConfig,
    pub timing: TimingConfig,
    pub selectors: SelectorConfig,
    pub snapshot: SnapshotConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TARGET_URL.into(),
        }
    }
}

/// WebDriver connection and Chrome launch options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub args: Vec<String>,
    /// Passed to Chrome as `download.default_directory`.
    pub download_dir: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: false,
            args: vec!["--remote-allow-origins=*".into()],
            download_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub wait_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub download_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: 10,
            poll_interval_ms: 250,
            settle_delay_ms: 2000,
            download_settle_ms: 3000,
        }
    }
}

impl TimingConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn download_settle(&self) -> Duration {
        Duration::from_millis(self.download_settle_ms)
    }
}

/// Page contract of the registry site. Brittle by nature; override here
/// rather than in code when the markup changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub version_items: Selector,
    pub browse_links: Selector,
    pub next_button: Selector,
    /// Substring of the next button's `class` that marks it disabled.
    pub disabled_marker: String,
    pub archive_links: Selector,
    pub archive_suffix: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            version_items: Selector::xpath("//div[@data-test='item-version']"),
            browse_links: Selector::xpath("//a[@data-test='item-browse-link']"),
            next_button: Selector::xpath("//button[@aria-label='goto next page']"),
            disabled_marker: "disabled".into(),
            archive_links: Selector::xpath("//pre[@id='contents']//a[contains(@href, '.zip')]"),
            archive_suffix: ".zip".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    pub header: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("versions.csv"),
            header: "Version".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub dir: Option<PathBuf>,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: true,
            dir: None,
            filter: "info".into(),
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            emit_stderr: self.emit_stderr,
            format: self.format,
            default_filter: self.filter.clone(),
            ..LogConfig::default()
        }
    }
}

impl ScoutConfig {
    /// Reject settings that would make every run fail in a confusing way.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.target.url).map_err(|e| {
            ConfigError::Message(format!("target.url `{}` is not a URL: {e}", self.target.url))
        })?;
        if self.timing.wait_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "timing.wait_timeout_secs must be at least 1".into(),
            ));
        }
        if self.selectors.disabled_marker.trim().is_empty() {
            return Err(ConfigError::Message(
                "selectors.disabled_marker must not be empty".into(),
            ));
        }
        let selectors = &self.selectors;
        for (name, sel) in [
            ("version_items", &selectors.version_items),
            ("browse_links", &selectors.browse_links),
            ("next_button", &selectors.next_button),
            ("archive_links", &selectors.archive_links),
        ] {
            if sel.is_empty() {
                return Err(ConfigError::Message(format!(
                    "selectors.{name} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct ScoutConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ScoutConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoutConfigLoader {
    /// Start from built-in defaults; `VERSCOUT__` env overrides are applied last.
    ///
    /// ```
    /// use verscout_config::ScoutConfigLoader;
    ///
    /// let config = ScoutConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.timing.wait_timeout_secs, 10);
    /// assert_eq!(config.snapshot.header, "Version");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file) but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use verscout_common::Selector;
    /// use verscout_config::ScoutConfigLoader;
    ///
    /// let cfg = ScoutConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// selectors:
    ///   next_button:
    ///     css: "button.next"
    ///   disabled_marker: "is-disabled"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.selectors.next_button, Selector::css("button.next"));
    /// assert_eq!(cfg.selectors.disabled_marker, "is-disabled");
    /// assert_eq!(cfg.selectors.archive_suffix, ".zip");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment variables are layered on top of every file and snippet, then
    /// `${VAR}` placeholders are expanded before materialising the typed structs.
    ///
    /// ```
    /// use verscout_config::ScoutConfigLoader;
    ///
    /// unsafe { std::env::set_var("CDM_ARTIFACT", "cdm-java"); }
    ///
    /// let config = ScoutConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// target:
    ///   url: "https://central.sonatype.com/artifact/org.finos.cdm/${CDM_ARTIFACT}/versions"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(
    ///     config.target.url,
    ///     "https://central.sonatype.com/artifact/org.finos.cdm/cdm-java/versions"
    /// );
    ///
    /// unsafe { std::env::remove_var("CDM_ARTIFACT"); }
    /// ```
    pub fn load(self) -> Result<ScoutConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("VERSCOUT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("browser.args")
                    .try_parsing(true),
            )
            .build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: ScoutConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_registry_page_contract() {
        let cfg = ScoutConfig::default();
        assert_eq!(cfg.target.url, DEFAULT_TARGET_URL);
        assert_eq!(cfg.timing.wait_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.timing.settle_delay(), Duration::from_secs(2));
        assert_eq!(cfg.selectors.disabled_marker, "disabled");
        assert_eq!(
            cfg.selectors.next_button,
            Selector::xpath("//button[@aria-label='goto next page']")
        );
        assert_eq!(cfg.browser.args, vec!["--remote-allow-origins=*".to_string()]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_url() {
        let mut cfg = ScoutConfig::default();
        cfg.target.url = "not a url".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout_and_blank_marker() {
        let mut cfg = ScoutConfig::default();
        cfg.timing.wait_timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = ScoutConfig::default();
        cfg.selectors.disabled_marker = " ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_selector() {
        let mut cfg = ScoutConfig::default();
        cfg.selectors.browse_links = Selector::css("");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("GROUP", Some("org.finos.cdm")), ("ART", Some("rosetta"))], || {
            let mut v = json!([
                "group-$GROUP",
                { "coord": "${GROUP}:${ART}" },
                10,
                false,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["group-org.finos.cdm", { "coord": "org.finos.cdm:rosetta" }, 10, false, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }
}
