use crate::scout_browser::page::ScoutPage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::{json, Map, Value};
use std::future::Future;
use tracing::{debug, warn};
use verscout_config::BrowserConfig;
use webdriver::capabilities::Capabilities;

/// Exclusively owned WebDriver session.
///
/// Acquire with [`connect`](Self::connect) and release with
/// [`Session::close`], or let [`scoped`](Self::scoped) release it on
/// every exit path.
pub struct ScoutDriver {
    client: Client,
}

/// A browser session that hands out pages and must be closed exactly once.
#[async_trait]
pub trait Session: Send {
    type Page: Send;

    fn page(&self) -> Self::Page;

    async fn close(self) -> Result<()>;
}

/// Run `work` against a page of `session`, then close the session whether
/// `work` succeeded or not. A failed close is logged and never masks the
/// result of `work`.
pub async fn run_scoped<S, T, F, Fut>(session: S, work: F) -> Result<T>
where
    S: Session,
    F: FnOnce(S::Page) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let outcome = work(session.page()).await;
    if let Err(e) = session.close().await {
        warn!(target: "browser.session", error = %e, "failed to close browser session");
    }
    outcome
}

/// Build `goog:chromeOptions` capabilities from the browser settings.
pub fn chrome_capabilities(cfg: &BrowserConfig) -> Capabilities {
    let mut args: Vec<Value> = cfg.args.iter().map(|a| json!(a)).collect();
    if cfg.headless {
        args.push(json!("--headless"));
        args.push(json!("--disable-gpu"));
    }

    let mut chrome_opts = Map::new();
    chrome_opts.insert("args".to_string(), Value::Array(args));

    if let Some(dir) = &cfg.download_dir {
        chrome_opts.insert(
            "prefs".to_string(),
            json!({
                "download.default_directory": dir.display().to_string(),
                "download.prompt_for_download": false,
            }),
        );
    }

    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), Value::Object(chrome_opts));
    caps
}

impl ScoutDriver {
    /// Open a new session against the WebDriver service at
    /// `cfg.webdriver_url` (Chromedriver listens on `http://localhost:9515`).
    pub async fn connect(cfg: &BrowserConfig) -> Result<Self> {
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(cfg))
            .connect(&cfg.webdriver_url)
            .await
            .with_context(|| format!("failed to connect to WebDriver at {}", cfg.webdriver_url))?;

        debug!(target: "browser.session", url = %cfg.webdriver_url, "session opened");
        Ok(Self { client })
    }

    /// Run `work` against this session, then close it. See [`run_scoped`].
    pub async fn scoped<T, F, Fut>(self, work: F) -> Result<T>
    where
        F: FnOnce(ScoutPage) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        run_scoped(self, work).await
    }
}

#[async_trait]
impl Session for ScoutDriver {
    type Page = ScoutPage;

    /// A [`ScoutPage`] driving this session's window.
    fn page(&self) -> ScoutPage {
        ScoutPage::new(self.client.clone())
    }

    async fn close(self) -> Result<()> {
        self.client.close().await?;
        debug!(target: "browser.session", "session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeSession {
        closes: Arc<AtomicUsize>,
        close_fails: bool,
    }

    impl FakeSession {
        fn new(close_fails: bool) -> (Self, Arc<AtomicUsize>) {
            let closes = Arc::new(AtomicUsize::new(0));
            let session = Self {
                closes: Arc::clone(&closes),
                close_fails,
            };
            (session, closes)
        }
    }

    #[async_trait]
    impl Session for FakeSession {
        type Page = &'static str;

        fn page(&self) -> &'static str {
            "page"
        }

        async fn close(self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.close_fails {
                return Err(anyhow!("session already gone"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn scoped_work_closes_session_on_success() {
        let (session, closes) = FakeSession::new(false);
        let out = run_scoped(session, |page| async move { Ok(page.len()) })
            .await
            .unwrap();
        assert_eq!(out, 4);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scoped_work_closes_session_on_error() {
        let (session, closes) = FakeSession::new(false);
        let err = run_scoped(session, |_page| async move {
            Err::<(), _>(anyhow!("navigation to https://example.test failed"))
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("navigation"));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_close_does_not_mask_outcome() {
        let (session, closes) = FakeSession::new(true);
        let out = run_scoped(session, |_page| async move { Ok(7) }).await.unwrap();
        assert_eq!(out, 7);
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        let (session, _) = FakeSession::new(true);
        let err = run_scoped(session, |_page| async move { Err::<(), _>(anyhow!("work failed")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "work failed");
    }

    fn chrome_args(caps: &Capabilities) -> Vec<String> {
        caps["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn default_capabilities_allow_remote_origins() {
        let caps = chrome_capabilities(&BrowserConfig::default());
        assert_eq!(chrome_args(&caps), vec!["--remote-allow-origins=*"]);
        assert!(caps["goog:chromeOptions"].get("prefs").is_none());
    }

    #[test]
    fn headless_adds_flags() {
        let cfg = BrowserConfig {
            headless: true,
            ..BrowserConfig::default()
        };
        let args = chrome_args(&chrome_capabilities(&cfg));
        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
    }

    #[test]
    fn download_dir_becomes_chrome_pref() {
        let cfg = BrowserConfig {
            download_dir: Some(PathBuf::from("/tmp/archives")),
            ..BrowserConfig::default()
        };
        let caps = chrome_capabilities(&cfg);
        assert_eq!(
            caps["goog:chromeOptions"]["prefs"]["download.default_directory"],
            json!("/tmp/archives")
        );
    }
}
