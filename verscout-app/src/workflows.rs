//! The three runs: compare against the snapshot, record a snapshot, and
//! crawl for archives. Each opens its own browser session and releases it
//! before reporting.
use anyhow::Result;
use tracing::{info, warn};
use verscout_config::ScoutConfig;
use verscout_drivers::scout_browser::browser::Browser;
use verscout_drivers::scout_browser::driver::ScoutDriver;
use verscout_drivers::scout_browser::page::ScoutPage;
use verscout_drivers::scout_browser::pacing::Pacing;
use verscout_scrape::{
    compare, paginate, ArchiveDownloader, DomPager, Extraction, ResultSet, SnapshotFile,
    StopReason,
};

fn pacing(cfg: &ScoutConfig) -> Pacing {
    Pacing::new(cfg.timing.settle_delay(), cfg.timing.download_settle())
}

fn snapshot_file(cfg: &ScoutConfig) -> SnapshotFile {
    SnapshotFile::new(cfg.snapshot.path.clone(), cfg.snapshot.header.clone())
}

/// Open the target page and paginate with `pager`. A failed initial
/// navigation ends the run like any other page error.
async fn scrape<'a>(
    page: &'a ScoutPage,
    cfg: &ScoutConfig,
    mut pager: DomPager<'a, ScoutPage>,
) -> Extraction {
    if let Err(e) = page.navigate(&cfg.target.url).await {
        warn!(url = %cfg.target.url, error = %format!("{e:#}"), "could not open the target page");
        return Extraction {
            items: ResultSet::new(),
            pages: 1,
            stop: StopReason::TransientError {
                page: 1,
                message: format!("{e:#}"),
            },
        };
    }
    paginate(&mut pager, &pacing(cfg)).await
}

async fn scrape_versions(cfg: &ScoutConfig) -> Result<Extraction> {
    ScoutDriver::connect(&cfg.browser)
        .await?
        .scoped(|page| async move {
            let pager = DomPager::versions(&page, cfg);
            Ok::<_, anyhow::Error>(scrape(&page, cfg, pager).await)
        })
        .await
}

fn report_extraction(run: &Extraction, what: &str) {
    info!(
        pages = run.pages,
        total = run.items.len(),
        stop = %run.stop,
        stop_page = run.stop.page(),
        complete = run.is_complete(),
        "scraping finished"
    );
    println!(
        "Scraped {} {what} across {} page(s); stopped: {}.",
        run.items.len(),
        run.pages,
        run.stop
    );
}

/// Scrape versions and diff them against the snapshot.
pub async fn check(cfg: &ScoutConfig) -> Result<()> {
    info!(url = %cfg.target.url, "starting version scraping");
    let run = scrape_versions(cfg).await?;
    report_extraction(&run, "version(s)");

    let snapshot = snapshot_file(cfg);
    let previous = snapshot.load();
    println!(
        "Found {} version(s) in snapshot '{}'.",
        previous.len(),
        snapshot.path().display()
    );

    let comparison = compare(&run.items, &previous);
    println!();
    print!("{comparison}");
    Ok(())
}

/// Why overwriting the snapshot with `run` may lose recorded versions.
fn snapshot_caveat(run: &Extraction) -> Option<String> {
    if run.items.is_empty() {
        Some(format!("no versions were scraped ({})", run.stop))
    } else if !run.is_complete() {
        Some(format!(
            "pagination did not reach the last page ({}); versions after page {} are missing",
            run.stop,
            run.stop.page()
        ))
    } else {
        None
    }
}

/// Scrape versions and overwrite the snapshot with them.
pub async fn snapshot(cfg: &ScoutConfig) -> Result<()> {
    info!(url = %cfg.target.url, "starting version scraping");
    let run = scrape_versions(cfg).await?;
    report_extraction(&run, "version(s)");

    let snapshot = snapshot_file(cfg);
    if let Some(caveat) = snapshot_caveat(&run) {
        warn!(path = %snapshot.path().display(), %caveat, "overwriting snapshot with a partial scrape");
        println!("Warning: {caveat}; '{}' is overwritten anyway.", snapshot.path().display());
    }
    let written = snapshot.save(&run.items)?;
    println!(
        "Successfully wrote {written} version(s) to '{}'.",
        snapshot.path().display()
    );
    Ok(())
}

/// Collect every "Browse" link, then visit each one in a fresh session
/// and trigger its archive download.
pub async fn crawl(cfg: &ScoutConfig) -> Result<()> {
    let run = ScoutDriver::connect(&cfg.browser)
        .await?
        .scoped(|page| async move {
            let pager = DomPager::browse_links(&page, cfg);
            Ok::<_, anyhow::Error>(scrape(&page, cfg, pager).await)
        })
        .await?;
    report_extraction(&run, "'Browse' link(s)");

    if run.items.is_empty() {
        return Ok(());
    }

    let links = run.items.into_vec();
    let report = ScoutDriver::connect(&cfg.browser)
        .await?
        .scoped(|page| async move {
            let downloader = ArchiveDownloader::new(
                &page,
                cfg.selectors.archive_links.clone(),
                cfg.selectors.archive_suffix.clone(),
                pacing(cfg),
            );
            Ok::<_, anyhow::Error>(downloader.run(&links).await)
        })
        .await?;

    info!(
        visited = report.visited,
        triggered = report.triggered.len(),
        failed = report.failed.len(),
        "finished downloading; browser closed"
    );
    print!("{report}");
    Ok(())
}
