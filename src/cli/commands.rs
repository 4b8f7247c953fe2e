use tracing::info;

use crate::app::{AppContext, Result};
use crate::cli::Cli;
use crate::extract::Extractor;
use crate::source::{BrowserConfig, ChromeSource, Snapshot, StaticPage};
use crate::writer::write_feed_file;

/// Render the timeline at `cli.url` and write it as RSS to `cli.dest`.
///
/// Nothing is written unless the whole page extracts.
pub async fn convert(ctx: &AppContext, cli: &Cli) -> Result<usize> {
    let (name, profile) = ctx
        .config
        .select_profile(cli.profile.as_deref(), &cli.url)?;
    info!("Using profile {}", name);

    // Compile selectors before paying for a browser launch
    let extractor = Extractor::new(&profile)?;

    let snapshot = match &cli.html {
        Some(path) => {
            info!("Reading rendered page from {}", path.display());
            let page = StaticPage::from_file(path, &cli.url)?;
            Snapshot::capture(&page).await?
        }
        None => {
            let config = browser_config(&ctx.config.browser, cli);
            capture_live(config, &cli.url, &profile.post_selector).await?
        }
    };

    let (page, items) = extractor.extract(&snapshot, &cli.url)?;
    let count = write_feed_file(&cli.dest, &page, &items)?;
    println!("Wrote {} items to {}", count, cli.dest.display());
    Ok(count)
}

fn browser_config(base: &BrowserConfig, cli: &Cli) -> BrowserConfig {
    let mut config = base.clone();
    if cli.headful {
        config.headless = false;
    }
    if let Some(ms) = cli.wait_ms {
        config.wait_after_load_ms = ms;
    }
    config
}

/// The browser is shut down whether or not the capture succeeded.
async fn capture_live(config: BrowserConfig, url: &str, ready_selector: &str) -> Result<Snapshot> {
    let source = ChromeSource::launch(config).await?;

    let result = match source.open(url, ready_selector).await {
        Ok(page) => Snapshot::capture(&page).await,
        Err(e) => Err(e),
    };

    source.close().await;
    result
}
