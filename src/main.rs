mod config;
mod error;
mod extractor;
mod history;
mod notify;
mod parse;
mod runner;
mod summarizer;
mod types;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::extractor::ChromiumLauncher;
use crate::notify::{PushTransport, PushbulletClient};
use crate::runner::Runner;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    let push = match PushbulletClient::new(cfg.pushbullet_api_url.clone()) {
        Ok(p) => Some(p),
        Err(e) => {
            error!("Could not build HTTP client, alerts will not be delivered: {e}");
            None
        }
    };
    let browser = ChromiumLauncher::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);

    // Every failure inside a run is logged and degraded; the exit code stays 0.
    let push = push.as_ref().map(|p| p as &dyn PushTransport);
    let report = Runner::new(cfg, &browser, push).run().await;
    info!(
        listings = report.summary.listings_found,
        extraction_failed = report.extraction_failed,
        threshold_crossed = report.threshold_crossed,
        pushes_delivered = report.pushes_delivered,
        logged = report.logged,
        "Run complete"
    );
}
