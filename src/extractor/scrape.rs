use std::path::Path;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{selectors, Config};
use crate::error::{AppError, Result};
use crate::extractor::session::{Backoff, PageSession, SessionFactory};
use crate::parse::{parse_availability, parse_price};
use crate::types::{Extraction, TicketListing};

/// Span count of a well-formed ticket container: type, availability, category, price.
const FIELDS_PER_LISTING: usize = 4;

/// Scrapes the configured page. Never fails: problems end up in `Extraction::failure`.
pub async fn extract_listings(factory: &dyn SessionFactory, cfg: &Config) -> Extraction {
    info!("Launching headless browser");
    let mut session = match factory.open().await {
        Ok(s) => s,
        Err(e) => {
            error!("Could not start browser session: {e}");
            return Extraction {
                listings: Vec::new(),
                failure: Some(e),
            };
        }
    };

    let mut listings = Vec::new();
    let failure = match scrape_page(session.as_mut(), cfg, &mut listings).await {
        Ok(()) => None,
        Err(e) => {
            match &e {
                AppError::NavigationTimeout(_) | AppError::ElementWaitTimeout { .. } => {
                    warn!("The page timed out or the ticket elements were not found in time: {e}")
                }
                _ => error!("Extraction stopped: {e}"),
            }
            Some(e)
        }
    };

    info!("Closing the browser");
    if let Err(e) = session.close().await {
        warn!("Browser did not shut down cleanly: {e}");
    }

    Extraction { listings, failure }
}

async fn scrape_page(
    session: &mut dyn PageSession,
    cfg: &Config,
    listings: &mut Vec<TicketListing>,
) -> Result<()> {
    info!("Navigating to: {}", cfg.target_url);
    let navigated =
        tokio::time::timeout(cfg.navigation_timeout, session.navigate(&cfg.target_url)).await;
    match navigated {
        Ok(result) => result?,
        Err(_) => {
            save_debug_screenshot(session, &cfg.screenshot_path).await;
            return Err(AppError::NavigationTimeout(cfg.navigation_timeout));
        }
    }

    accept_cookies(session, cfg.consent_timeout).await;

    info!("Waiting for ticket information to load");
    if !wait_visible(session, selectors::TICKET_CONTAINER, cfg.content_timeout).await {
        save_debug_screenshot(session, &cfg.screenshot_path).await;
        return Err(AppError::ElementWaitTimeout {
            selector: selectors::TICKET_CONTAINER.to_string(),
            waited: cfg.content_timeout,
        });
    }
    info!("Ticket information loaded");

    let containers = session
        .field_texts(selectors::TICKET_CONTAINER, selectors::TICKET_FIELD)
        .await?;
    if containers.is_empty() {
        warn!("Could not find any ticket information containers");
        return Ok(());
    }

    for (idx, fields) in containers.iter().enumerate() {
        if fields.len() != FIELDS_PER_LISTING {
            debug!("Skipping container {idx}: {} fields", fields.len());
            continue;
        }
        listings.push(TicketListing {
            kind: fields[0].clone(),
            availability: parse_availability(&fields[1])?,
            category: fields[2].clone(),
            price: parse_price(&fields[3])?,
        });
    }
    info!("Scraped {} listings from {} containers", listings.len(), containers.len());

    Ok(())
}

/// Clicks the consent button if it shows up within `budget`. Absence is fine.
async fn accept_cookies(session: &mut dyn PageSession, budget: Duration) {
    info!("Checking for cookie consent banner");
    let mut backoff = Backoff::new(budget);
    loop {
        match session.try_click(selectors::CONSENT_BUTTON).await {
            Ok(true) => {
                info!("Accepted cookies");
                return;
            }
            Ok(false) => {}
            Err(e) => {
                warn!("An error occurred trying to accept cookies: {e}");
                return;
            }
        }
        if !backoff.wait().await {
            info!("No cookie banner found, or it was already accepted");
            return;
        }
    }
}

async fn wait_visible(session: &mut dyn PageSession, selector: &str, budget: Duration) -> bool {
    let mut backoff = Backoff::new(budget);
    loop {
        match session.is_visible(selector).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => debug!("Visibility probe for {selector} failed: {e}"),
        }
        if !backoff.wait().await {
            return false;
        }
    }
}

async fn save_debug_screenshot(session: &mut dyn PageSession, path: &Path) {
    match session.screenshot(path).await {
        Ok(()) => info!("Screenshot saved to {} for debugging", path.display()),
        Err(e) => warn!("Could not save debug screenshot: {e}"),
    }
}
