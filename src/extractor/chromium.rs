use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::extractor::session::{PageSession, SessionFactory};

/// Launches a local headless Chromium with a fixed viewport.
pub struct ChromiumLauncher {
    width: u32,
    height: u32,
}

impl ChromiumLauncher {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[async_trait]
impl SessionFactory for ChromiumLauncher {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        let config = BrowserConfig::builder()
            .window_size(self.width, self.height)
            .viewport(Viewport {
                width: self.width,
                height: self.height,
                ..Default::default()
            })
            .build()
            .map_err(AppError::BrowserSetup)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // The CDP connection only makes progress while its handler is polled.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {e}");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(p) => p,
            Err(e) => {
                let mut session = ChromiumSession {
                    browser,
                    page: None,
                    handler_task,
                };
                let _ = session.close().await;
                return Err(e.into());
            }
        };

        Ok(Box::new(ChromiumSession {
            browser,
            page: Some(page),
            handler_task,
        }))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| AppError::BrowserSetup("session has no open page".to_string()))
    }
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page()?.goto(url).await?;
        Ok(())
    }

    async fn try_click(&mut self, selector: &str) -> Result<bool> {
        // find_element errors when nothing matches
        let element = match self.page()?.find_element(selector).await {
            Ok(el) => el,
            Err(_) => return Ok(false),
        };
        element.click().await?;
        Ok(true)
    }

    async fn is_visible(&mut self, selector: &str) -> Result<bool> {
        let js = format!(
            "(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                const style = window.getComputedStyle(el);
                const rect = el.getBoundingClientRect();
                return style.visibility !== 'hidden' && rect.width > 0 && rect.height > 0;
            }})()",
            sel = serde_json::to_string(selector)?,
        );
        let visible = self.page()?.evaluate(js).await?.into_value::<bool>()?;
        Ok(visible)
    }

    async fn field_texts(&mut self, container: &str, field: &str) -> Result<Vec<Vec<String>>> {
        let js = format!(
            "Array.from(document.querySelectorAll({c})).map(el =>
                Array.from(el.querySelectorAll({f})).map(s => s.innerText))",
            c = serde_json::to_string(container)?,
            f = serde_json::to_string(field)?,
        );
        let texts = self
            .page()?
            .evaluate(js)
            .await?
            .into_value::<Vec<Vec<String>>>()?;
        Ok(texts)
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page()?.save_screenshot(params, path).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.page = None;
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("Browser process did not exit: {e}");
        }
        self.handler_task.abort();
        closed?;
        Ok(())
    }
}
