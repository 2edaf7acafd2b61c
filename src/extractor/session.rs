use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::config::POLL_BACKOFF_MS;
use crate::error::Result;

/// A single rendered page. The extractor only talks to the browser through this.
#[async_trait]
pub trait PageSession: Send {
    /// Loads `url` and resolves once navigation has completed.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Clicks the first element matching `selector`. `Ok(false)` if there is none.
    async fn try_click(&mut self, selector: &str) -> Result<bool>;

    /// True when an element matching `selector` exists and has a rendered box.
    async fn is_visible(&mut self, selector: &str) -> Result<bool>;

    /// For each element matching `container`, the inner texts of its `field` descendants.
    async fn field_texts(&mut self, container: &str, field: &str) -> Result<Vec<Vec<String>>>;

    /// Writes a full-page PNG capture to `path`.
    async fn screenshot(&mut self, path: &Path) -> Result<()>;

    /// Releases the browser. Called once per session, on every exit path.
    async fn close(&mut self) -> Result<()>;
}

/// Produces page sessions. One session per run.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageSession>>;
}

/// Deadline-bounded poll pacing. Each `wait` sleeps for the next backoff step,
/// clipped to the remaining budget.
pub struct Backoff {
    deadline: Instant,
    idx: usize,
}

impl Backoff {
    pub fn new(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
            idx: 0,
        }
    }

    /// Sleeps before the next attempt. Returns false once the budget is spent.
    pub async fn wait(&mut self) -> bool {
        let now = Instant::now();
        if now >= self.deadline {
            return false;
        }

        let delay_ms = POLL_BACKOFF_MS
            .get(self.idx)
            .copied()
            .unwrap_or(POLL_BACKOFF_MS[POLL_BACKOFF_MS.len() - 1]);
        self.idx = (self.idx + 1).min(POLL_BACKOFF_MS.len() - 1);

        let delay = Duration::from_millis(delay_ms).min(self.deadline - now);
        tokio::time::sleep(delay).await;
        true
    }
}
