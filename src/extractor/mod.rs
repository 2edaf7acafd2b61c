pub mod chromium;
pub mod scrape;
pub mod session;

pub use chromium::ChromiumLauncher;
pub use scrape::extract_listings;
pub use session::SessionFactory;
