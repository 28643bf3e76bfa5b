//! # news_window
//!
//! Searches a news website for a phrase, walks the newest-first result pages
//! until they fall out of a date window, and exports what it found.
//!
//! ## Architecture
//!
//! 1. **Dates**: [`dates::DateNormalizer`] turns the caller's bounds and the
//!    site's timestamps into absolute instants
//! 2. **Sites**: a [`sites::SiteBrowserAdapter`] drives one website; adapters
//!    are picked from a [`sites::AdapterRegistry`] by host
//! 3. **Scraping**: [`scraper::PaginatedDateRangeScraper`] runs the session
//!    and decides when to stop paging
//! 4. **Output**: [`outputs`] writes the spreadsheet and [`images`] saves
//!    thumbnails
//!
//! [`runner::run`] ties the steps together and reports a plain success flag.

pub mod cli;
pub mod collections;
pub mod config;
pub mod dates;
pub mod error;
pub mod images;
pub mod logging;
pub mod models;
pub mod outputs;
pub mod runner;
pub mod scraper;
pub mod sites;
pub mod utils;

pub use collections::{ArticleCollection, SearchArticleCollection};
pub use config::ScraperConfig;
pub use dates::{DateNormalizer, DateWindow, Timestamp};
pub use models::{Article, ImageSource, SearchArticle};
pub use runner::{run, run_with_registry, RunRequest};
pub use scraper::PaginatedDateRangeScraper;
pub use sites::{AdapterRegistry, SiteBrowserAdapter};
