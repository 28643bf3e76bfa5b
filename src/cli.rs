//! Command-line interface definitions for news_window.
//!
//! Flags given here override the matching values of the YAML config file.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{EmptyDatePolicy, ExportFormat, ScraperConfig};
use crate::dates::month_window;
use crate::runner::RunRequest;

/// Command-line arguments for one scraping run.
///
/// The date window is either an explicit pair of bounds or a span of
/// calendar months ending with the current one. With neither, the current
/// month is scraped.
///
/// # Examples
///
/// ```sh
/// # Explicit bounds, in either order
/// news_window -p wildfire --start-date 01/05/2024 --end-date "Feb. 1, 2024"
///
/// # The last three months, narrowed to a topic, as JSON
/// news_window -p wildfire -t California --months 3 --format json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Website to search
    #[arg(long, default_value = "https://www.latimes.com/")]
    pub website_url: String,

    /// Phrase to search for
    #[arg(short, long)]
    pub phrase: String,

    /// Topic facet to narrow the results to
    #[arg(short, long)]
    pub topic: Option<String>,

    /// One bound of the date window (MM/DD/YYYY, "Jan. 5, 2024", "3 hours ago")
    #[arg(long, requires = "end_date")]
    pub start_date: Option<String>,

    /// The other bound of the date window
    #[arg(long, requires = "start_date")]
    pub end_date: Option<String>,

    /// Scrape this many calendar months, counting the current one
    #[arg(long, conflicts_with_all = ["start_date", "end_date"])]
    pub months: Option<u32>,

    /// Output directory for the exported spreadsheet
    #[arg(short, long, default_value = "output")]
    pub export_dir: PathBuf,

    /// Output directory for downloaded images
    #[arg(short, long, default_value = "output/images")]
    pub images_dir: PathBuf,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the run's log file
    #[arg(long, env = "NEWS_WINDOW_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Maximum number of result pages to visit
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// How to treat an article with an empty timestamp
    #[arg(long, value_enum)]
    pub empty_date: Option<EmptyDatePolicy>,

    /// Export file format
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,
}

impl Cli {
    /// The two date bound strings, resolving `--months` against `today`.
    ///
    /// `None` when the month span cannot be represented.
    pub fn date_bounds(&self, today: NaiveDate) -> Option<(String, String)> {
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            return Some((start.clone(), end.clone()));
        }
        let (first, last) = month_window(self.months.unwrap_or(1), today)?;
        Some((
            first.format("%m/%d/%Y").to_string(),
            last.format("%m/%d/%Y").to_string(),
        ))
    }

    pub fn run_request(&self, today: NaiveDate) -> Option<RunRequest> {
        let (start_date_text, end_date_text) = self.date_bounds(today)?;
        Some(RunRequest {
            website_url: self.website_url.clone(),
            search_phrase: self.phrase.clone(),
            start_date_text,
            end_date_text,
            export_dir: self.export_dir.clone(),
            images_dir: self.images_dir.clone(),
            topic: self.topic.clone(),
        })
    }

    /// Overwrite config values with the flags that were given.
    pub fn apply_overrides(&self, config: &mut ScraperConfig) {
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(policy) = self.empty_date {
            config.empty_date_policy = policy;
        }
        if let Some(format) = self.format {
            config.export_format = format;
        }
    }
}
