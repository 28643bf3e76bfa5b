//! One complete scraping run, from date strings to files on disk.
//!
//! # Pipeline
//!
//! 1. **Validate**: parse both date bounds before touching the network
//! 2. **Prepare**: make sure the export and image directories are writable
//! 3. **Resolve**: pick the site adapter for the website URL
//! 4. **Scrape**: run the paginated session; the adapter is always closed
//! 5. **Export**: write the tabular file (skipped for zero articles)
//! 6. **Images**: download thumbnails, tolerating individual failures
//!
//! [`run`] reports only success or failure. Every failure is logged before
//! it is folded into `false`.

use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::config::ScraperConfig;
use crate::dates::{display_string, DateNormalizer, DateSeparator};
use crate::error::{RunError, ScrapeError};
use crate::images::{DownloadSummary, ImageDownloader};
use crate::outputs::exporter_for;
use crate::scraper::{PaginatedDateRangeScraper, ScrapePhase, SearchParams, Termination};
use crate::sites::{AdapterRegistry, SiteContext};
use crate::utils::ensure_writable_dir;

/// Everything a caller supplies for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub website_url: String,
    pub search_phrase: String,
    /// Either bound may be the older one.
    pub start_date_text: String,
    pub end_date_text: String,
    pub export_dir: PathBuf,
    pub images_dir: PathBuf,
    /// Topic facet label; `None` or blank searches all topics.
    pub topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub articles: usize,
    pub pages_visited: usize,
    pub termination: Termination,
    pub export_path: Option<PathBuf>,
    pub images: DownloadSummary,
}

/// Run against the sites shipped with this crate.
///
/// # Returns
///
/// `true` when the scrape finished, including partial results after the
/// site ran out of pages. `false` on any fatal error, which is logged.
pub async fn run(request: &RunRequest, config: &ScraperConfig) -> bool {
    run_with_registry(&AdapterRegistry::with_default_sites(), request, config).await
}

#[instrument(level = "info", skip_all, fields(site = %request.website_url, phrase = %request.search_phrase))]
pub async fn run_with_registry(registry: &AdapterRegistry, request: &RunRequest, config: &ScraperConfig) -> bool {
    let started = Instant::now();
    match execute(registry, request, config).await {
        Ok(report) => {
            info!(
                articles = report.articles,
                pages = report.pages_visited,
                termination = ?report.termination,
                export = ?report.export_path,
                images_downloaded = report.images.downloaded,
                images_failed = report.images.failed,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Run finished"
            );
            true
        }
        Err(e) => {
            log_failure(&e);
            false
        }
    }
}

fn log_failure(err: &RunError) {
    match err {
        RunError::Scrape(ScrapeError::Step {
            phase: ScrapePhase::Init | ScrapePhase::Searching | ScrapePhase::Sorting,
            ..
        }) => error!(severity = "critical", error = %err, "Run aborted"),
        _ => error!(error = %err, "Run failed"),
    }
}

/// The run pipeline, with the failure kept as a typed error.
pub async fn execute(
    registry: &AdapterRegistry,
    request: &RunRequest,
    config: &ScraperConfig,
) -> Result<RunReport, RunError> {
    let normalizer = DateNormalizer::new(config.empty_date_policy);
    let window = normalizer.normalize_window(&request.start_date_text, &request.end_date_text)?;
    info!(
        start = %display_string(&window.start(), DateSeparator::Slash, true),
        end = %display_string(&window.end(), DateSeparator::Slash, true),
        "Date window"
    );

    for dir in [&request.export_dir, &request.images_dir] {
        ensure_writable_dir(dir)
            .await
            .map_err(|source| RunError::OutputDir {
                path: dir.clone(),
                source,
            })?;
    }

    let ctx = SiteContext::from_config(config)?;
    let mut adapter = registry.resolve(&request.website_url, &ctx)?;

    let params = SearchParams {
        phrase: &request.search_phrase,
        topic: request.topic.as_deref().filter(|t| !t.trim().is_empty()),
        window,
    };
    let mut scraper = PaginatedDateRangeScraper::new(config.max_pages);
    let session = scraper.run_session(adapter.as_mut(), &params).await;
    if let Err(e) = adapter.close().await {
        warn!(error = %e, "Failed to close the site session");
    }
    let outcome = session?;

    let rows = outcome.articles.to_rows();
    let export_path = exporter_for(config.export_format, &config.sheet_name).export(&rows, &request.export_dir)?;

    let images = ImageDownloader::new(ctx.client.clone())
        .download_all(&outcome.articles, &request.images_dir)
        .await;

    Ok(RunReport {
        articles: outcome.articles.len(),
        pages_visited: outcome.pages_visited,
        termination: outcome.termination,
        export_path,
        images,
    })
}
