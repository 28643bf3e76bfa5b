//! Downloading article thumbnails.
//!
//! Images are fetched one at a time after the scrape, into a flat directory
//! keyed by the image's file name. A failed download is logged and counted;
//! it never fails the run.

use itertools::Itertools;
use reqwest::Client;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::collections::SearchArticleCollection;
use crate::error::ImageError;
use crate::utils::truncate_for_log;

/// Tally of one [`ImageDownloader::download_all`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    /// Articles without an image, plus repeats of an already queued file name.
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
}

impl ImageDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download every distinct image referenced by `articles` into `dir`.
    ///
    /// # Arguments
    ///
    /// * `articles` - The run's collected articles
    /// * `dir` - Existing directory the images are written to
    ///
    /// # Returns
    ///
    /// A [`DownloadSummary`]. Individual failures are logged at `warn`.
    #[instrument(level = "info", skip_all, fields(dir = %dir.display(), articles = articles.len()))]
    pub async fn download_all(&self, articles: &SearchArticleCollection, dir: &Path) -> DownloadSummary {
        let mut summary = DownloadSummary::default();

        let candidates: Vec<(String, String)> = articles
            .iter()
            .filter_map(|search| {
                let image = search.article().image();
                match (image.image_url(), image.file_name()) {
                    (Some(url), Some(name)) => Some((url, name)),
                    _ => {
                        warn!(
                            title = %truncate_for_log(search.article().title(), 80),
                            "Article has no image; skipping"
                        );
                        None
                    }
                }
            })
            .collect();
        summary.skipped += articles.len() - candidates.len();

        let queued = candidates.len();
        let targets: Vec<(String, String)> = candidates
            .into_iter()
            .unique_by(|(_, name)| name.clone())
            .collect();
        if targets.len() < queued {
            debug!(duplicates = queued - targets.len(), "Dropped repeated image file names");
        }
        summary.skipped += queued - targets.len();

        for (url, name) in targets {
            let path = dir.join(&name);
            match self.download(&url, &path).await {
                Ok(bytes) => {
                    debug!(%url, path = %path.display(), bytes, "Saved image");
                    summary.downloaded += 1;
                }
                Err(e) => {
                    warn!(%url, error = %e, "Image download failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            "Finished image downloads"
        );
        summary
    }

    async fn download(&self, url: &str, path: &Path) -> Result<usize, ImageError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        fs::write(path, &body).await?;
        Ok(body.len())
    }
}
