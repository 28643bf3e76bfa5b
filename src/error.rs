//! Error types for every layer of a scraping run.
//!
//! Each layer owns a `thiserror` enum; [`RunError`] is the top-level type the
//! runner folds everything into before it logs and reports a boolean result.

use std::path::PathBuf;
use thiserror::Error;

use crate::scraper::ScrapePhase;

/// A timestamp string that none of the date grammars accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateFormatError {
    #[error("unrecognized date format: {0:?}")]
    Unrecognized(String),

    #[error("date string is empty")]
    Empty,

    #[error("date {0:?} does not name a valid calendar date")]
    InvalidDate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("search phrase {found:?} does not match collection phrase {expected:?}")]
    PhraseMismatch { expected: String, found: String },
}

/// Failures raised by a [`SiteBrowserAdapter`](crate::sites::SiteBrowserAdapter).
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("no search has been performed yet")]
    NoActiveSearch,

    #[error("adapter error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("{phase} step failed: {source}")]
    Step {
        phase: ScrapePhase,
        #[source]
        source: AdapterError,
    },

    #[error("topic {0:?} is not offered by the site")]
    UnknownTopic(String),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single image that could not be saved.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("could not write image: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid date bound: {0}")]
    Date(#[from] DateFormatError),

    #[error("no site adapter registered for {0}")]
    UnknownSite(String),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("output directory {path} is not writable: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
