//! Site adapters: the boundary between the scraping loop and a concrete
//! news website.
//!
//! A [`SiteBrowserAdapter`] knows how to open one site, run a search, sort
//! the results newest-first, narrow them to a topic facet, and read result
//! pages one at a time. The paginated scraper only ever talks to this trait.
//!
//! Adapters are looked up through an [`AdapterRegistry`] keyed by the site's
//! host name, resolved once at the start of a run.
//!
//! # Supported Sites
//!
//! | Site | Module | Host |
//! |------|--------|------|
//! | Los Angeles Times | [`latimes`] | `www.latimes.com` |

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};
use url::Url;

use crate::collections::ArticleCollection;
use crate::config::ScraperConfig;
use crate::dates::DateNormalizer;
use crate::error::{AdapterError, RunError};

pub mod latimes;

#[cfg(test)]
pub(crate) mod scripted;

/// Capabilities a site driver provides to the scraping loop.
///
/// Calls are strictly sequential; an implementation never sees two calls in
/// flight at once.
#[async_trait]
pub trait SiteBrowserAdapter: Send {
    /// Human-readable site name for logs.
    fn site_name(&self) -> &str;

    async fn open_site(&mut self) -> Result<(), AdapterError>;

    async fn search(&mut self, phrase: &str) -> Result<(), AdapterError>;

    async fn sort_newest(&mut self) -> Result<(), AdapterError>;

    /// Narrow results to the topic facet labelled `topic`.
    ///
    /// Returns `Ok(false)` when no facet carries that label.
    async fn select_topic(&mut self, topic: &str) -> Result<bool, AdapterError>;

    /// Read the articles on the current result page.
    ///
    /// A result whose fields cannot all be extracted is either kept with a
    /// sentinel value or skipped; it never fails the page.
    async fn fetch_page_articles(&mut self, phrase: &str) -> Result<ArticleCollection, AdapterError>;

    /// Move from `current_page` to the next page.
    ///
    /// Returns `Ok(false)` when there is no further page.
    async fn advance_page(&mut self, current_page: usize) -> Result<bool, AdapterError>;

    async fn close(&mut self) -> Result<(), AdapterError>;
}

/// Shared collaborators handed to every adapter constructor.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub client: Client,
    pub normalizer: DateNormalizer,
}

impl SiteContext {
    pub fn from_config(config: &ScraperConfig) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            normalizer: DateNormalizer::new(config.empty_date_policy),
        })
    }
}

pub type AdapterConstructor =
    Box<dyn Fn(&SiteContext) -> Result<Box<dyn SiteBrowserAdapter>, AdapterError> + Send + Sync>;

/// Maps a site's host name to the constructor of its adapter.
#[derive(Default)]
pub struct AdapterRegistry {
    constructors: HashMap<String, AdapterConstructor>,
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("sites", &self.sites())
            .finish()
    }
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every adapter shipped in this crate.
    pub fn with_default_sites() -> Self {
        let mut registry = Self::new();
        registry.register(latimes::HOST, |ctx| {
            Ok(Box::new(latimes::LaTimesAdapter::new(ctx)?) as Box<dyn SiteBrowserAdapter>)
        });
        registry
    }

    pub fn register<F>(&mut self, site_id: &str, constructor: F)
    where
        F: Fn(&SiteContext) -> Result<Box<dyn SiteBrowserAdapter>, AdapterError> + Send + Sync + 'static,
    {
        debug!(site_id, "Registering site adapter");
        self.constructors
            .insert(site_id.to_ascii_lowercase(), Box::new(constructor));
    }

    pub fn sites(&self) -> Vec<&str> {
        let mut sites: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        sites.sort_unstable();
        sites
    }

    /// Build the adapter for `website_url`, keyed by its host.
    pub fn resolve(
        &self,
        website_url: &str,
        ctx: &SiteContext,
    ) -> Result<Box<dyn SiteBrowserAdapter>, RunError> {
        let host = site_id(website_url).ok_or_else(|| RunError::UnknownSite(website_url.to_string()))?;
        let constructor = self
            .constructors
            .get(&host)
            .ok_or_else(|| RunError::UnknownSite(website_url.to_string()))?;
        let adapter = constructor(ctx)?;
        info!(site = adapter.site_name(), %host, "Resolved site adapter");
        Ok(adapter)
    }
}

/// The registry key for a URL: its lowercased host.
pub fn site_id(website_url: &str) -> Option<String> {
    Url::parse(website_url)
        .ok()?
        .host_str()
        .map(str::to_ascii_lowercase)
}
