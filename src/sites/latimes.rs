//! Los Angeles Times search adapter.
//!
//! Drives the search pages of [latimes.com](https://www.latimes.com) over
//! plain HTTP. Every control on the search page is a query parameter, so each
//! adapter step rebuilds the search URL and fetches the resulting document.
//!
//! # URL Pattern
//!
//! ```text
//! https://www.latimes.com/search?q=<phrase>&s=1&<facet name>=<facet value>&p=<page>
//! ```
//!
//! `s=1` sorts newest first. The topic facet's parameter name and value are
//! read from the `Topics` filter list of the current page.

use async_trait::async_trait;
use chrono::Local;
use itertools::Itertools;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{SiteBrowserAdapter, SiteContext};
use crate::collections::ArticleCollection;
use crate::dates::{DateNormalizer, Timestamp};
use crate::error::AdapterError;
use crate::models::{Article, ImageSource, NOT_FOUND};
use crate::utils::truncate_for_log;

/// Registry key for this adapter.
pub const HOST: &str = "www.latimes.com";
const SITE_NAME: &str = "Los Angeles Times";
const BASE_URL: &str = "https://www.latimes.com/";

static RESULT_ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".search-results-module-results-menu li").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse(".promo-title").unwrap());
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| Selector::parse(".promo-description").unwrap());
static TIMESTAMP: Lazy<Selector> = Lazy::new(|| Selector::parse(".promo-timestamp").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img.image[src]").unwrap());
static NEXT_PAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".search-results-module-next-page a[href]").unwrap());
static TOPIC_FACET: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-name="Topics"] li"#).unwrap());
static TOPIC_LABEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span").unwrap());
static TOPIC_INPUT: Lazy<Selector> = Lazy::new(|| Selector::parse("input[name]").unwrap());

/// The state of the search form, expressed as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SearchQuery {
    phrase: String,
    sort_newest: bool,
    topic: Option<(String, String)>,
    page: usize,
}

impl SearchQuery {
    fn new(phrase: &str) -> Self {
        Self {
            phrase: phrase.to_string(),
            page: 1,
            ..Self::default()
        }
    }

    fn url(&self, base: &Url) -> Result<Url, AdapterError> {
        let mut url = base.join("search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &self.phrase);
            if self.sort_newest {
                pairs.append_pair("s", "1");
            }
            if let Some((name, value)) = &self.topic {
                pairs.append_pair(name, value);
            }
            if self.page > 1 {
                pairs.append_pair("p", &self.page.to_string());
            }
        }
        Ok(url)
    }
}

pub struct LaTimesAdapter {
    client: Client,
    base: Url,
    normalizer: DateNormalizer,
    query: Option<SearchQuery>,
    current_html: Option<String>,
}

impl LaTimesAdapter {
    pub fn new(ctx: &SiteContext) -> Result<Self, AdapterError> {
        Ok(Self {
            client: ctx.client.clone(),
            base: Url::parse(BASE_URL)?,
            normalizer: ctx.normalizer,
            query: None,
            current_html: None,
        })
    }

    fn current_html(&self) -> Result<&str, AdapterError> {
        self.current_html.as_deref().ok_or(AdapterError::NoActiveSearch)
    }

    fn query_mut(&mut self) -> Result<&mut SearchQuery, AdapterError> {
        self.query.as_mut().ok_or(AdapterError::NoActiveSearch)
    }

    async fn get_text(&self, url: &Url) -> Result<String, AdapterError> {
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Fetch the page the current query describes and make it current.
    async fn load_query(&mut self) -> Result<(), AdapterError> {
        let url = match &self.query {
            Some(query) => query.url(&self.base)?,
            None => return Err(AdapterError::NoActiveSearch),
        };
        let html = self.get_text(&url).await?;
        info!(%url, bytes = html.len(), "Loaded search page");
        self.current_html = Some(html);
        Ok(())
    }
}

#[async_trait]
impl SiteBrowserAdapter for LaTimesAdapter {
    fn site_name(&self) -> &str {
        SITE_NAME
    }

    #[instrument(level = "info", skip_all)]
    async fn open_site(&mut self) -> Result<(), AdapterError> {
        let html = self.get_text(&self.base).await?;
        info!(url = %self.base, bytes = html.len(), "Opened site");
        Ok(())
    }

    async fn search(&mut self, phrase: &str) -> Result<(), AdapterError> {
        self.query = Some(SearchQuery::new(phrase));
        self.load_query().await
    }

    async fn sort_newest(&mut self) -> Result<(), AdapterError> {
        self.query_mut()?.sort_newest = true;
        self.load_query().await
    }

    async fn select_topic(&mut self, topic: &str) -> Result<bool, AdapterError> {
        let html = self.current_html()?;
        let Some(param) = find_topic_param(html, topic) else {
            let offered = available_topics(html);
            warn!(topic, ?offered, "Topic not offered on the search page");
            return Ok(false);
        };
        debug!(topic, name = %param.0, value = %param.1, "Found topic facet");

        let query = self.query_mut()?;
        query.topic = Some(param);
        query.page = 1;
        self.load_query().await?;
        Ok(true)
    }

    async fn fetch_page_articles(&mut self, _phrase: &str) -> Result<ArticleCollection, AdapterError> {
        let html = self.current_html()?;
        Ok(parse_results_page(html, &self.normalizer, Local::now()))
    }

    async fn advance_page(&mut self, current_page: usize) -> Result<bool, AdapterError> {
        if !has_next_page(self.current_html()?) {
            debug!(current_page, "No next-page link");
            return Ok(false);
        }
        self.query_mut()?.page = current_page + 1;
        self.load_query().await?;
        Ok(true)
    }

    async fn close(&mut self) -> Result<(), AdapterError> {
        self.query = None;
        self.current_html = None;
        debug!("Closed LA Times session");
        Ok(())
    }
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

fn text_of(item: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector).next().map(collapsed_text)
}

/// Extract every result on a search page.
///
/// Missing titles and descriptions become [`NOT_FOUND`]; a missing image
/// becomes [`ImageSource::NotFound`]; a result without a parseable
/// timestamp is skipped. Relative stamps resolve against `now`.
pub fn parse_results_page(html: &str, normalizer: &DateNormalizer, now: Timestamp) -> ArticleCollection {
    let document = Html::parse_document(html);
    let mut articles = ArticleCollection::new();

    for (index, item) in document.select(&RESULT_ITEM).enumerate() {
        let Some(stamp) = text_of(&item, &TIMESTAMP) else {
            warn!(index, "Result has no timestamp; skipping");
            continue;
        };
        let published_at = match normalizer.parse_at(&stamp, now) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(index, error = %e, "Unparseable result timestamp; skipping");
                continue;
            }
        };

        let title = text_of(&item, &TITLE)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| {
                warn!(index, "Result has no title");
                NOT_FOUND.to_string()
            });
        let description = text_of(&item, &DESCRIPTION)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| {
                warn!(index, title = %truncate_for_log(&title, 80), "Result has no description");
                NOT_FOUND.to_string()
            });
        let image = item
            .select(&IMAGE)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| ImageSource::Url(src.to_string()))
            .unwrap_or_else(|| {
                warn!(index, title = %truncate_for_log(&title, 80), "Result has no image");
                ImageSource::NotFound
            });

        articles.push(Article::new(title, published_at, description, image));
    }

    debug!(count = articles.len(), "Parsed search results");
    articles
}

/// The query parameter that applies the topic facet labelled `topic`.
pub fn find_topic_param(html: &str, topic: &str) -> Option<(String, String)> {
    let document = Html::parse_document(html);
    let wanted = topic.trim();
    document.select(&TOPIC_FACET).find_map(|facet| {
        let label = text_of(&facet, &TOPIC_LABEL)?;
        if !label.eq_ignore_ascii_case(wanted) {
            return None;
        }
        let input = facet.select(&TOPIC_INPUT).next()?;
        let name = input.value().attr("name")?;
        let value = input.value().attr("value")?;
        Some((name.to_string(), value.to_string()))
    })
}

pub fn available_topics(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&TOPIC_FACET)
        .filter_map(|facet| text_of(&facet, &TOPIC_LABEL))
        .collect()
}

pub fn has_next_page(html: &str) -> bool {
    Html::parse_document(html).select(&NEXT_PAGE).next().is_some()
}
