//! The date-bounded pagination loop.
//!
//! A session walks through these phases:
//!
//! ```text
//! Init -> Searching -> Sorting -> [SelectingTopic] -> Paginating -> Done
//! ```
//!
//! While paginating, each result page is filtered through the [`DateWindow`]
//! and appended to the run's [`SearchArticleCollection`]. The loop stops as
//! soon as one of these holds:
//!
//! 1. every article on the page predates the window (window exhausted),
//! 2. the configured page cap is reached,
//! 3. the adapter reports there is no further page.
//!
//! Stopping relies on the site listing results newest-first. Relative stamps
//! resolved at different moments can make a page slightly out of order, so
//! the stop may come one page early or late.

use std::fmt;
use tracing::{debug, error, info, instrument, warn};

use crate::collections::SearchArticleCollection;
use crate::dates::{display_string, DateSeparator, DateWindow};
use crate::error::{AdapterError, CollectionError, ScrapeError};
use crate::sites::SiteBrowserAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapePhase {
    Init,
    Searching,
    Sorting,
    SelectingTopic,
    Paginating,
    Done,
}

impl fmt::Display for ScrapePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScrapePhase::Init => "open site",
            ScrapePhase::Searching => "search",
            ScrapePhase::Sorting => "sort newest",
            ScrapePhase::SelectingTopic => "select topic",
            ScrapePhase::Paginating => "paginate",
            ScrapePhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A whole page predated the window.
    WindowExhausted,
    /// The site had no further result page.
    PagesExhausted,
    /// The configured page cap was hit first.
    PageCapReached,
}

impl Termination {
    /// Whether the window was fully covered.
    pub fn is_complete(&self) -> bool {
        matches!(self, Termination::WindowExhausted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub pages_visited: usize,
    pub termination: Termination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOutcome {
    pub articles: SearchArticleCollection,
    pub pages_visited: usize,
    pub termination: Termination,
}

/// What one session searches for.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams<'a> {
    pub phrase: &'a str,
    pub topic: Option<&'a str>,
    pub window: DateWindow,
}

fn step(phase: ScrapePhase) -> impl FnOnce(AdapterError) -> ScrapeError {
    move |source| ScrapeError::Step { phase, source }
}

#[derive(Debug)]
pub struct PaginatedDateRangeScraper {
    max_pages: usize,
    phase: ScrapePhase,
}

impl PaginatedDateRangeScraper {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
            phase: ScrapePhase::Init,
        }
    }

    pub fn phase(&self) -> ScrapePhase {
        self.phase
    }

    fn enter(&mut self, phase: ScrapePhase) {
        debug!(from = %self.phase, to = %phase, "Scrape phase transition");
        self.phase = phase;
    }

    /// Drive a full session: open, search, sort, optionally select a topic,
    /// then paginate through the window.
    #[instrument(level = "info", skip_all, fields(site = adapter.site_name(), phrase = params.phrase))]
    pub async fn run_session(
        &mut self,
        adapter: &mut dyn SiteBrowserAdapter,
        params: &SearchParams<'_>,
    ) -> Result<ScrapeOutcome, ScrapeError> {
        self.enter(ScrapePhase::Init);
        adapter.open_site().await.map_err(step(ScrapePhase::Init))?;

        self.enter(ScrapePhase::Searching);
        adapter.search(params.phrase).await.map_err(step(ScrapePhase::Searching))?;

        self.enter(ScrapePhase::Sorting);
        adapter.sort_newest().await.map_err(step(ScrapePhase::Sorting))?;

        if let Some(topic) = params.topic {
            self.enter(ScrapePhase::SelectingTopic);
            let selected = adapter
                .select_topic(topic)
                .await
                .map_err(step(ScrapePhase::SelectingTopic))?;
            if !selected {
                error!(topic, "Requested topic is not offered; aborting");
                return Err(ScrapeError::UnknownTopic(topic.to_string()));
            }
            info!(topic, "Topic selected");
        }

        let mut articles = SearchArticleCollection::new(params.phrase);
        let pagination = self
            .scrape_into(adapter, params.phrase, &params.window, &mut articles)
            .await?;
        self.enter(ScrapePhase::Done);

        Ok(ScrapeOutcome {
            articles,
            pages_visited: pagination.pages_visited,
            termination: pagination.termination,
        })
    }

    /// Paginate from the current result page, appending in-window articles
    /// to `collected`.
    ///
    /// `collected` must have been created for `phrase`.
    pub async fn scrape_into(
        &mut self,
        adapter: &mut dyn SiteBrowserAdapter,
        phrase: &str,
        window: &DateWindow,
        collected: &mut SearchArticleCollection,
    ) -> Result<Pagination, ScrapeError> {
        if collected.phrase() != phrase {
            return Err(CollectionError::PhraseMismatch {
                expected: collected.phrase().to_string(),
                found: phrase.to_string(),
            }
            .into());
        }

        self.enter(ScrapePhase::Paginating);
        let oldest = display_string(&window.start(), DateSeparator::Slash, true);
        let mut page = 1usize;

        let termination = loop {
            let page_articles = adapter
                .fetch_page_articles(phrase)
                .await
                .map_err(step(ScrapePhase::Paginating))?;
            let in_window = page_articles.filter_within_range(window);
            info!(
                page,
                found = page_articles.len(),
                kept = in_window.len(),
                "Scraped result page"
            );
            collected.extend_articles(in_window);

            if page_articles.all_before(&window.start()) {
                info!(page, %oldest, "Every article on the page predates the window");
                break Termination::WindowExhausted;
            }

            if page >= self.max_pages {
                warn!(
                    page,
                    max_pages = self.max_pages,
                    %oldest,
                    "Page cap reached before the window was exhausted; returning partial results"
                );
                break Termination::PageCapReached;
            }

            let advanced = adapter
                .advance_page(page)
                .await
                .map_err(step(ScrapePhase::Paginating))?;
            if !advanced {
                warn!(
                    page,
                    %oldest,
                    "No further result pages before the window was exhausted"
                );
                break Termination::PagesExhausted;
            }
            page += 1;
        };

        Ok(Pagination {
            pages_visited: page,
            termination,
        })
    }
}
