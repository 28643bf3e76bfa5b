//! In-memory adapter that replays a fixed script of result pages and records
//! every call made to it.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::SiteBrowserAdapter;
use crate::collections::ArticleCollection;
use crate::error::AdapterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    OpenSite,
    Search(String),
    SortNewest,
    SelectTopic(String),
    FetchPage(usize),
    AdvancePage(usize),
    Close,
}

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub pages: Vec<ArticleCollection>,
    pub topics: Vec<String>,
    pub fail_open: bool,
    pub fail_search: bool,
    pub fail_sort: bool,
    /// `advance_page(n)` fails with an error for this `n`.
    pub advance_error_on: Option<usize>,
}

impl Script {
    pub fn with_pages(pages: Vec<ArticleCollection>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

#[derive(Debug)]
pub struct ScriptedAdapter {
    script: Script,
    page_index: usize,
    calls: CallLog,
}

impl ScriptedAdapter {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            page_index: 0,
            calls: CallLog::default(),
        }
    }

    /// Record calls into an existing log, for adapters built inside a registry.
    pub fn with_log(script: Script, calls: CallLog) -> Self {
        Self {
            script,
            page_index: 0,
            calls,
        }
    }

    pub fn call_log(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn fetch_count(calls: &CallLog) -> usize {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| matches!(c, Call::FetchPage(_)))
        .count()
}

pub fn advance_count(calls: &CallLog) -> usize {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| matches!(c, Call::AdvancePage(_)))
        .count()
}

#[async_trait]
impl SiteBrowserAdapter for ScriptedAdapter {
    fn site_name(&self) -> &str {
        "scripted"
    }

    async fn open_site(&mut self) -> Result<(), AdapterError> {
        self.record(Call::OpenSite);
        if self.script.fail_open {
            return Err(AdapterError::Other("site unreachable".to_string()));
        }
        Ok(())
    }

    async fn search(&mut self, phrase: &str) -> Result<(), AdapterError> {
        self.record(Call::Search(phrase.to_string()));
        if self.script.fail_search {
            return Err(AdapterError::Other("search box missing".to_string()));
        }
        Ok(())
    }

    async fn sort_newest(&mut self) -> Result<(), AdapterError> {
        self.record(Call::SortNewest);
        if self.script.fail_sort {
            return Err(AdapterError::Other("sort control missing".to_string()));
        }
        Ok(())
    }

    async fn select_topic(&mut self, topic: &str) -> Result<bool, AdapterError> {
        self.record(Call::SelectTopic(topic.to_string()));
        Ok(self
            .script
            .topics
            .iter()
            .any(|t| t.eq_ignore_ascii_case(topic)))
    }

    async fn fetch_page_articles(&mut self, _phrase: &str) -> Result<ArticleCollection, AdapterError> {
        self.record(Call::FetchPage(self.page_index + 1));
        Ok(self
            .script
            .pages
            .get(self.page_index)
            .cloned()
            .unwrap_or_default())
    }

    async fn advance_page(&mut self, current_page: usize) -> Result<bool, AdapterError> {
        self.record(Call::AdvancePage(current_page));
        if self.script.advance_error_on == Some(current_page) {
            return Err(AdapterError::Other(format!("next button missing on page {current_page}")));
        }
        if current_page < self.script.pages.len() {
            self.page_index = current_page;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn close(&mut self) -> Result<(), AdapterError> {
        self.record(Call::Close);
        Ok(())
    }
}
