//! Ordered article containers.
//!
//! Insertion order is scrape order, which is the site's newest-first order.
//! That order is not strictly monotonic: relative stamps ("N minutes ago")
//! are resolved when each page is read, so two pages resolve against two
//! different "now"s.

use crate::dates::{DateWindow, Timestamp};
use crate::error::CollectionError;
use crate::models::{Article, ExportRow, SearchArticle};

/// The articles found on one result page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleCollection {
    articles: Vec<Article>,
}

impl ArticleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, article: Article) {
        self.articles.push(article);
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Article> {
        self.articles.iter()
    }

    /// Articles with `window.start() <= published_at <= window.end()`, in order.
    pub fn filter_within_range(&self, window: &DateWindow) -> ArticleCollection {
        self.articles
            .iter()
            .filter(|article| window.contains(&article.published_at()))
            .cloned()
            .collect()
    }

    /// True when the collection is non-empty and every article was published
    /// strictly before `instant`. An empty collection answers `false`.
    pub fn all_before(&self, instant: &Timestamp) -> bool {
        !self.articles.is_empty() && self.articles.iter().all(|a| a.is_before(instant))
    }
}

impl FromIterator<Article> for ArticleCollection {
    fn from_iter<I: IntoIterator<Item = Article>>(iter: I) -> Self {
        Self {
            articles: iter.into_iter().collect(),
        }
    }
}

impl Extend<Article> for ArticleCollection {
    fn extend<I: IntoIterator<Item = Article>>(&mut self, iter: I) {
        self.articles.extend(iter);
    }
}

impl IntoIterator for ArticleCollection {
    type Item = Article;
    type IntoIter = std::vec::IntoIter<Article>;

    fn into_iter(self) -> Self::IntoIter {
        self.articles.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArticleCollection {
    type Item = &'a Article;
    type IntoIter = std::slice::Iter<'a, Article>;

    fn into_iter(self) -> Self::IntoIter {
        self.articles.iter()
    }
}

/// Articles accumulated for a single search phrase.
///
/// Every member carries exactly the collection's phrase; appending an
/// article found with another phrase fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchArticleCollection {
    phrase: String,
    articles: Vec<SearchArticle>,
}

impl SearchArticleCollection {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            articles: Vec::new(),
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchArticle> {
        self.articles.iter()
    }

    pub fn append(&mut self, article: SearchArticle) -> Result<(), CollectionError> {
        if article.search_phrase() != self.phrase {
            return Err(CollectionError::PhraseMismatch {
                expected: self.phrase.clone(),
                found: article.search_phrase().to_string(),
            });
        }
        self.articles.push(article);
        Ok(())
    }

    /// Append every article, stopping at the first phrase mismatch.
    pub fn extend<I>(&mut self, articles: I) -> Result<(), CollectionError>
    where
        I: IntoIterator<Item = SearchArticle>,
    {
        articles.into_iter().try_for_each(|article| self.append(article))
    }

    /// Append plain articles, tagging each with this collection's phrase.
    pub fn extend_articles(&mut self, articles: ArticleCollection) {
        let phrase = &self.phrase;
        self.articles.extend(
            articles
                .into_iter()
                .map(|article| SearchArticle::new(article, phrase.clone())),
        );
    }

    pub fn filter_within_range(&self, window: &DateWindow) -> SearchArticleCollection {
        Self {
            phrase: self.phrase.clone(),
            articles: self
                .articles
                .iter()
                .filter(|a| window.contains(&a.article().published_at()))
                .cloned()
                .collect(),
        }
    }

    /// Same contract as [`ArticleCollection::all_before`].
    pub fn all_before(&self, instant: &Timestamp) -> bool {
        !self.articles.is_empty() && self.articles.iter().all(|a| a.article().is_before(instant))
    }

    pub fn to_rows(&self) -> Vec<ExportRow> {
        self.articles.iter().map(SearchArticle::to_row).collect()
    }
}

impl<'a> IntoIterator for &'a SearchArticleCollection {
    type Item = &'a SearchArticle;
    type IntoIter = std::slice::Iter<'a, SearchArticle>;

    fn into_iter(self) -> Self::IntoIter {
        self.articles.iter()
    }
}
