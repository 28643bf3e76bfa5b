//! Data models for scraped search results and their export rows.
//!
//! - [`Article`]: one search result as the site shows it
//! - [`ImageSource`]: the result's thumbnail source, or a sentinel
//! - [`SearchArticle`]: an article paired with the phrase that found it
//! - [`ExportRow`]: the flat record written to the spreadsheet
//!
//! Articles are immutable once built. Everything derived from the text
//! (phrase counts, money mentions) is computed on demand.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use url::Url;

use crate::dates::{display_string, DateSeparator, Timestamp};

/// Placeholder for a field the adapter could not extract.
pub const NOT_FOUND: &str = "not found";

static MONEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$\d{1,3}((,?\d{3})|(\d*))*(\.\d{1,2})?|(\d{1,3}(,?\d{3})*(\.\d{1,2})? (dollars|USD))",
    )
    .unwrap()
});

/// Where a result's thumbnail lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    /// The result had no image element.
    NotFound,
}

impl ImageSource {
    /// The URL to download.
    ///
    /// CDN resizer links carry the original image in a `url` query
    /// parameter; that parameter wins when present.
    pub fn image_url(&self) -> Option<String> {
        let ImageSource::Url(src) = self else {
            return None;
        };
        match Url::parse(src) {
            Ok(parsed) => parsed
                .query_pairs()
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.into_owned())
                .or_else(|| Some(src.clone())),
            Err(_) => Some(src.clone()),
        }
    }

    /// Last path segment of [`image_url`](Self::image_url).
    pub fn file_name(&self) -> Option<String> {
        let url = self.image_url()?;
        let path = match Url::parse(&url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url,
        };
        path.rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Url(src) => f.write_str(src),
            ImageSource::NotFound => f.write_str(NOT_FOUND),
        }
    }
}

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    title: String,
    published_at: Timestamp,
    description: String,
    image: ImageSource,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        published_at: Timestamp,
        description: impl Into<String>,
        image: ImageSource,
    ) -> Self {
        Self {
            title: title.into(),
            published_at,
            description: description.into(),
            image,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn published_at(&self) -> Timestamp {
        self.published_at
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image(&self) -> &ImageSource {
        &self.image
    }

    pub fn is_before(&self, instant: &Timestamp) -> bool {
        self.published_at < *instant
    }

    /// Whether the title or description mentions an amount of money, e.g.
    /// `$11.1`, `$111,111.11` or `11 dollars`.
    pub fn mentions_money(&self) -> bool {
        MONEY.is_match(&self.title) || MONEY.is_match(&self.description)
    }
}

/// An [`Article`] together with the phrase it was found with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchArticle {
    article: Article,
    search_phrase: String,
}

impl SearchArticle {
    pub fn new(article: Article, search_phrase: impl Into<String>) -> Self {
        Self {
            article,
            search_phrase: search_phrase.into(),
        }
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    pub fn search_phrase(&self) -> &str {
        &self.search_phrase
    }

    /// Case-insensitive occurrences of the phrase in title plus description.
    pub fn phrase_count(&self) -> usize {
        let phrase = self.search_phrase.to_lowercase();
        if phrase.is_empty() {
            return 0;
        }
        let title = self.article.title.to_lowercase();
        let description = self.article.description.to_lowercase();
        title.matches(&phrase).count() + description.matches(&phrase).count()
    }

    pub fn mentions_money(&self) -> bool {
        self.article.mentions_money()
    }

    pub fn to_row(&self) -> ExportRow {
        ExportRow {
            title: self.article.title.clone(),
            date: display_string(&self.article.published_at, DateSeparator::Slash, false),
            description: self.article.description.clone(),
            image_file_name: self
                .article
                .image
                .file_name()
                .unwrap_or_else(|| NOT_FOUND.to_string()),
            phrase_count: self.phrase_count(),
            contains_money: self.mentions_money(),
        }
    }
}

/// One spreadsheet row per exported article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Image file name")]
    pub image_file_name: String,
    #[serde(rename = "Search phrase count")]
    pub phrase_count: usize,
    #[serde(rename = "Contains money")]
    pub contains_money: bool,
}

impl ExportRow {
    pub const HEADERS: [&'static str; 6] = [
        "Title",
        "Date",
        "Description",
        "Image file name",
        "Search phrase count",
        "Contains money",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn article(title: &str, description: &str, image: ImageSource) -> Article {
        Article::new(
            title,
            Local.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap(),
            description,
            image,
        )
    }

    #[test]
    fn test_phrase_count_is_case_insensitive() {
        let search = SearchArticle::new(
            article("Climate talks", "The CLIMATE summit on climate change", ImageSource::NotFound),
            "climate",
        );
        assert_eq!(search.phrase_count(), 3);
    }

    #[test]
    fn test_phrase_count_empty_phrase() {
        let search = SearchArticle::new(article("Anything", "at all", ImageSource::NotFound), "");
        assert_eq!(search.phrase_count(), 0);
    }

    #[test]
    fn test_money_detection() {
        let cases = [
            ("Budget hits $11.1", true),
            ("Deal worth $111,111.11", true),
            ("Paid 11 dollars", true),
            ("Costs 1,000 USD", true),
            ("Nothing to see", false),
            ("Five dollars", false),
        ];
        for (title, expected) in cases {
            let a = article(title, "", ImageSource::NotFound);
            assert_eq!(a.mentions_money(), expected, "{title}");
        }
    }

    #[test]
    fn test_money_in_description() {
        let a = article("Plain title", "raised $5 million", ImageSource::NotFound);
        assert!(a.mentions_money());
    }

    #[test]
    fn test_image_url_prefers_url_parameter() {
        let image = ImageSource::Url(
            "https://ca-times.brightspotcdn.com/dims4/default/abc/2147483647/strip/true/resize/840x560?url=https%3A%2F%2Fcalifornia-times.s3.amazonaws.com%2Fa%2Fb%2Fphoto.jpg".to_string(),
        );
        assert_eq!(
            image.image_url().as_deref(),
            Some("https://california-times.s3.amazonaws.com/a/b/photo.jpg")
        );
        assert_eq!(image.file_name().as_deref(), Some("photo.jpg"));
    }

    #[test]
    fn test_image_url_plain() {
        let image = ImageSource::Url("https://example.com/images/cat.png".to_string());
        assert_eq!(image.image_url().as_deref(), Some("https://example.com/images/cat.png"));
        assert_eq!(image.file_name().as_deref(), Some("cat.png"));
    }

    #[test]
    fn test_not_found_sentinel() {
        let image = ImageSource::NotFound;
        assert_eq!(image.image_url(), None);
        assert_eq!(image.file_name(), None);
        assert_eq!(image.to_string(), NOT_FOUND);
    }

    #[test]
    fn test_to_row() {
        let search = SearchArticle::new(
            article(
                "Rain returns",
                "Rain costs $2,000 in repairs",
                ImageSource::Url("https://example.com/rain.jpg".to_string()),
            ),
            "rain",
        );
        let row = search.to_row();
        assert_eq!(row.title, "Rain returns");
        assert_eq!(row.date, "01/05/2024");
        assert_eq!(row.image_file_name, "rain.jpg");
        assert_eq!(row.phrase_count, 2);
        assert!(row.contains_money);
    }

    #[test]
    fn test_row_serializes_with_headers() {
        let row = SearchArticle::new(article("T", "D", ImageSource::NotFound), "x").to_row();
        let json = serde_json::to_value(&row).unwrap();
        for header in ExportRow::HEADERS {
            assert!(json.get(header).is_some(), "{header}");
        }
        assert_eq!(json["Image file name"], NOT_FOUND);
    }
}
