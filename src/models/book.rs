//! Book model, write payload and list filtering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

/// Book record as held by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// 16-character identifier assigned on creation
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Total number of pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<i64>,
    /// Pages read so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_page: Option<i64>,
    /// `readPage == pageCount` at creation time
    pub finished: bool,
    /// "Currently reading" flag supplied by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<bool>,
    #[serde(with = "iso_millis")]
    pub inserted_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

/// List projection of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Create / update request body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub name: Option<String>,
    pub year: Option<i64>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<i64>,
    pub read_page: Option<i64>,
    pub reading: Option<bool>,
}

/// Reasons a create / update payload is rejected.
///
/// The display text is the user-facing reason; callers prefix it with the
/// operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Mohon isi nama buku")]
    MissingName,

    #[error("readPage tidak boleh lebih besar dari pageCount")]
    ReadPageExceedsPageCount,
}

/// Mutable book fields that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct BookFields {
    pub name: String,
    pub year: Option<i64>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<i64>,
    pub read_page: Option<i64>,
    pub reading: Option<bool>,
}

impl BookFields {
    /// Whether every page has been read
    pub fn is_finished(&self) -> bool {
        self.page_count == self.read_page
    }
}

impl BookPayload {
    /// Validate the payload: name first, then the page counters.
    pub fn validate(self) -> Result<BookFields, PayloadError> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(PayloadError::MissingName),
        };

        // A comparison against a missing counter never fails the check.
        if let (Some(read_page), Some(page_count)) = (self.read_page, self.page_count) {
            if read_page > page_count {
                return Err(PayloadError::ReadPageExceedsPageCount);
            }
        }

        Ok(BookFields {
            name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
        })
    }
}

/// List query parameters. Only one criterion is applied, by priority
/// `name`, then `reading`, then `finished`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the book name
    pub name: Option<String>,
    /// `1`/`true` for books being read, `0`/`false` otherwise
    pub reading: Option<String>,
    /// `1`/`true` for finished books, `0`/`false` otherwise
    pub finished: Option<String>,
}

impl BookQuery {
    /// Build a query from raw key/value pairs. The first occurrence of a
    /// repeated key wins; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "name" => &mut query.name,
                "reading" => &mut query.reading,
                "finished" => &mut query.finished,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    pub fn filter(&self) -> BookFilter {
        if let Some(name) = supplied(&self.name) {
            BookFilter::Name(name.to_lowercase())
        } else if let Some(reading) = supplied(&self.reading) {
            BookFilter::Reading(parse_flag(reading))
        } else if let Some(finished) = supplied(&self.finished) {
            BookFilter::Finished(parse_flag(finished))
        } else {
            BookFilter::All
        }
    }
}

/// Empty query values count as not supplied
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Single criterion applied when listing books.
///
/// Flag filters hold `None` when the query value could not be read as 0/1;
/// such a filter matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    All,
    /// Lowercased needle
    Name(String),
    Reading(Option<bool>),
    Finished(Option<bool>),
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::All => true,
            BookFilter::Name(needle) => book.name.to_lowercase().contains(needle.as_str()),
            BookFilter::Reading(flag) => flag.is_some() && book.reading == *flag,
            BookFilter::Finished(flag) => flag.is_some() && Some(book.finished) == *flag,
        }
    }
}

/// Read a query value as a 0/1 flag.
///
/// A value made only of whitespace reads as 0.
pub fn parse_flag(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(false);
    }
    if raw.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Some(false);
    }

    match raw.parse::<f64>() {
        Ok(value) if value == 0.0 => Some(false),
        Ok(value) if value == 1.0 => Some(true),
        _ => None,
    }
}

/// ISO 8601 timestamps with millisecond precision and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
