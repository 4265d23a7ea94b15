//! Page metadata: a typed view of front matter.
//!
//! Front matter is free-form YAML, but a handful of keys drive the build and
//! are validated eagerly when a page is loaded:
//!
//! | Key | Type | Default | Used for |
//! |-----|------|---------|----------|
//! | `date` | date or date-time | none | post ordering, canonical URLs |
//! | `publish` | boolean | `true` | unpublished pages are never built or indexed |
//! | `category` | string | none | category index, canonical URLs |
//! | `tags` | list of strings | empty | tag index |
//! | `extends` | string | `base.html` | base template for markdown pages |
//! | `url` | string | derived from the path | URL (and output location) override |
//!
//! Every other key is kept as-is in [`Metadata::extra`] and reaches templates
//! unchanged, e.g. `{{ page.metadata.title }}`.
//!
//! ## Dates
//!
//! Dates are coerced to a [`NaiveDateTime`]. Accepted spellings, tried in order:
//!
//! ```text
//! 2020-04-04 12:00:00          date-time, optional fractional seconds
//! 2020-04-04T12:00:00          ISO date-time, optional fractional seconds
//! 2020-04-04T12:00:00+02:00    RFC 3339 (offset dropped, local wall time kept)
//! 2020-04-04 12:00:00 +02:00   YAML timestamp with a spaced offset, same rule
//! 2020-04-04               date only → midnight
//! ```
//!
//! Templates see the date in ISO form (`2020-04-04T12:00:00`), which Tera's
//! `date` filter formats directly:
//! `{{ page.metadata.date | date(format="%B %Y") }}`.
//!
//! Anything else is a fatal error for the page: a post with a broken date
//! cannot be ordered or linked.
//!
//! ## Derived keys
//!
//! - `human_readable_date`: `4 Apr 2020`, set whenever `date` is present.
//! - `previous` / `next`: neighbouring posts, filled in by
//!   [`aggregate`](crate::aggregate).
//!
//! Derived keys are owned by the generator; values supplied in front matter
//! under those names are discarded.

use crate::frontmatter::value_kind;
use crate::page::PageSummary;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use serde_yaml_ng::{Mapping, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Base template markdown pages extend when `extends` is absent.
pub const DEFAULT_BASE_TEMPLATE: &str = "base.html";

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const OFFSET_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];
const ISO_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";
const HUMAN_DATE_FORMAT: &str = "%-d %b %Y";

const DERIVED_KEYS: &[&str] = &["human_readable_date", "previous", "next"];

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("{path}: cannot parse date {value:?} (expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")]
    MalformedDate { path: PathBuf, value: String },
    #[error("{path}: unexpected type for date: {kind}")]
    DateType { path: PathBuf, kind: &'static str },
    #[error("{path}: template name {name:?} in 'extends' must not contain quotes")]
    TemplateName { path: PathBuf, name: String },
    #[error("{path}: field '{field}' must be {expected}, found {kind}")]
    FieldType {
        path: PathBuf,
        field: &'static str,
        expected: &'static str,
        kind: &'static str,
    },
}

/// Why a `date` value could not be coerced.
#[derive(Debug, PartialEq, Eq)]
pub enum DateError {
    Malformed(String),
    UnexpectedType(&'static str),
}

/// Validated metadata for a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_date"
    )]
    pub date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_readable_date: Option<String>,
    pub publish: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Box<PageSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<PageSummary>>,
    /// Keys without special meaning, passed through to templates.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            date: None,
            human_readable_date: None,
            publish: true,
            category: None,
            tags: Vec::new(),
            extends: None,
            url: None,
            previous: None,
            next: None,
            extra: Mapping::new(),
        }
    }
}

impl Metadata {
    /// Validate raw front matter into typed metadata.
    ///
    /// `path` only labels errors.
    pub fn from_mapping(path: &Path, mut raw: Mapping) -> Result<Self, MetadataError> {
        let mut metadata = Metadata::default();

        if let Some(value) = raw.remove("date") {
            let date = coerce_date(&value).map_err(|e| match e {
                DateError::Malformed(value) => MetadataError::MalformedDate {
                    path: path.to_path_buf(),
                    value,
                },
                DateError::UnexpectedType(kind) => MetadataError::DateType {
                    path: path.to_path_buf(),
                    kind,
                },
            })?;
            metadata.date = Some(date);
            metadata.human_readable_date = Some(human_readable_date(&date));
        }

        if let Some(value) = raw.remove("publish") {
            metadata.publish = value
                .as_bool()
                .ok_or_else(|| field_type(path, "publish", "a boolean", &value))?;
        }

        if let Some(value) = raw.remove("category") {
            metadata.category = Some(
                scalar_string(&value)
                    .ok_or_else(|| field_type(path, "category", "a string", &value))?,
            );
        }

        if let Some(value) = raw.remove("tags") {
            metadata.tags = match &value {
                Value::Null => Vec::new(),
                Value::Sequence(items) => items
                    .iter()
                    .map(scalar_string)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| field_type(path, "tags", "a list of strings", &value))?,
                _ => return Err(field_type(path, "tags", "a list of strings", &value)),
            };
        }

        if let Some(value) = raw.remove("extends") {
            let name = value
                .as_str()
                .ok_or_else(|| field_type(path, "extends", "a string", &value))?;
            // Spliced into `{% extends "..." %}` when the page is wrapped.
            if name.contains(['"', '\\']) {
                return Err(MetadataError::TemplateName {
                    path: path.to_path_buf(),
                    name: name.to_string(),
                });
            }
            metadata.extends = Some(name.to_string());
        }

        if let Some(value) = raw.remove("url") {
            metadata.url = Some(
                value
                    .as_str()
                    .map(String::from)
                    .ok_or_else(|| field_type(path, "url", "a string", &value))?,
            );
        }

        for key in DERIVED_KEYS {
            raw.remove(*key);
        }
        metadata.extra = raw;
        Ok(metadata)
    }

    /// Name of the base template this page's body is wrapped into.
    pub fn base_template(&self) -> &str {
        self.extends.as_deref().unwrap_or(DEFAULT_BASE_TEMPLATE)
    }

    /// Free-form `title` key, if it is a string.
    pub fn title(&self) -> Option<&str> {
        self.extra.get("title").and_then(Value::as_str)
    }
}

fn field_type(path: &Path, field: &'static str, expected: &'static str, value: &Value) -> MetadataError {
    MetadataError::FieldType {
        path: path.to_path_buf(),
        field,
        expected,
        kind: value_kind(value),
    }
}

/// Strings, numbers and booleans as text; `category: 2020` is a valid category.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Coerce a front matter `date` value into a date-time.
///
/// Output of [`format_date`] coerces back to the same value, so normalizing
/// an already-normalized date is a no-op.
pub fn coerce_date(value: &Value) -> Result<NaiveDateTime, DateError> {
    let Value::String(text) = value else {
        return Err(DateError::UnexpectedType(value_kind(value)));
    };

    let text = text.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            OFFSET_DATE_TIME_FORMATS
                .iter()
                .find_map(|format| DateTime::parse_from_str(text, format).ok())
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| DateError::Malformed(text.to_string()))
}

/// Canonical text form of a date, as templates see `page.metadata.date`.
///
/// ISO with a `T` separator so Tera's `date` filter reads it as a date-time.
pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(ISO_DATE_TIME_FORMAT).to_string()
}

/// `2020-04-04` → `4 Apr 2020`.
pub fn human_readable_date(date: &NaiveDateTime) -> String {
    date.format(HUMAN_DATE_FORMAT).to_string()
}

fn serialize_date<S: Serializer>(date: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.serialize_str(&format_date(date)),
        None => serializer.serialize_none(),
    }
}
