//! Blog post projections of entries

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::date::parse_date;
use super::entry::{is_link, Entry};
use super::rich_text::{absolute_url, Document};
use crate::error::BuildError;

/// Field names on the blog post content type
pub mod fields {
    pub const TITLE: &str = "title";
    pub const SLUG: &str = "slug";
    pub const DATE: &str = "date";
    pub const BODY: &str = "body";
    pub const FEATURED_IMAGE: &str = "featuredImage";
}

/// A post as shown in the list page
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// Raw date string from the entry
    pub date: Option<String>,
    /// Parsed date; `None` sorts as the earliest possible date
    #[serde(skip)]
    pub published: Option<DateTime<Utc>>,
}

impl PostSummary {
    /// Project an entry, requiring a title and a valid slug
    pub fn from_entry(entry: &Entry) -> Result<Self, BuildError> {
        let title = required(entry, fields::TITLE)?;
        let slug = entry_slug(entry)?;
        let date = entry.text(fields::DATE).map(str::to_string);
        let published = date.as_deref().and_then(parse_date);
        if date.is_some() && published.is_none() {
            tracing::warn!("Entry {} has an unparsable date {:?}", entry.id(), date);
        }

        Ok(Self {
            id: entry.id().to_string(),
            title: title.to_string(),
            slug: slug.to_string(),
            date,
            published,
        })
    }
}

/// Sort summaries newest first
///
/// The sort is stable: undated entries keep their fetch order after all
/// dated ones, and equal dates keep their relative order.
pub fn sort_newest_first(posts: &mut [PostSummary]) {
    posts.sort_by(|a, b| b.published.cmp(&a.published));
}

/// Post body, either markdown text or a rich text document
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Body {
    Markdown(String),
    RichText(Document),
}

impl Body {
    /// Interpret a raw body field
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Body::Markdown(s.clone())),
            v if Document::is_document(v) => serde_json::from_value(v.clone())
                .ok()
                .map(Body::RichText),
            _ => None,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Markdown(String::new())
    }
}

/// A resolved image asset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRef {
    pub url: String,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub title: Option<String>,
}

impl ImageRef {
    /// Read an asset object (`fields.file.url`, `fields.file.details.image`)
    pub fn from_asset(asset: &Value) -> Option<Self> {
        if is_link(asset) {
            return None;
        }
        let fields = asset.get("fields")?;
        let file = fields.get("file")?;
        let url = file.get("url")?.as_str()?;
        let image = file.get("details").and_then(|d| d.get("image"));

        Some(Self {
            url: absolute_url(url),
            width: image.and_then(|i| i.get("width")).and_then(Value::as_u64),
            height: image.and_then(|i| i.get("height")).and_then(Value::as_u64),
            title: fields
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// A single post with body and image resolved
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub date: Option<String>,
    pub body: Body,
    pub image: Option<ImageRef>,
}

impl Post {
    /// Project an entry into a renderable post
    pub fn from_entry(entry: &Entry) -> Result<Self, BuildError> {
        let title = required(entry, fields::TITLE)?;
        let slug = entry_slug(entry)?;

        let body = match entry.field(fields::BODY) {
            Some(value) => Body::from_value(value).ok_or(BuildError::MissingField {
                entry: entry.id().to_string(),
                field: fields::BODY,
            })?,
            None => {
                tracing::warn!("Entry {} has no body, rendering it empty", entry.id());
                Body::default()
            }
        };

        let image = entry
            .field(fields::FEATURED_IMAGE)
            .and_then(|asset| {
                let image = ImageRef::from_asset(asset);
                if image.is_none() {
                    tracing::warn!("Featured image of entry {} is not resolved", entry.id());
                }
                image
            });

        Ok(Self {
            id: entry.id().to_string(),
            title: title.to_string(),
            slug: slug.to_string(),
            date: entry.text(fields::DATE).map(str::to_string),
            body,
            image,
        })
    }
}

/// Route parameters of a post page
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PathParams {
    pub slug: String,
}

/// One static page the build must generate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PathDescriptor {
    pub params: PathParams,
}

impl PathDescriptor {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            params: PathParams { slug: slug.into() },
        }
    }

    pub fn slug(&self) -> &str {
        &self.params.slug
    }
}

/// The complete set of post paths; anything else is "not found"
#[derive(Debug, Clone, Serialize)]
pub struct StaticPaths {
    pub paths: Vec<PathDescriptor>,
    /// Always false: no page is generated on demand
    pub fallback: bool,
}

impl StaticPaths {
    pub fn new(paths: Vec<PathDescriptor>) -> Self {
        Self {
            paths,
            fallback: false,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathDescriptor> {
        self.paths.iter()
    }
}

fn required<'a>(entry: &'a Entry, field: &'static str) -> Result<&'a str, BuildError> {
    entry.text(field).ok_or_else(|| BuildError::MissingField {
        entry: entry.id().to_string(),
        field,
    })
}

/// The entry's slug, checked to be a single safe path segment
///
/// The value is used exactly as stored, since slug queries match it
/// byte for byte.
pub fn entry_slug(entry: &Entry) -> Result<&str, BuildError> {
    let slug = entry
        .field(fields::SLUG)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| BuildError::MissingField {
            entry: entry.id().to_string(),
            field: fields::SLUG,
        })?;
    if is_valid_slug(slug) {
        Ok(slug)
    } else {
        Err(BuildError::InvalidSlug {
            entry: entry.id().to_string(),
            slug: slug.to_string(),
        })
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.trim() == slug
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\', '?', '#'])
        && !slug.chars().any(char::is_control)
}
