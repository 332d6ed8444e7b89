//! Content sources - where entries come from
//!
//! [`ContentSource`] is the seam between the page builders and the content
//! store. [`ContentfulClient`] talks to the Content Delivery API over HTTP;
//! [`LocalSource`] serves entries from a JSON dump of the same shape, for
//! offline builds and tests.

mod contentful;
mod links;
mod local;

use std::collections::BTreeMap;

use crate::content::Entry;
use crate::error::SourceError;

pub use contentful::ContentfulClient;
pub use links::{EntryCollection, Includes, LinkResolver};
pub use local::LocalSource;

/// A query for entries of one content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    pub content_type: String,
    /// Field path (`fields.slug`, `sys.id`) to exact value
    pub filters: BTreeMap<String, String>,
}

impl EntryQuery {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            filters: BTreeMap::new(),
        }
    }

    /// Require `fields.<name>` to equal `value`
    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.filters.insert(format!("fields.{}", name), value.into());
        self
    }

    /// Require an arbitrary path such as `sys.id` to equal `value`
    pub fn filter(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(path.into(), value.into());
        self
    }

    /// Whether an entry satisfies every filter
    pub fn matches(&self, entry: &Entry) -> bool {
        self.filters
            .iter()
            .all(|(path, value)| entry.matches(path, value))
    }
}

/// A remote or local store of entries
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// All entries matching the query, in the order the store returns them
    async fn get_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>, SourceError>;
}

impl<T: ContentSource> ContentSource for &T {
    async fn get_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>, SourceError> {
        (**self).get_entries(query).await
    }
}
