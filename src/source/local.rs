//! Entries served from a local JSON dump

use std::fs;
use std::path::Path;

use super::links::{EntryCollection, LinkResolver};
use super::{ContentSource, EntryQuery};
use crate::content::Entry;
use crate::error::SourceError;

/// An in-memory content store
///
/// Filtering mirrors the remote store: entries must belong to the queried
/// content type (when the entry records one) and match every filter exactly.
#[derive(Debug, Clone, Default)]
pub struct LocalSource {
    entries: Vec<Entry>,
}

impl LocalSource {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Load a saved entries response (`items` + `includes`)
    pub fn load<P: AsRef<Path>>(path: P, include_depth: usize) -> Result<Self, SourceError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content, include_depth)
    }

    /// Parse a saved entries response
    pub fn from_json(json: &str, include_depth: usize) -> Result<Self, SourceError> {
        let collection: EntryCollection = serde_json::from_str(json)?;
        let resolver = LinkResolver::new(&collection, include_depth);
        let entries = collection
            .items
            .iter()
            .cloned()
            .map(|item| resolver.resolve_entry(item))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Loaded {} local entries", entries.len());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

impl ContentSource for LocalSource {
    async fn get_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>, SourceError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.content_type().map_or(true, |ct| ct == query.content_type))
            .filter(|e| query.matches(e))
            .cloned()
            .collect())
    }
}
