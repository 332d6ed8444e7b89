//! Detail page builder - static path enumeration and single post lookup

use std::collections::HashMap;
use tracing::{debug, info};

use crate::content::{entry_slug, fields, PathDescriptor, Post, StaticPaths};
use crate::error::BuildError;
use crate::source::{ContentSource, EntryQuery};

/// Builds the data for individual post pages
pub struct DetailPageBuilder<S> {
    source: S,
    content_type: String,
}

impl<S: ContentSource> DetailPageBuilder<S> {
    pub fn new(source: S, content_type: impl Into<String>) -> Self {
        Self {
            source,
            content_type: content_type.into(),
        }
    }

    /// Every slug the build must generate a page for
    ///
    /// Two entries sharing a slug fail the build rather than letting the
    /// store's response order pick a winner.
    pub async fn paths(&self) -> Result<StaticPaths, BuildError> {
        let entries = self
            .source
            .get_entries(&EntryQuery::new(&self.content_type))
            .await?;

        let mut owners: HashMap<&str, Vec<String>> = HashMap::new();
        let mut paths = Vec::with_capacity(entries.len());
        for entry in &entries {
            let slug = entry_slug(entry)?;
            let ids = owners.entry(slug).or_default();
            if ids.is_empty() {
                paths.push(PathDescriptor::new(slug));
            }
            ids.push(entry.id().to_string());
        }

        if let Some(path) = paths.iter().find(|p| owners[p.slug()].len() > 1) {
            return Err(BuildError::DuplicateSlug {
                slug: path.slug().to_string(),
                ids: owners[path.slug()].clone(),
            });
        }

        info!("Enumerated {} post paths", paths.len());
        Ok(StaticPaths::new(paths))
    }

    /// The single post whose slug equals `slug`
    pub async fn fetch(&self, slug: &str) -> Result<Post, BuildError> {
        let query = EntryQuery::new(&self.content_type).field(fields::SLUG, slug);
        let entries = self.source.get_entries(&query).await?;

        match entries.as_slice() {
            [] => Err(BuildError::NotFound {
                slug: slug.to_string(),
            }),
            [entry] => {
                debug!("Fetched post {} ({})", slug, entry.id());
                Post::from_entry(entry)
            }
            many => Err(BuildError::DuplicateSlug {
                slug: slug.to_string(),
                ids: many.iter().map(|e| e.id().to_string()).collect(),
            }),
        }
    }
}
