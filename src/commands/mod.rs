//! CLI commands

pub mod clean;
pub mod generate;
pub mod init;
pub mod list;

use anyhow::{Context, Result};
use std::path::Path;

use crate::content::Entry;
use crate::error::SourceError;
use crate::source::{ContentSource, ContentfulClient, EntryQuery, LocalSource};
use crate::Blog;

/// Where a command reads entries from
pub enum Source {
    Remote(ContentfulClient),
    Offline(LocalSource),
}

impl Source {
    /// The saved dump at `offline`, or the Content Delivery API
    pub fn open(blog: &Blog, offline: Option<&Path>) -> Result<Self> {
        match offline {
            Some(path) => {
                let local = LocalSource::load(path, blog.config.contentful.include)
                    .with_context(|| format!("Failed to load entries from {:?}", path))?;
                tracing::info!("Using {} entries from {:?}", local.entries().len(), path);
                Ok(Source::Offline(local))
            }
            None => {
                let client = ContentfulClient::new(&blog.config.contentful)
                    .context("Cannot reach the content store")?;
                Ok(Source::Remote(client))
            }
        }
    }
}

impl ContentSource for Source {
    async fn get_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>, SourceError> {
        match self {
            Source::Remote(client) => client.get_entries(query).await,
            Source::Offline(local) => local.get_entries(query).await,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_online_source_needs_credentials() {
        let dir = TempDir::new().unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();
        blog.config.contentful.space.clear();
        blog.config.contentful.access_token.clear();
        assert!(Source::open(&blog, None).is_err());
    }

    #[tokio::test]
    async fn test_offline_source_filters_by_slug() {
        let dir = TempDir::new().unwrap();
        let dump = dir.path().join("entries.json");
        std::fs::write(&dump, fixtures::dump()).unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let source = Source::open(&blog, Some(&dump)).unwrap();
        let entries = source
            .get_entries(&EntryQuery::new("blogPost").field("slug", "newer"))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), "2");
    }
}
