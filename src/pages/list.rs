//! List page builder - all posts, newest first

use tracing::info;

use crate::content::{sort_newest_first, PostSummary};
use crate::error::BuildError;
use crate::source::{ContentSource, EntryQuery};

/// Builds the ordered post list for the home page
pub struct ListPageBuilder<S> {
    source: S,
    content_type: String,
}

impl<S: ContentSource> ListPageBuilder<S> {
    pub fn new(source: S, content_type: impl Into<String>) -> Self {
        Self {
            source,
            content_type: content_type.into(),
        }
    }

    /// Fetch every post and order it by date, newest first
    pub async fn build(&self) -> Result<Vec<PostSummary>, BuildError> {
        let entries = self
            .source
            .get_entries(&EntryQuery::new(&self.content_type))
            .await?;

        let mut posts = entries
            .iter()
            .map(PostSummary::from_entry)
            .collect::<Result<Vec<_>, _>>()?;
        sort_newest_first(&mut posts);

        info!("Listed {} posts", posts.len());
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::fixtures::{post, source};

    #[tokio::test]
    async fn test_newest_first() {
        let source = source(vec![
            post("1", "a", Some("2022-01-01")),
            post("2", "b", Some("2022-06-01")),
        ]);
        let posts = ListPageBuilder::new(&source, "blogPost").build().await.unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["b", "a"]);
    }

    #[tokio::test]
    async fn test_sorted_descending_for_distinct_dates() {
        let dates = [
            "2020-05-17", "2023-01-09", "2019-12-31", "2021-07-04T08:30:00Z", "2022-02-28",
            "2021-07-04T08:29:59Z", "2018-01-01",
        ];
        let entries = dates
            .iter()
            .enumerate()
            .map(|(i, d)| post(&i.to_string(), &format!("p{}", i), Some(d)))
            .collect();
        let source = source(entries);

        let posts = ListPageBuilder::new(&source, "blogPost").build().await.unwrap();
        assert_eq!(posts.len(), dates.len());
        for pair in posts.windows(2) {
            assert!(pair[0].published >= pair[1].published);
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let source = source(Vec::new());
        let posts = ListPageBuilder::new(&source, "blogPost").build().await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_undated_posts_sort_last() {
        let source = source(vec![
            post("1", "undated", None),
            post("2", "dated", Some("2001-01-01")),
            post("3", "garbled", Some("yesterday-ish")),
        ]);
        let posts = ListPageBuilder::new(&source, "blogPost").build().await.unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["dated", "undated", "garbled"]);
    }

    #[tokio::test]
    async fn test_entry_without_slug_fails() {
        let mut broken = post("9", "x", None);
        broken.fields.remove("slug");
        let source = source(vec![post("1", "a", None), broken]);
        let err = ListPageBuilder::new(&source, "blogPost")
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingField { field: "slug", .. }));
    }
}
