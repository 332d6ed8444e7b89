//! List site content

use anyhow::Result;
use std::path::Path;

use super::Source;
use crate::content::date::format_date;
use crate::helpers::post_path;
use crate::pages::{DetailPageBuilder, ListPageBuilder};
use crate::Blog;

/// List site content by type
pub async fn run(blog: &Blog, kind: &str, offline: Option<&Path>) -> Result<()> {
    for line in lines(blog, kind, offline).await? {
        println!("{}", line);
    }
    Ok(())
}

async fn lines(blog: &Blog, kind: &str, offline: Option<&Path>) -> Result<Vec<String>> {
    let content_type = blog.config.contentful.content_type.as_str();

    let mut lines = Vec::new();
    match kind {
        "post" | "posts" => {
            let source = Source::open(blog, offline)?;
            let posts = ListPageBuilder::new(&source, content_type).build().await?;
            lines.push(format!("Posts ({}):", posts.len()));
            for post in posts {
                let date = post
                    .date
                    .as_deref()
                    .map(|d| format_date(d, "%Y-%m-%d"))
                    .unwrap_or_else(|| "----------".to_string());
                lines.push(format!("  {} - {} [{}]", date, post.title, post.slug));
            }
        }
        "path" | "paths" | "route" => {
            let source = Source::open(blog, offline)?;
            let paths = DetailPageBuilder::new(&source, content_type).paths().await?;
            lines.push(format!("Paths ({}):", paths.len()));
            for path in paths.iter() {
                lines.push(format!("  {}", post_path(&blog.config, path.slug())));
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, path", kind);
        }
    }

    Ok(lines)
}
