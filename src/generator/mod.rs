//! Generator module - renders the blog into static HTML files

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::content::BodyRenderer;
use crate::helpers::post_output_path;
use crate::pages::{DetailPageBuilder, ListPageBuilder};
use crate::source::ContentSource;
use crate::templates::{PostLink, PostPage, SiteData, TemplateRenderer};
use crate::Blog;

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    body: BodyRenderer,
}

/// A rendered page waiting to be written
struct Page {
    path: PathBuf,
    html: String,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: TemplateRenderer::new()?,
            body: BodyRenderer::new(),
        })
    }

    /// Generate the entire site, returning the number of post pages
    ///
    /// Every page is rendered before the first file is written, so a failed
    /// fetch leaves the previous output untouched.
    pub async fn generate<S: ContentSource>(&self, source: S) -> Result<usize> {
        let config = &self.blog.config;
        let content_type = config.contentful.content_type.as_str();
        let site = SiteData::from_config(config);

        let mut pages = Vec::new();

        let summaries = ListPageBuilder::new(&source, content_type).build().await?;
        let links: Vec<PostLink> = summaries
            .iter()
            .map(|post| PostLink::new(config, post))
            .collect();
        pages.push(Page {
            path: PathBuf::from("index.html"),
            html: self.renderer.render_index(&site, &links)?,
        });

        let detail = DetailPageBuilder::new(&source, content_type);
        let paths = detail.paths().await?;
        for path in paths.iter() {
            let post = detail.fetch(path.slug()).await?;
            let content = self
                .body
                .render(&post.body)
                .with_context(|| format!("Failed to render body of {}", post.slug))?;
            pages.push(Page {
                path: PathBuf::from(post_output_path(config, &post.slug)),
                html: self
                    .renderer
                    .render_post(&site, &PostPage::new(config, &post), &content)?,
            });
        }

        pages.push(Page {
            path: PathBuf::from("404.html"),
            html: self.renderer.render_not_found(&site)?,
        });

        fs::create_dir_all(&self.blog.public_dir)?;
        self.copy_static_assets()?;
        for page in &pages {
            self.write(page)?;
        }

        Ok(paths.len())
    }

    fn write(&self, page: &Page) -> Result<()> {
        let output_path = self.blog.public_dir.join(&page.path);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, &page.html)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy the static directory (images, stylesheets) into the output
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || is_hidden(path, static_dir) {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(())
    }
}

/// Dotfiles anywhere below the static root are skipped
fn is_hidden(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .map(|rel| {
            rel.components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        })
        .unwrap_or(false)
}
