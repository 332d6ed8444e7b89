//! Built-in blog templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is off because post
//! bodies arrive as rendered HTML; every other value goes through the `html`
//! filter.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::date::{date_xml, format_date};
use crate::content::{html_escape, ImageRef, Post, PostSummary};
use crate::helpers::{full_url, post_path, url_for};

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("index.html", include_str!("blog/index.html")),
            ("post.html", include_str!("blog/post.html")),
            ("404.html", include_str!("blog/404.html")),
        ])?;

        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("html", html_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Home page with the post list
    pub fn render_index(&self, site: &SiteData, posts: &[PostLink]) -> Result<String> {
        let mut context = base_context(site);
        context.insert("is_home", &true);
        context.insert("canonical", &site.url);
        context.insert("posts", posts);
        self.render("index.html", &context)
    }

    /// A single post page; `content` is the already rendered body
    pub fn render_post(&self, site: &SiteData, post: &PostPage, content: &str) -> Result<String> {
        let mut context = base_context(site);
        context.insert("is_home", &false);
        context.insert("canonical", &post.url);
        context.insert("post", post);
        context.insert("content", content);
        self.render("post.html", &context)
    }

    /// Page served for every path outside the generated set
    pub fn render_not_found(&self, site: &SiteData) -> Result<String> {
        let mut context = base_context(site);
        context.insert("is_home", &false);
        self.render("404.html", &context)
    }
}

fn base_context(site: &SiteData) -> Context {
    let mut context = Context::new();
    context.insert("site", site);
    context.insert("date_format", &site.date_format);
    context
}

/// Tera filter: format a raw entry date
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%B %-d, %Y".to_string(),
    };
    Ok(tera::Value::String(format_date(&s, &format)))
}

/// Tera filter: escape text for HTML content and attributes
fn html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("html", "value", String, value);
    Ok(tera::Value::String(html_escape(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub author: String,
    pub description: String,
    pub intro: String,
    pub avatar: String,
    pub root: String,
    /// Absolute home page URL
    pub url: String,
    pub language: String,
    pub date_format: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            author: config.author.clone(),
            description: config.description.clone(),
            intro: config.intro.clone(),
            avatar: url_for(config, &config.avatar),
            root: url_for(config, "/"),
            url: full_url(config, &url_for(config, "/")),
            language: config.language.clone(),
            date_format: config.date_format.clone(),
        }
    }
}

/// A list item on the home page
#[derive(Debug, Clone, Serialize)]
pub struct PostLink {
    pub title: String,
    pub path: String,
    pub date: Option<String>,
    /// Machine-readable date, absent when `date` does not parse
    pub datetime: Option<String>,
}

impl PostLink {
    pub fn new(config: &SiteConfig, post: &PostSummary) -> Self {
        Self {
            title: post.title.clone(),
            path: post_path(config, &post.slug),
            date: post.date.clone(),
            datetime: post.date.as_deref().and_then(date_xml),
        }
    }
}

/// Title, date and image of a post page
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub title: String,
    /// Absolute URL of the page
    pub url: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
    pub image: Option<ImageRef>,
}

impl PostPage {
    pub fn new(config: &SiteConfig, post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            url: full_url(config, &post_path(config, &post.slug)),
            date: post.date.clone(),
            datetime: post.date.as_deref().and_then(date_xml),
            image: post.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData::from_config(&SiteConfig::default())
    }

    #[test]
    fn test_index_lists_posts() {
        let renderer = TemplateRenderer::new().unwrap();
        let posts = vec![
            PostLink {
                title: "Second <post>".to_string(),
                path: "/posts/b/".to_string(),
                date: Some("2022/06/01".to_string()),
                datetime: date_xml("2022/06/01"),
            },
            PostLink {
                title: "First".to_string(),
                path: "/posts/a/".to_string(),
                date: None,
                datetime: None,
            },
        ];
        let html = renderer.render_index(&site(), &posts).unwrap();

        assert_eq!(html.matches("<li class=\"post-item\">").count(), 2);
        assert!(html.contains("Second &lt;post&gt;"));
        assert!(html.contains("June 1, 2022"));
        assert!(html.contains(r#"<time datetime="2022-06-01T00:00:00Z">"#));
        assert!(!html.contains("2022/06/01"));
        assert!(html.find("/posts/b/").unwrap() < html.find("/posts/a/").unwrap());
        assert!(html.contains("height=\"144\""));
        assert!(!html.contains("Back to home"));
        assert!(html.contains(r#"<link rel="canonical" href="http://example.com/">"#));
    }

    #[test]
    fn test_empty_index_has_no_items() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_index(&site(), &[]).unwrap();
        assert!(!html.contains("post-item"));
        assert!(!html.contains("<ul"));
        assert!(html.contains("<h2>Blog</h2>"));
    }

    #[test]
    fn test_post_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let post = PostPage {
            title: "Hello".to_string(),
            url: "http://example.com/posts/hello/".to_string(),
            date: Some("2022-01-01".to_string()),
            datetime: date_xml("2022-01-01"),
            image: Some(ImageRef {
                url: "https://images.example.net/a.png".to_string(),
                width: Some(800),
                height: Some(600),
                title: None,
            }),
        };
        let html = renderer
            .render_post(&site(), &post, "<p>Body</p>")
            .unwrap();

        assert!(html.contains("<title>Hello</title>"));
        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains("January 1, 2022"));
        assert!(html.contains(r#"datetime="2022-01-01T00:00:00Z""#));
        assert!(html.contains(r#"<link rel="canonical" href="http://example.com/posts/hello/">"#));
        assert!(html.contains(r#"src="https://images.example.net/a.png" width="800" height="600" alt="Hello""#));
        assert!(html.contains("Back to home"));
        assert!(html.contains("height=\"108\""));
    }

    #[test]
    fn test_unparsable_date_has_no_datetime() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();
        let summary = PostSummary {
            id: "1".to_string(),
            title: "Someday".to_string(),
            slug: "someday".to_string(),
            date: Some("sometime in 2022".to_string()),
            published: None,
        };
        let html = renderer
            .render_index(&site(), &[PostLink::new(&config, &summary)])
            .unwrap();
        assert!(html.contains("<time>sometime in 2022</time>"));
        assert!(!html.contains("datetime="));
    }

    #[test]
    fn test_not_found_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_not_found(&site()).unwrap();
        assert!(html.contains("404"));
        assert!(!html.contains("canonical"));
        assert!(html.contains("Back to home"));
    }

    #[test]
    fn test_date_format_filter_passes_through_garbage() {
        let mut args = HashMap::new();
        args.insert("format".to_string(), tera::Value::String("%Y".to_string()));
        let out = date_format_filter(&tera::Value::String("2022-03-04".to_string()), &args).unwrap();
        assert_eq!(out, tera::Value::String("2022".to_string()));
        let out = date_format_filter(&tera::Value::String("someday".to_string()), &args).unwrap();
        assert_eq!(out, tera::Value::String("someday".to_string()));
    }
}
