//! Content module - entries, post projections and body rendering

pub mod date;
mod entry;
mod markdown;
mod post;
pub mod rich_text;

use anyhow::Result;

pub use entry::{is_link, Entry, Link, LinkSys, Sys};
pub use markdown::MarkdownRenderer;
pub use post::{
    entry_slug, fields, sort_newest_first, Body, ImageRef, PathDescriptor, PathParams, Post,
    PostSummary, StaticPaths,
};

/// Turns a post body into HTML, whichever form the body takes
#[derive(Default)]
pub struct BodyRenderer {
    markdown: MarkdownRenderer,
}

impl BodyRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, body: &Body) -> Result<String> {
        match body {
            Body::Markdown(text) => self.markdown.render(text),
            Body::RichText(document) => Ok(rich_text::render(document)),
        }
    }
}

/// Simple HTML escaping
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
