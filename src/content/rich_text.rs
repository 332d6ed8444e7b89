//! Rendering of structured rich text documents to HTML

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::html_escape;

/// A rich text node; the root has `nodeType == "document"`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_type: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub marks: Vec<Mark>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Root rich text document
pub type Document = Node;

impl Node {
    /// Whether a JSON value looks like a rich text document
    pub fn is_document(value: &Value) -> bool {
        value.get("nodeType").and_then(Value::as_str) == Some("document")
    }
}

/// Render a rich text document to HTML
pub fn render(document: &Document) -> String {
    let mut out = String::new();
    render_children(document, &mut out);
    out
}

fn render_children(node: &Node, out: &mut String) {
    for child in &node.content {
        render_node(child, out);
    }
}

fn wrap(tag: &str, node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    render_children(node, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn render_node(node: &Node, out: &mut String) {
    match node.node_type.as_str() {
        "text" => render_text(node, out),
        "paragraph" => wrap("p", node, out),
        "heading-1" => wrap("h1", node, out),
        "heading-2" => wrap("h2", node, out),
        "heading-3" => wrap("h3", node, out),
        "heading-4" => wrap("h4", node, out),
        "heading-5" => wrap("h5", node, out),
        "heading-6" => wrap("h6", node, out),
        "unordered-list" => wrap("ul", node, out),
        "ordered-list" => wrap("ol", node, out),
        "list-item" => wrap("li", node, out),
        "blockquote" => wrap("blockquote", node, out),
        "hr" => out.push_str("<hr/>"),
        "table" => wrap("table", node, out),
        "table-row" => wrap("tr", node, out),
        "table-cell" => wrap("td", node, out),
        "table-header-cell" => wrap("th", node, out),
        "hyperlink" => {
            let uri = node.data.get("uri").and_then(Value::as_str).unwrap_or("#");
            out.push_str(&format!(r#"<a href="{}">"#, html_escape(uri)));
            render_children(node, out);
            out.push_str("</a>");
        }
        "asset-hyperlink" => {
            match asset_url(&node.data) {
                Some(url) => {
                    out.push_str(&format!(r#"<a href="{}">"#, html_escape(&url)));
                    render_children(node, out);
                    out.push_str("</a>");
                }
                None => render_children(node, out),
            }
        }
        "embedded-asset-block" => render_embedded_asset(&node.data, out),
        // Linked entries have no markup of their own; keep their inline text
        "entry-hyperlink" | "embedded-entry-inline" | "embedded-entry-block" => {
            render_children(node, out)
        }
        other => {
            tracing::debug!("Unknown rich text node type: {}", other);
            render_children(node, out);
        }
    }
}

fn render_text(node: &Node, out: &mut String) {
    let mut html = html_escape(node.value.as_deref().unwrap_or_default()).replace('\n', "<br/>");
    for mark in &node.marks {
        let tag = match mark.kind.as_str() {
            "bold" => "strong",
            "italic" => "em",
            "underline" => "u",
            "code" => "code",
            "superscript" => "sup",
            "subscript" => "sub",
            "strikethrough" => "s",
            _ => continue,
        };
        html = format!("<{tag}>{html}</{tag}>");
    }
    out.push_str(&html);
}

/// Resolved asset's file URL, with a scheme added to protocol-relative URLs
fn asset_url(data: &Value) -> Option<String> {
    let url = data
        .get("target")?
        .get("fields")?
        .get("file")?
        .get("url")?
        .as_str()?;
    Some(absolute_url(url))
}

fn render_embedded_asset(data: &Value, out: &mut String) {
    let Some(url) = asset_url(data) else {
        tracing::warn!("Embedded asset is not resolved, skipping");
        return;
    };
    let fields = &data["target"]["fields"];
    let alt = fields
        .get("description")
        .or_else(|| fields.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("");
    let is_image = fields["file"]["contentType"]
        .as_str()
        .map(|ct| ct.starts_with("image/"))
        .unwrap_or(true);

    if is_image {
        let image = &fields["file"]["details"]["image"];
        let mut tag = format!(
            r#"<img src="{}" alt="{}""#,
            html_escape(&url),
            html_escape(alt)
        );
        if let (Some(w), Some(h)) = (image["width"].as_u64(), image["height"].as_u64()) {
            tag.push_str(&format!(r#" width="{}" height="{}""#, w, h));
        }
        tag.push_str("/>");
        out.push_str(&tag);
    } else {
        let label = if alt.is_empty() { url.as_str() } else { alt };
        out.push_str(&format!(
            r#"<a href="{}">{}</a>"#,
            html_escape(&url),
            html_escape(label)
        ));
    }
}

/// Give protocol-relative asset URLs an `https:` scheme
pub fn absolute_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}
