//! Entries as delivered by the content store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A content record: system metadata plus named fields
///
/// Link fields (assets, referenced entries) are already resolved to the
/// linked object by the source when the store included it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub sys: Sys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// The `sys` block of an entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sys {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Link>,
}

/// A `{ "sys": { "type": "Link", ... } }` reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub link_type: Option<String>,
}

impl Entry {
    /// Entry id
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    /// Id of the entry's content type, when the store reported it
    pub fn content_type(&self) -> Option<&str> {
        self.sys.content_type.as_ref().map(|l| l.sys.id.as_str())
    }

    /// Raw field value
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Non-empty string field, trimmed
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Look up a field value by a dotted path such as `fields.slug`
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.strip_prefix("fields.")?.split('.');
        let mut value = self.fields.get(parts.next()?)?;
        for part in parts {
            value = value.get(part)?;
        }
        Some(value)
    }

    /// Whether the value at `path` equals `expected` as a string
    pub fn matches(&self, path: &str, expected: &str) -> bool {
        if path == "sys.id" {
            return self.sys.id == expected;
        }
        match self.lookup(path) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Number(n)) => n.to_string() == expected,
            Some(Value::Bool(b)) => b.to_string() == expected,
            _ => false,
        }
    }
}

/// Whether a JSON value is an unresolved link object
pub fn is_link(value: &Value) -> bool {
    value
        .get("sys")
        .and_then(|sys| sys.get("type"))
        .and_then(Value::as_str)
        == Some("Link")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Entry {
        serde_json::from_value(json!({
            "sys": {
                "id": "post-1",
                "createdAt": "2022-01-02T03:04:05.000Z",
                "contentType": { "sys": { "id": "blogPost", "type": "Link", "linkType": "ContentType" } }
            },
            "fields": {
                "title": "  Hello  ",
                "slug": "hello",
                "views": 42,
                "empty": "",
                "meta": { "lang": "en" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_entry_accessors() {
        let entry = sample();
        assert_eq!(entry.id(), "post-1");
        assert_eq!(entry.content_type(), Some("blogPost"));
        assert_eq!(entry.text("title"), Some("Hello"));
        assert_eq!(entry.text("empty"), None);
        assert_eq!(entry.text("missing"), None);
        assert!(entry.sys.created_at.is_some());
    }

    #[test]
    fn test_entry_matches() {
        let entry = sample();
        assert!(entry.matches("fields.slug", "hello"));
        assert!(!entry.matches("fields.slug", "Hello"));
        assert!(entry.matches("fields.views", "42"));
        assert!(entry.matches("fields.meta.lang", "en"));
        assert!(entry.matches("sys.id", "post-1"));
        assert!(!entry.matches("fields.nope", "x"));
    }

    #[test]
    fn test_is_link() {
        assert!(is_link(&json!({ "sys": { "type": "Link", "linkType": "Asset", "id": "x" } })));
        assert!(!is_link(&json!({ "sys": { "type": "Asset", "id": "x" } })));
        assert!(!is_link(&json!("text")));
    }
}
