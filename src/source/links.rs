//! Delivery API collection responses and link resolution

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::content::{is_link, Entry};

/// One page of an entries response
#[derive(Debug, Default, Deserialize)]
pub struct EntryCollection {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub includes: Includes,
}

/// Linked objects shipped alongside the items
#[derive(Debug, Default, Deserialize)]
pub struct Includes {
    #[serde(rename = "Asset", default)]
    pub assets: Vec<Value>,
    #[serde(rename = "Entry", default)]
    pub entries: Vec<Value>,
}

/// Replaces link objects with the objects they point to
pub struct LinkResolver {
    targets: HashMap<(String, String), Value>,
    depth: usize,
}

impl LinkResolver {
    /// Index the includes and items of a collection
    ///
    /// `depth` bounds how many links are followed in a chain, which also
    /// stops self-referencing entries from expanding forever.
    pub fn new(collection: &EntryCollection, depth: usize) -> Self {
        let mut targets = HashMap::new();
        let tagged = collection
            .includes
            .assets
            .iter()
            .map(|v| ("Asset", v))
            .chain(collection.includes.entries.iter().map(|v| ("Entry", v)))
            .chain(collection.items.iter().map(|v| ("Entry", v)));

        for (link_type, value) in tagged {
            if let Some(id) = value.pointer("/sys/id").and_then(Value::as_str) {
                targets
                    .entry((link_type.to_string(), id.to_string()))
                    .or_insert_with(|| value.clone());
            }
        }

        Self { targets, depth }
    }

    /// Resolve the links in an item's fields and decode it as an entry
    pub fn resolve_entry(&self, mut item: Value) -> Result<Entry, serde_json::Error> {
        if let Some(fields) = item.get_mut("fields") {
            self.resolve(fields, self.depth);
        }
        serde_json::from_value(item)
    }

    fn resolve(&self, value: &mut Value, depth: usize) {
        if is_link(value) {
            if depth == 0 {
                return;
            }
            if let Some(mut target) = self.lookup(value).cloned() {
                if let Some(fields) = target.get_mut("fields") {
                    self.resolve(fields, depth - 1);
                }
                *value = target;
            } else {
                tracing::debug!("Unresolvable link {}", value["sys"]);
            }
            return;
        }

        match value {
            Value::Array(items) => items.iter_mut().for_each(|v| self.resolve(v, depth)),
            Value::Object(map) => map.values_mut().for_each(|v| self.resolve(v, depth)),
            _ => {}
        }
    }

    fn lookup(&self, link: &Value) -> Option<&Value> {
        let sys = link.get("sys")?;
        let link_type = sys.get("linkType")?.as_str()?;
        let id = sys.get("id")?.as_str()?;
        self.targets.get(&(link_type.to_string(), id.to_string()))
    }
}
