//! Library dependency declarations
//!
//! Library manifests declare dependencies in several shapes; everything is
//! normalized into [`LibraryFilters`], which double as registry search
//! requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Registry lookup filters for one library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryFilters {
    /// Library name
    pub name: String,
    /// Optional version requirement, or a URL/path for non-registry sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Author names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// Compatible frameworks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,
    /// Compatible platforms
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
}

impl LibraryFilters {
    /// Create filters matching only a library name
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether the version field points at a URL or local path
    pub fn is_external_source(&self) -> bool {
        self.version
            .as_deref()
            .is_some_and(|v| v.contains('/') || v.contains('\\'))
    }

    /// Build the registry search query, e.g. `name:"Foo" framework:"arduino"`
    pub fn search_query(&self) -> String {
        let mut query: Vec<String> = self
            .name
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| query_term("name", n))
            .collect();
        for (key, values) in [
            ("authors", &self.authors),
            ("frameworks", &self.frameworks),
            ("platforms", &self.platforms),
        ] {
            for value in values {
                query.push(query_term(key, value));
            }
        }
        query.join(" ")
    }
}

impl fmt::Display for LibraryFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).unwrap_or_else(|_| self.name.clone());
        write!(f, "{}", json)
    }
}

/// Format one `key:"value"` search term; plural keys are singularized
pub fn query_term(key: &str, value: &str) -> String {
    let key = key.strip_suffix('s').unwrap_or(key);
    format!("{}:\"{}\"", key, value)
}

/// Normalize a manifest `dependencies` value
///
/// Accepted shapes:
/// - `{"name": "Foo", "version": "^1.0"}`: a single dependency
/// - `{"Foo": "^1.0", "Bar": "*"}`: a name to version map
/// - `[{"name": "Foo"}, ...]`: entries without `name` are dropped
pub fn normalize_dependencies(dependencies: &Value) -> Vec<LibraryFilters> {
    let items: Vec<&serde_json::Map<String, Value>> = match dependencies {
        Value::Object(map) if map.contains_key("name") => vec![map],
        Value::Object(map) => {
            return map
                .iter()
                .map(|(name, version)| LibraryFilters {
                    name: name.clone(),
                    version: value_as_version(version),
                    ..Default::default()
                })
                .collect();
        }
        Value::Array(list) => list
            .iter()
            .filter_map(Value::as_object)
            .filter(|m| m.contains_key("name"))
            .collect(),
        _ => Vec::new(),
    };

    items.into_iter().filter_map(filters_from_object).collect()
}

fn filters_from_object(item: &serde_json::Map<String, Value>) -> Option<LibraryFilters> {
    let name = item.get("name")?.as_str()?.trim().to_string();
    if name.is_empty() {
        return None;
    }

    Some(LibraryFilters {
        name,
        version: item.get("version").and_then(value_as_version),
        authors: split_list(item.get("authors")),
        frameworks: split_list(item.get("frameworks")),
        platforms: split_list(item.get("platforms")),
    })
}

fn value_as_version(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() && s.trim() != "*" => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Split a comma separated string (or keep a list); `"*"` means no filter
fn split_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) if s.trim() == "*" => Vec::new(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => o.get("name").and_then(Value::as_str).map(String::from),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
