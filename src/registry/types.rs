//! Registry API payloads

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::RepoVersion;

/// One page of `/lib/search` results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total number of matches across all pages
    pub total: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_perpage")]
    pub perpage: u32,
    #[serde(default)]
    pub items: Vec<LibrarySearchItem>,
}

fn default_page() -> u32 {
    1
}

fn default_perpage() -> u32 {
    10
}

impl SearchResult {
    /// Whether further pages exist after this one
    pub fn has_next_page(&self) -> bool {
        self.perpage > 0 && self.page.saturating_mul(self.perpage) < self.total
    }
}

/// A library entry in search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibrarySearchItem {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub authornames: Vec<String>,
    #[serde(default, deserialize_with = "names_or_strings")]
    pub frameworks: Vec<String>,
    #[serde(default, deserialize_with = "names_or_strings")]
    pub platforms: Vec<String>,
}

impl LibrarySearchItem {
    /// Registry page for this library
    pub fn show_url(&self) -> String {
        format!("https://platformio.org/lib/show/{}/{}", self.id, self.name)
    }
}

/// Author details in `/lib/info` responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryAuthor {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub maintainer: bool,
}

/// Full library details from `/lib/info/<id>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryInfo {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub authors: Vec<LibraryAuthor>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "names_or_strings")]
    pub frameworks: Vec<String>,
    #[serde(default, deserialize_with = "names_or_strings")]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub versions: Vec<RepoVersion>,
}

/// Response of `/lib/download/<id>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadInfo {
    pub url: String,
}

/// Accept both `["arduino"]` and `[{"name": "arduino", "title": "Arduino"}]`
fn names_or_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Plain(String),
        Named { name: String },
    }

    let entries: Option<Vec<Entry>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|e| match e {
            Entry::Plain(s) => s,
            Entry::Named { name } => name,
        })
        .collect())
}
