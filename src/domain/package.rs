//! Library package specifications and manifests

use crate::error::{DomainError, PackageError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the manifest written into every installed library directory
pub const MANIFEST_NAME: &str = ".library.json";

/// Prefix for numeric registry ids, e.g. `id=13`
const ID_PREFIX: &str = "id=";

const URL_MARKER: &str = "://";

const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz", ".zip", ".git"];

/// A user-supplied library reference
///
/// Accepted forms: `Name`, `Name@^1.2`, `13` / `id=13`, `Name=https://...`,
/// a URL, or a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Library name or `id=<n>`
    pub name: String,
    /// Version requirement
    pub requirements: Option<String>,
    /// Download URL (`file://` for local paths)
    pub url: Option<String>,
}

impl PackageSpec {
    /// Parse a library reference
    pub fn parse(text: &str, requirements: Option<&str>) -> Result<Self, DomainError> {
        let mut text = text.trim().to_string();
        let mut requirements = requirements
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from);

        if text.is_empty() {
            return Err(DomainError::InvalidPackageSpec(
                "empty library name".to_string(),
            ));
        }

        if requirements.is_none()
            && text.contains('@')
            && !text.starts_with("git@")
            && !text.contains(URL_MARKER)
        {
            if let Some((name, req)) = text.rsplit_once('@') {
                let req = req.trim();
                if !req.is_empty() {
                    requirements = Some(req.to_string());
                }
                text = name.trim().to_string();
            }
        }

        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            text = format!("{}{}", ID_PREFIX, text);
        }

        let (name, url) = match text.split_once('=') {
            Some((name, url)) if !text.starts_with(ID_PREFIX) && !name.contains(URL_MARKER) => {
                (Some(name.trim().to_string()), url.trim().to_string())
            }
            _ => (None, text.clone()),
        };

        let local = Path::new(&url);
        if !url.contains(URL_MARKER) && (local.is_dir() || local.is_file()) {
            let abs = std::fs::canonicalize(local).unwrap_or_else(|_| local.to_path_buf());
            let name = name.unwrap_or_else(|| base_name(&abs.to_string_lossy()));
            return Ok(Self {
                name,
                requirements,
                url: Some(format!("file://{}", abs.display())),
            });
        }

        if !url.contains(URL_MARKER) {
            if let Some(id) = text.strip_prefix(ID_PREFIX) {
                if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DomainError::InvalidPackageSpec(text));
                }
            }
            return Ok(Self {
                name: text,
                requirements,
                url: None,
            });
        }

        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| base_name(&url));
        Ok(Self {
            name,
            requirements,
            url: Some(url),
        })
    }

    /// Numeric registry id for `id=<n>` names
    pub fn registry_id(&self) -> Option<u32> {
        parse_registry_id(&self.name)
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(req) = &self.requirements {
            write!(f, "@{}", req)?;
        }
        if let Some(url) = &self.url {
            write!(f, " ({})", url)?;
        }
        Ok(())
    }
}

/// Parse `id=<n>` into `n`
pub fn parse_registry_id(name: &str) -> Option<u32> {
    name.strip_prefix(ID_PREFIX)?.parse().ok()
}

/// Base name of a URL or path without archive suffixes
fn base_name(url: &str) -> String {
    let trimmed = url.trim_end_matches(['/', '\\']);
    let last = trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let mut name = last.to_string();
    for suffix in ARCHIVE_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.to_string();
            break;
        }
    }
    name
}

/// Host system type, e.g. `linux_x86_64`
pub fn systype() -> String {
    format!("{}_{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// Manifest stored as `.library.json` in an installed library directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryManifest {
    /// Registry id when installed from the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Library name
    pub name: String,
    /// Installed version
    #[serde(default)]
    pub version: String,
    /// Source URL when installed from a URL or path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frameworks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,
    /// Raw dependency declaration, see [`crate::domain::normalize_dependencies`]
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub dependencies: Value,
}

impl LibraryManifest {
    /// Load the manifest of an installed library directory
    pub fn load(pkg_dir: &Path) -> Result<Self, PackageError> {
        let path = pkg_dir.join(MANIFEST_NAME);
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| PackageError::ManifestParse {
            path,
            reason: e.to_string(),
        })
    }

    /// Write the manifest into an installed library directory
    pub fn save(&self, pkg_dir: &Path) -> Result<PathBuf, PackageError> {
        let path = pkg_dir.join(MANIFEST_NAME);
        let json = serde_json::to_string_pretty(self).map_err(|e| PackageError::ManifestParse {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json)?;
        Ok(path)
    }

    /// Read metadata shipped with library sources
    ///
    /// Looks for `library.json` first, then Arduino `library.properties`.
    pub fn from_source_dir(dir: &Path) -> Result<Option<Self>, PackageError> {
        let json_path = dir.join("library.json");
        if json_path.is_file() {
            let content = std::fs::read_to_string(&json_path)?;
            let value: Value =
                serde_json::from_str(&content).map_err(|e| PackageError::ManifestParse {
                    path: json_path.clone(),
                    reason: e.to_string(),
                })?;
            return Ok(Some(Self::from_library_json(&value)));
        }

        let props_path = dir.join("library.properties");
        if props_path.is_file() {
            let content = std::fs::read_to_string(&props_path)?;
            return Ok(Some(Self::from_library_properties(&content)));
        }

        Ok(None)
    }

    fn from_library_json(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(String::from);
        let list = |key: &str| -> Vec<String> {
            match value.get(key) {
                Some(Value::String(s)) if s.trim() == "*" => Vec::new(),
                Some(Value::String(s)) => split_csv(s),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(o) => o.get("name").and_then(Value::as_str).map(String::from),
                        _ => None,
                    })
                    .collect(),
                Some(Value::Object(o)) => o
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|s| vec![s.to_string()])
                    .unwrap_or_default(),
                _ => Vec::new(),
            }
        };

        Self {
            id: None,
            name: text("name").unwrap_or_default(),
            version: text("version").unwrap_or_default(),
            url: None,
            description: text("description"),
            keywords: list("keywords"),
            authors: list("authors"),
            frameworks: list("frameworks"),
            platforms: list("platforms"),
            dependencies: value.get("dependencies").cloned().unwrap_or(Value::Null),
        }
    }

    fn from_library_properties(content: &str) -> Self {
        let mut manifest = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "name" => manifest.name = value.to_string(),
                "version" => manifest.version = value.to_string(),
                "sentence" => manifest.description = Some(value.to_string()),
                "author" => manifest.authors = split_csv(value),
                "architectures" if value != "*" => manifest.platforms = split_csv(value),
                "category" => manifest.keywords = vec![value.to_lowercase()],
                _ => {}
            }
        }
        manifest.frameworks = vec!["arduino".to_string()];
        manifest
    }
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_plain_name() {
        let spec = PackageSpec::parse("ArduinoJson", None).unwrap();
        assert_eq!(spec.name, "ArduinoJson");
        assert_eq!(spec.requirements, None);
        assert_eq!(spec.url, None);
    }

    #[test]
    fn test_parse_name_with_requirements() {
        let spec = PackageSpec::parse("ArduinoJson@^5.6", None).unwrap();
        assert_eq!(spec.name, "ArduinoJson");
        assert_eq!(spec.requirements.as_deref(), Some("^5.6"));

        let spec = PackageSpec::parse("ArduinoJson@^5.6", Some("~5.7")).unwrap();
        assert_eq!(spec.name, "ArduinoJson@^5.6");
        assert_eq!(spec.requirements.as_deref(), Some("~5.7"));
    }

    #[test]
    fn test_parse_numeric_id() {
        let spec = PackageSpec::parse("64", None).unwrap();
        assert_eq!(spec.name, "id=64");
        assert_eq!(spec.registry_id(), Some(64));

        let spec = PackageSpec::parse("id=13@1.0.0", None).unwrap();
        assert_eq!(spec.registry_id(), Some(13));
        assert_eq!(spec.requirements.as_deref(), Some("1.0.0"));

        assert!(PackageSpec::parse("id=abc", None).is_err());
    }

    #[test]
    fn test_parse_urls() {
        let spec =
            PackageSpec::parse("https://github.com/bblanchon/ArduinoJson.git", None).unwrap();
        assert_eq!(spec.name, "ArduinoJson");
        assert_eq!(
            spec.url.as_deref(),
            Some("https://github.com/bblanchon/ArduinoJson.git")
        );

        let spec = PackageSpec::parse("Json=https://example.com/json-5.0.tar.gz", None).unwrap();
        assert_eq!(spec.name, "Json");
        assert_eq!(spec.url.as_deref(), Some("https://example.com/json-5.0.tar.gz"));

        let spec = PackageSpec::parse("git@github.com:foo/bar.git", None).unwrap();
        assert_eq!(spec.url, None);
        assert_eq!(spec.requirements, None);
    }

    #[test]
    fn test_parse_local_dir() {
        let tmp = TempDir::new().unwrap();
        let lib_dir = tmp.path().join("MyLib");
        std::fs::create_dir_all(&lib_dir).unwrap();

        let spec = PackageSpec::parse(lib_dir.to_str().unwrap(), None).unwrap();
        assert_eq!(spec.name, "MyLib");
        assert!(spec.url.unwrap().starts_with("file://"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(PackageSpec::parse("  ", None).is_err());
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("https://host/path/Lib-1.0.zip"), "Lib-1.0");
        assert_eq!(base_name("https://host/path/Lib.tar.gz?raw=1"), "Lib");
        assert_eq!(base_name("/tmp/libs/Foo/"), "Foo");
    }

    #[test]
    fn test_manifest_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let manifest = LibraryManifest {
            id: Some(64),
            name: "ArduinoJson".to_string(),
            version: "5.6.7".to_string(),
            dependencies: json!({"OneWire": "*"}),
            ..Default::default()
        };
        manifest.save(tmp.path()).unwrap();

        let loaded = LibraryManifest::load(tmp.path()).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_manifest_load_invalid() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_NAME), "{not json").unwrap();
        let result = LibraryManifest::load(tmp.path());
        assert!(matches!(result, Err(PackageError::ManifestParse { .. })));
    }

    #[test]
    fn test_source_library_json() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("library.json"),
            r#"{
                "name": "DallasTemperature",
                "version": "3.7.6",
                "keywords": "onewire, temperature",
                "authors": [{"name": "Miles Burton"}],
                "frameworks": "arduino",
                "platforms": "*",
                "dependencies": {"name": "OneWire", "authors": "Paul Stoffregen"}
            }"#,
        )
        .unwrap();

        let manifest = LibraryManifest::from_source_dir(tmp.path()).unwrap().unwrap();
        assert_eq!(manifest.name, "DallasTemperature");
        assert_eq!(manifest.version, "3.7.6");
        assert_eq!(manifest.keywords, vec!["onewire", "temperature"]);
        assert_eq!(manifest.authors, vec!["Miles Burton"]);
        assert!(manifest.platforms.is_empty());
        assert_eq!(manifest.dependencies["name"], "OneWire");
    }

    #[test]
    fn test_source_library_properties() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("library.properties"),
            "# comment\nname=Servo\nversion=1.1.2\nauthor=Michael Margolis, Arduino\nsentence=Controls servo motors.\narchitectures=avr,sam\n",
        )
        .unwrap();

        let manifest = LibraryManifest::from_source_dir(tmp.path()).unwrap().unwrap();
        assert_eq!(manifest.name, "Servo");
        assert_eq!(manifest.version, "1.1.2");
        assert_eq!(manifest.authors, vec!["Michael Margolis", "Arduino"]);
        assert_eq!(manifest.platforms, vec!["avr", "sam"]);
        assert_eq!(manifest.frameworks, vec!["arduino"]);
    }

    #[test]
    fn test_source_without_metadata() {
        let tmp = TempDir::new().unwrap();
        assert!(LibraryManifest::from_source_dir(tmp.path()).unwrap().is_none());
    }
}
