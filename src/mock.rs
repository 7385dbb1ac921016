//! Mock implementations for testing
//!
//! Provides an in-memory registry and a recording build runner so library
//! installs and ci runs can be tested without network access or toolchains.

use crate::domain::{Board, RepoVersion};
use crate::error::{CiError, RegistryError};
use crate::registry::{LibraryInfo, LibrarySearchItem, Registry, SearchResult};
use crate::services::build::BuildRunner;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

const PER_PAGE: u32 = 10;

/// In-memory library registry
#[derive(Debug, Default)]
pub struct MockRegistry {
    libraries: Vec<LibraryInfo>,
    downloads: HashMap<(u32, String), String>,
    content: HashMap<String, Vec<u8>>,
    boards: Vec<Board>,
    fetched: Mutex<Vec<String>>,
    searches: Mutex<u32>,
}

impl MockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a library with `(version, released)` pairs
    pub fn with_library(mut self, id: u32, name: &str, versions: &[(&str, &str)]) -> Self {
        self.libraries.push(LibraryInfo {
            id,
            name: name.to_string(),
            description: format!("Mock library {}", name),
            versions: versions
                .iter()
                .map(|(version, date)| RepoVersion::new(*version, *date))
                .collect(),
            ..Default::default()
        });
        self
    }

    /// Builder: serve an archive for a library version
    pub fn with_archive(self, id: u32, version: &str, bytes: Vec<u8>) -> Self {
        let url = format!("https://dl.mock.test/{}/{}.zip", id, version);
        self.with_download_url(id, version, &url).with_url(&url, bytes)
    }

    /// Builder: set the download URL reported for a library version
    pub fn with_download_url(mut self, id: u32, version: &str, url: &str) -> Self {
        self.downloads
            .insert((id, version.to_string()), url.to_string());
        self
    }

    /// Builder: serve raw content for a URL
    pub fn with_url(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.content.insert(url.to_string(), bytes);
        self
    }

    /// Builder: add a board to the catalog
    pub fn with_board(mut self, board: Board) -> Self {
        self.boards.push(board);
        self
    }

    /// URLs passed to `fetch`, in call order
    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// Number of search requests served
    pub fn search_count(&self) -> u32 {
        *self.searches.lock().unwrap()
    }

    fn library(&self, id: u32) -> Result<&LibraryInfo, RegistryError> {
        self.libraries
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| RegistryError::Status {
                url: format!("mock://lib/{}", id),
                status: 404,
            })
    }

    fn matches(lib: &LibraryInfo, query: &str) -> bool {
        let mut text = Vec::new();
        for term in query.split_whitespace() {
            match term.split_once(':') {
                Some(("name", value)) => {
                    if !lib.name.eq_ignore_ascii_case(value.trim_matches('"')) {
                        return false;
                    }
                }
                Some(_) => {}
                None => text.push(term.to_lowercase()),
            }
        }

        let haystack = format!("{} {}", lib.name, lib.description).to_lowercase();
        text.iter().all(|t| haystack.contains(t))
    }
}

impl Registry for MockRegistry {
    fn search(&self, query: &str, page: u32) -> Result<SearchResult, RegistryError> {
        *self.searches.lock().unwrap() += 1;

        let found: Vec<LibrarySearchItem> = self
            .libraries
            .iter()
            .filter(|lib| Self::matches(lib, query))
            .map(|lib| LibrarySearchItem {
                id: lib.id,
                name: lib.name.clone(),
                description: lib.description.clone(),
                ..Default::default()
            })
            .collect();

        let page = page.max(1);
        let items = found
            .iter()
            .skip(((page - 1) * PER_PAGE) as usize)
            .take(PER_PAGE as usize)
            .cloned()
            .collect();

        Ok(SearchResult {
            total: found.len() as u32,
            page,
            perpage: PER_PAGE,
            items,
        })
    }

    fn versions(&self, id: u32) -> Result<Vec<RepoVersion>, RegistryError> {
        Ok(self.library(id)?.versions.clone())
    }

    fn download_url(&self, id: u32, version: &str) -> Result<String, RegistryError> {
        self.downloads
            .get(&(id, version.to_string()))
            .cloned()
            .ok_or_else(|| RegistryError::Status {
                url: format!("mock://download/{}/{}", id, version),
                status: 404,
            })
    }

    fn info(&self, id: u32) -> Result<LibraryInfo, RegistryError> {
        self.library(id).cloned()
    }

    fn boards(&self) -> Result<Vec<Board>, RegistryError> {
        Ok(self.boards.clone())
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        self.fetched.lock().unwrap().push(url.to_string());

        if let Some(bytes) = self.content.get(url) {
            return Ok(bytes.clone());
        }
        if let Some(path) = url.strip_prefix("file://") {
            let path = PathBuf::from(path);
            return std::fs::read(&path).map_err(|source| RegistryError::LocalFile { path, source });
        }
        Err(RegistryError::Http {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

/// One recorded build invocation
#[derive(Debug, Clone)]
pub struct BuildCall {
    pub project_dir: PathBuf,
    pub verbose: bool,
    /// Files present at build time, relative to the project dir
    pub files: Vec<String>,
}

/// Build runner that records invocations instead of compiling
#[derive(Debug, Default)]
pub struct MockBuildRunner {
    calls: Mutex<Vec<BuildCall>>,
    fail_code: Option<i32>,
}

impl MockBuildRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: make every build fail with an exit code
    pub fn failing(mut self, code: i32) -> Self {
        self.fail_code = Some(code);
        self
    }

    /// Recorded invocations
    pub fn calls(&self) -> Vec<BuildCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl BuildRunner for MockBuildRunner {
    fn build(&self, project_dir: &Path, verbose: bool) -> Result<(), CiError> {
        let mut files: Vec<String> = WalkDir::new(project_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                e.path()
                    .strip_prefix(project_dir)
                    .ok()
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        files.sort();

        self.calls.lock().unwrap().push(BuildCall {
            project_dir: project_dir.to_path_buf(),
            verbose,
            files,
        });

        match self.fail_code {
            Some(code) => Err(CiError::BuildFailed { code: Some(code) }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_search_by_name() {
        let registry = MockRegistry::new()
            .with_library(1, "OneWire", &[])
            .with_library(2, "OneWireHub", &[]);

        let result = registry.search("name:\"onewire\"", 1).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].id, 1);

        let result = registry.search("onewire", 1).unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(registry.search_count(), 2);
    }

    #[test]
    fn test_mock_fetch_records_urls() {
        let registry = MockRegistry::new().with_url("https://a.test/x.zip", vec![1, 2, 3]);
        assert_eq!(registry.fetch("https://a.test/x.zip").unwrap(), vec![1, 2, 3]);
        assert!(registry.fetch("https://a.test/missing.zip").is_err());
        assert_eq!(registry.fetched_urls().len(), 2);
    }

    #[test]
    fn test_mock_board_lookup() {
        let registry = MockRegistry::new().with_board(Board::new("uno", "Arduino Uno", "atmelavr"));
        assert!(registry.board("uno").unwrap().is_some());
        assert!(registry.board("mega").unwrap().is_none());
    }
}
