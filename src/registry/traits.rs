//! Trait definitions for registry operations
//!
//! These traits abstract over the HTTP registry to enable testing with mocks.

use crate::domain::{Board, RepoVersion};
use crate::error::RegistryError;
use crate::registry::types::{LibraryInfo, SearchResult};

/// Access to a library registry
pub trait Registry: Send + Sync {
    /// Search libraries; `query` uses `key:"value"` terms and free text
    fn search(&self, query: &str, page: u32) -> Result<SearchResult, RegistryError>;

    /// All released versions of a library
    fn versions(&self, id: u32) -> Result<Vec<RepoVersion>, RegistryError>;

    /// Download URL of a specific library version
    fn download_url(&self, id: u32, version: &str) -> Result<String, RegistryError>;

    /// Full library details
    fn info(&self, id: u32) -> Result<LibraryInfo, RegistryError>;

    /// Board catalog
    fn boards(&self) -> Result<Vec<Board>, RegistryError>;

    /// Fetch raw content of a URL (`file://` URLs are read from disk)
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RegistryError>;

    /// Find a board by id
    fn board(&self, id: &str) -> Result<Option<Board>, RegistryError> {
        Ok(self.boards()?.into_iter().find(|b| b.id == id))
    }
}
