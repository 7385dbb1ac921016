//! HTTP registry client
//!
//! Talks to the library registry API with a blocking reqwest client.

use crate::domain::{Board, RepoVersion};
use crate::error::RegistryError;
use crate::registry::traits::Registry;
use crate::registry::types::{DownloadInfo, LibraryInfo, SearchResult};

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;

const USER_AGENT: &str = concat!("pioctl/", env!("CARGO_PKG_VERSION"));

/// Registry reachable over HTTP(S)
pub struct HttpRegistry {
    base_url: String,
    client: Client,
}

impl HttpRegistry {
    /// Create a client for the registry at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RegistryError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RegistryError::Http {
                url: base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self { base_url, client })
    }

    /// Base URL of the registry API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RegistryError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| RegistryError::Http {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.json::<T>().map_err(|e| RegistryError::Parse {
            url,
            reason: e.to_string(),
        })
    }
}

impl Registry for HttpRegistry {
    fn search(&self, query: &str, page: u32) -> Result<SearchResult, RegistryError> {
        self.get_json(
            "/lib/search",
            &[("query", query.to_string()), ("page", page.max(1).to_string())],
        )
    }

    fn versions(&self, id: u32) -> Result<Vec<RepoVersion>, RegistryError> {
        self.get_json(&format!("/lib/versions/{}", id), &[])
    }

    fn download_url(&self, id: u32, version: &str) -> Result<String, RegistryError> {
        let info: DownloadInfo = self.get_json(
            &format!("/lib/download/{}", id),
            &[("version", version.to_string())],
        )?;
        Ok(info.url)
    }

    fn info(&self, id: u32) -> Result<LibraryInfo, RegistryError> {
        self.get_json(&format!("/lib/info/{}", id), &[])
    }

    fn boards(&self) -> Result<Vec<Board>, RegistryError> {
        self.get_json("/boards", &[])
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        if let Some(path) = url.strip_prefix("file://") {
            let path = PathBuf::from(path);
            return std::fs::read(&path).map_err(|source| RegistryError::LocalFile { path, source });
        }

        log::debug!("Downloading {}", url);
        let response = self.client.get(url).send().map_err(|e| RegistryError::Http {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| RegistryError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}
