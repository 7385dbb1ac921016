//! Library registry abstraction layer
//!
//! Provides trait-based access to the registry API for testability.

pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpRegistry;
pub use traits::Registry;
pub use types::{DownloadInfo, LibraryAuthor, LibraryInfo, LibrarySearchItem, SearchResult};
