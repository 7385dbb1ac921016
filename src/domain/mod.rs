//! Domain models for pioctl
//!
//! Library specifications, version requirements, dependency filters, boards
//! and project configuration. Parsing is lenient where registry data is
//! loosely structured, and strict for user input.

pub mod board;
pub mod dependency;
pub mod package;
pub mod project;
pub mod version;

pub use board::Board;
pub use dependency::{normalize_dependencies, LibraryFilters};
pub use package::{systype, LibraryManifest, PackageSpec, MANIFEST_NAME};
pub use project::{ProjectConf, ProjectEnv, PROJECT_CONF_NAME};
pub use version::{is_newer, max_satisfying, parse_partial, RepoVersion, Requirement};
