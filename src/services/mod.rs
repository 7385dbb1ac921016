//! Service layer
//!
//! Services encapsulate library management, ci builds and application
//! settings on top of the registry and domain layers.

pub mod archive;
pub mod build;
pub mod ci;
pub mod library;
pub mod settings;

pub use build::{BuildRunner, CommandRunner};
pub use ci::{CiOptions, CiReport, CiRunner};
pub use library::{
    FirstChoice, InstalledLibrary, LibraryChooser, LibraryManager, PromptChooser, UpdateState,
    UpdateStatus,
};
pub use settings::Settings;
