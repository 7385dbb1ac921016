//! pioctl - embedded library manager and CI helper
//!
//! This library provides library management against a PlatformIO-style
//! registry and ci builds of loose sources for a set of boards.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Domain models with validation
//! - [`error`]: Error types
//! - [`registry`]: Registry abstraction layer
//! - [`services`]: Business logic services

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod registry;
pub mod services;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
