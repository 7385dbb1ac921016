//! CLI argument parsing and output formatting
//!
//! Arguments are clap derive definitions; every command result renders as a
//! table, JSON or a compact line.

pub mod args;
pub mod output;

pub use args::{Cli, Commands, OutputFormat};
