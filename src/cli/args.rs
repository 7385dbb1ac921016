//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Embedded library manager and CI helper
///
/// Install libraries from a PlatformIO-style registry and build loose
/// sources against a set of boards.
#[derive(Parser, Debug)]
#[command(name = "pioctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "PIOCTL_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage libraries
    Lib(LibArgs),

    /// Build sources in a temporary project
    Ci(CiArgs),

    /// List known boards
    Boards(BoardsArgs),

    /// Show and change application settings
    Settings(SettingsArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for library commands
#[derive(Parser, Debug)]
pub struct LibArgs {
    /// Library storage directory
    #[arg(short = 'd', long, value_name = "PATH")]
    pub storage_dir: Option<PathBuf>,

    /// Suppress progress messages
    #[arg(short, long)]
    pub silent: bool,

    #[command(subcommand)]
    pub command: LibCommands,
}

/// Library subcommands
#[derive(Subcommand, Debug)]
pub enum LibCommands {
    /// Search the registry
    Search {
        /// Free-text query
        query: Vec<String>,

        /// Filter by author
        #[arg(short, long)]
        author: Vec<String>,

        /// Filter by framework
        #[arg(short, long)]
        framework: Vec<String>,

        /// Filter by platform
        #[arg(short, long)]
        platform: Vec<String>,

        /// Result page
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Install libraries with their dependencies
    Install {
        /// Name, `name@requirements`, id, URL or local path
        #[arg(required = true, value_name = "LIBRARY")]
        libraries: Vec<String>,
    },

    /// Remove installed libraries
    Uninstall {
        #[arg(required = true, value_name = "LIBRARY")]
        libraries: Vec<String>,
    },

    /// Update installed libraries (all when none given)
    Update {
        #[arg(value_name = "LIBRARY")]
        libraries: Vec<String>,

        /// Only report outdated libraries
        #[arg(long)]
        only_check: bool,
    },

    /// List installed libraries
    List,

    /// Show registry details of a library
    Show {
        #[arg(value_name = "LIBRARY")]
        library: String,
    },
}

/// Arguments for the ci command
#[derive(Parser, Debug)]
pub struct CiArgs {
    /// Source files or directories (globs allowed)
    #[arg(value_name = "SRC")]
    pub src: Vec<String>,

    /// Library source to copy into the project's lib directory
    #[arg(short, long = "lib", value_name = "PATH")]
    pub lib: Vec<String>,

    /// Path to exclude from the build directory
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<String>,

    /// Board ID to generate a build environment for
    #[arg(short, long = "board", value_name = "ID")]
    pub board: Vec<String>,

    /// Build directory, a temporary one by default
    #[arg(long, value_name = "DIRECTORY")]
    pub build_dir: Option<PathBuf>,

    /// Do not remove the build directory after building
    #[arg(long)]
    pub keep_build_dir: bool,

    /// Existing project configuration file
    #[arg(long, value_name = "FILE")]
    pub project_conf: Option<PathBuf>,
}

/// Arguments for the boards command
#[derive(Parser, Debug)]
pub struct BoardsArgs {
    /// Only boards whose id, name, platform or MCU contain this text
    pub filter: Option<String>,
}

/// Arguments for settings commands
#[derive(Parser, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommands,
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show one or all settings
    Get {
        /// Setting name
        name: Option<String>,
    },

    /// Change a setting
    Set {
        /// Setting name
        name: String,
        /// New value (yes/no, true/false, 1/0)
        value: String,
    },

    /// Restore defaults
    Reset,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
