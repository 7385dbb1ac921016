//! CI command implementation
//!
//! Builds loose sources in a generated project.

use crate::cli::args::{CiArgs, OutputFormat};
use crate::cli::output::{print_output, CiSummary};
use crate::commands::open_registry;
use crate::config::Config;
use crate::error::Result;
use crate::services::ci::CI_SRC_ENV;
use crate::services::{CiOptions, CiRunner, CommandRunner};

/// Execute the ci command
pub fn run_ci(args: &CiArgs, config: &Config, format: OutputFormat, verbose: bool) -> Result<()> {
    let sources = if args.src.is_empty() {
        std::env::var(CI_SRC_ENV)
            .map(|v| CiOptions::sources_from_env(&v))
            .unwrap_or_default()
    } else {
        args.src.clone()
    };

    let opts = CiOptions {
        sources,
        libs: args.lib.clone(),
        excludes: args.exclude.clone(),
        boards: args.board.clone(),
        build_dir: args.build_dir.clone(),
        keep_build_dir: args.keep_build_dir,
        project_conf: args.project_conf.clone(),
        verbose,
    };

    let registry = open_registry(config)?;
    let builder = CommandRunner::from_command(&config.ci.build_command)?;
    let report = CiRunner::new(&registry, &builder).run(&opts)?;

    print_output(&CiSummary(report), format)?;

    Ok(())
}
