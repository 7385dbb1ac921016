//! Boards command implementation
//!
//! Lists boards from the registry catalog.

use crate::cli::args::{BoardsArgs, OutputFormat};
use crate::cli::output::{print_output, BoardList};
use crate::commands::open_registry;
use crate::config::Config;
use crate::domain::Board;
use crate::error::Result;
use crate::registry::Registry;

/// Execute the boards command
pub fn run_boards(args: &BoardsArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let registry = open_registry(config)?;
    let boards = filter_boards(registry.boards()?, args.filter.as_deref());

    print_output(&BoardList { boards }, format)?;

    Ok(())
}

fn filter_boards(boards: Vec<Board>, filter: Option<&str>) -> Vec<Board> {
    let mut boards: Vec<Board> = match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(filter) => boards.into_iter().filter(|b| b.matches(filter)).collect(),
        None => boards,
    };
    boards.sort_by(|a, b| a.id.cmp(&b.id));
    boards
}
