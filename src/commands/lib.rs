//! Library command implementation
//!
//! Handles search, install, uninstall, update, list and show.

use crate::cli::args::{LibArgs, LibCommands, OutputFormat};
use crate::cli::output::{
    print_output, InstalledEntry, InstalledList, LibraryChanges, LibraryDetails, SearchOutput,
    UpdateReport,
};
use crate::commands::open_registry;
use crate::config::Config;
use crate::domain::dependency::query_term;
use crate::error::Result;
use crate::registry::HttpRegistry;
use crate::services::settings::{Settings, ENABLE_PROMPTS};
use crate::services::{FirstChoice, LibraryManager, PromptChooser};

use std::io::IsTerminal;

/// Execute library commands
pub fn run_lib(args: &LibArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let registry = open_registry(config)?;
    let storage_dir = match &args.storage_dir {
        Some(dir) => dir.clone(),
        None => config.storage_dir()?,
    };
    log::debug!("Library storage: {}", storage_dir.display());

    let manager = LibraryManager::new(&registry, storage_dir).with_silent(args.silent);
    let manager = if prompts_enabled(config)? {
        manager.with_chooser(PromptChooser)
    } else {
        manager.with_chooser(FirstChoice)
    };

    match &args.command {
        LibCommands::Search {
            query,
            author,
            framework,
            platform,
            page,
        } => {
            let query = build_query(query, author, framework, platform);
            run_search(&manager, &query, *page, format)
        }
        LibCommands::Install { libraries } => {
            let mut installed = Vec::new();
            for library in libraries {
                installed.extend(manager.install(library, None)?);
            }
            let changes = LibraryChanges {
                action: "installed".to_string(),
                libraries: installed.iter().map(Into::into).collect(),
            };
            print_output(&changes, format)?;
            Ok(())
        }
        LibCommands::Uninstall { libraries } => {
            let mut removed = Vec::new();
            for library in libraries {
                removed.push(manager.uninstall(library)?);
            }
            let changes = LibraryChanges {
                action: "uninstalled".to_string(),
                libraries: removed.iter().map(|l| (&l.manifest).into()).collect(),
            };
            print_output(&changes, format)?;
            Ok(())
        }
        LibCommands::Update {
            libraries,
            only_check,
        } => {
            let report = UpdateReport {
                libraries: manager.update(libraries, *only_check)?,
            };
            print_output(&report, format)?;
            Ok(())
        }
        LibCommands::List => {
            let list = InstalledList {
                storage_dir: manager.storage_dir().to_path_buf(),
                libraries: manager.installed()?.iter().map(InstalledEntry::from).collect(),
            };
            print_output(&list, format)?;
            Ok(())
        }
        LibCommands::Show { library } => {
            print_output(&LibraryDetails(manager.show(library)?), format)?;
            Ok(())
        }
    }
}

fn run_search(
    manager: &LibraryManager<'_, HttpRegistry>,
    query: &str,
    page: u32,
    format: OutputFormat,
) -> Result<()> {
    let result = manager.search(query, page)?;
    print_output(&SearchOutput::new(query, result), format)?;
    Ok(())
}

/// Prompts need the setting and an interactive stdin
fn prompts_enabled(config: &Config) -> Result<bool> {
    let settings = Settings::load(&config.home_dir()?)?;
    Ok(settings.get(ENABLE_PROMPTS)? && std::io::stdin().is_terminal())
}

/// Combine free text with `key:"value"` filter terms
fn build_query(words: &[String], authors: &[String], frameworks: &[String], platforms: &[String]) -> String {
    let mut terms: Vec<String> = words.to_vec();
    for (key, values) in [("author", authors), ("framework", frameworks), ("platform", platforms)] {
        terms.extend(values.iter().map(|v| query_term(key, v)));
    }
    terms.join(" ")
}
