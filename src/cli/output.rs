//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::board::format_size;
use crate::domain::{Board, LibraryManifest};
use crate::registry::{LibraryInfo, LibrarySearchItem, SearchResult};
use crate::services::ci::CiReport;
use crate::services::library::{InstalledLibrary, UpdateState, UpdateStatus};
use crate::services::settings::SettingEntry;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

/// One page of registry search results
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub total: u32,
    pub page: u32,
    pub has_next_page: bool,
    pub items: Vec<LibrarySearchItem>,
}

impl SearchOutput {
    pub fn new(query: impl Into<String>, result: SearchResult) -> Self {
        Self {
            query: query.into(),
            total: result.total,
            page: result.page,
            has_next_page: result.has_next_page(),
            items: result.items,
        }
    }
}

impl TableDisplay for SearchOutput {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Found {} libraries (page {})\n\n",
            self.total, self.page
        );

        for item in &self.items {
            output.push_str(&format!("[ID:{}] {}\n", item.id, item.name));
            if !item.description.is_empty() {
                output.push_str(&format!("  {}\n", item.description));
            }
            output.push_str(&format!(
                "  Keywords: {}\n  Compatible frameworks: {}\n  Compatible platforms: {}\n  Authors: {}\n\n",
                join_or_dash(&item.keywords),
                join_or_dash(&item.frameworks),
                join_or_dash(&item.platforms),
                join_or_dash(&item.authornames),
            ));
        }

        if self.has_next_page {
            output.push_str(&format!("More results: --page {}\n", self.page + 1));
        }
        output
    }

    fn to_compact(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{}:{}", i.id, i.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Installed library entry for display
#[derive(Debug, Clone, Serialize)]
pub struct InstalledEntry {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub path: PathBuf,
}

impl From<&InstalledLibrary> for InstalledEntry {
    fn from(lib: &InstalledLibrary) -> Self {
        Self {
            name: lib.manifest.name.clone(),
            version: lib.manifest.version.clone(),
            id: lib.manifest.id,
            url: lib.manifest.url.clone(),
            path: lib.path.clone(),
        }
    }
}

/// Installed libraries
#[derive(Debug, Clone, Serialize)]
pub struct InstalledList {
    pub storage_dir: PathBuf,
    pub libraries: Vec<InstalledEntry>,
}

impl TableDisplay for InstalledList {
    fn to_table(&self) -> String {
        let mut output = format!("Library Storage: {}\n", self.storage_dir.display());
        if self.libraries.is_empty() {
            output.push_str("No libraries installed\n");
            return output;
        }

        output.push('\n');
        for lib in &self.libraries {
            let source = match (lib.id, &lib.url) {
                (Some(id), _) => format!("id={}", id),
                (None, Some(url)) => url.clone(),
                (None, None) => "-".to_string(),
            };
            output.push_str(&format!("{:<30} {:<12} {}\n", lib.name, lib.version, source));
        }
        output
    }

    fn to_compact(&self) -> String {
        self.libraries
            .iter()
            .map(|l| format!("{}@{}", l.name, l.version))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Registry details of one library
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct LibraryDetails(pub LibraryInfo);

impl TableDisplay for LibraryDetails {
    fn to_table(&self) -> String {
        let info = &self.0;
        let mut output = format!("{}\n{}\n", info.name, "=".repeat(info.name.len()));
        output.push_str(&format!("#ID: {}\n", info.id));
        if !info.description.is_empty() {
            output.push_str(&format!("{}\n", info.description));
        }
        output.push('\n');

        if let Some(homepage) = &info.homepage {
            output.push_str(&format!("Homepage: {}\n", homepage));
        }
        if let Some(repository) = &info.repository {
            output.push_str(&format!("Repository: {}\n", repository));
        }
        output.push_str(&format!("Keywords: {}\n", join_or_dash(&info.keywords)));
        output.push_str(&format!("Frameworks: {}\n", join_or_dash(&info.frameworks)));
        output.push_str(&format!("Platforms: {}\n", join_or_dash(&info.platforms)));

        if !info.authors.is_empty() {
            output.push_str("\nAuthors\n");
            for author in &info.authors {
                let mut line = format!("  {}", author.name);
                if author.maintainer {
                    line.push_str(" (maintainer)");
                }
                if let Some(email) = &author.email {
                    line.push_str(&format!(" <{}>", email));
                }
                output.push_str(&line);
                output.push('\n');
            }
        }

        if !info.versions.is_empty() {
            output.push_str("\nVersions\n");
            for v in &info.versions {
                output.push_str(&format!("  {:<12} {}\n", v.version, v.date));
            }
        }
        output
    }

    fn to_compact(&self) -> String {
        let latest = self
            .0
            .versions
            .last()
            .map(|v| v.version.as_str())
            .unwrap_or("-");
        format!("{}:{} ({})", self.0.id, self.0.name, latest)
    }
}

/// Libraries changed by install or uninstall
#[derive(Debug, Clone, Serialize)]
pub struct LibraryChanges {
    pub action: String,
    pub libraries: Vec<ChangedLibrary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangedLibrary {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

impl From<&LibraryManifest> for ChangedLibrary {
    fn from(m: &LibraryManifest) -> Self {
        Self {
            name: m.name.clone(),
            version: m.version.clone(),
            id: m.id,
        }
    }
}

impl TableDisplay for LibraryChanges {
    fn to_table(&self) -> String {
        if self.libraries.is_empty() {
            return format!("Nothing {}", self.action);
        }
        let mut output = format!("{} {} libraries:\n", capitalize(&self.action), self.libraries.len());
        for lib in &self.libraries {
            output.push_str(&format!("  {} @ {}\n", lib.name, lib.version));
        }
        output
    }

    fn to_compact(&self) -> String {
        let names: Vec<String> = self
            .libraries
            .iter()
            .map(|l| format!("{}@{}", l.name, l.version))
            .collect();
        format!("{}: {}", self.action, names.join(", "))
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Result of `lib update`
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub libraries: Vec<UpdateStatus>,
}

impl TableDisplay for UpdateReport {
    fn to_table(&self) -> String {
        if self.libraries.is_empty() {
            return "No libraries installed".to_string();
        }

        let mut output = String::new();
        for status in &self.libraries {
            let state = match status.state {
                UpdateState::UpToDate => "Up-to-date".to_string(),
                UpdateState::Outdated => format!(
                    "Out-of-date (latest {})",
                    status.latest.as_deref().unwrap_or("?")
                ),
                UpdateState::Updated => format!(
                    "Updated to {}",
                    status.latest.as_deref().unwrap_or("?")
                ),
                UpdateState::Skipped => "Skipped (not from registry)".to_string(),
            };
            output.push_str(&format!(
                "{:<30} {:<12} {}\n",
                status.name, status.current, state
            ));
        }
        output
    }
}

/// Board catalog listing
#[derive(Debug, Clone, Serialize)]
pub struct BoardList {
    pub boards: Vec<Board>,
}

impl TableDisplay for BoardList {
    fn to_table(&self) -> String {
        if self.boards.is_empty() {
            return "No boards found".to_string();
        }

        let mut output = format!(
            "{:<24} {:<14} {:<8} {:<8} {:<8} {}\n",
            "ID", "MCU", "Frequency", "Flash", "RAM", "Name"
        );
        output.push_str(&format!("{}\n", "─".repeat(80)));
        for board in &self.boards {
            output.push_str(&format!(
                "{:<24} {:<14} {:<8} {:<8} {:<8} {}\n",
                board.id,
                board.mcu,
                format!("{}MHz", board.fcpu / 1_000_000),
                format_size(board.rom),
                format_size(board.ram),
                board.name
            ));
        }
        output
    }

    fn to_compact(&self) -> String {
        self.boards
            .iter()
            .map(|b| b.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Application settings listing
#[derive(Debug, Clone, Serialize)]
pub struct SettingsList {
    pub settings: Vec<SettingEntry>,
}

impl TableDisplay for SettingsList {
    fn to_table(&self) -> String {
        let mut output = String::new();
        for entry in &self.settings {
            let value = if entry.value { "Yes" } else { "No" };
            let marker = if entry.value != entry.default { " *" } else { "" };
            output.push_str(&format!(
                "{:<16} {:<5}{}  {}\n",
                entry.name, value, marker, entry.description
            ));
        }
        output
    }

    fn to_compact(&self) -> String {
        self.settings
            .iter()
            .map(|e| format!("{}={}", e.name, e.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Result of a ci run
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct CiSummary(pub CiReport);

impl TableDisplay for CiSummary {
    fn to_table(&self) -> String {
        let mut output = format!("Built environments: {}\n", self.0.environments.join(", "));
        if self.0.kept {
            output.push_str(&format!("Build directory: {}\n", self.0.build_dir.display()));
        }
        output
    }

    fn to_compact(&self) -> String {
        format!("ok: {}", self.0.environments.join(","))
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RepoVersion;

    #[test]
    fn test_search_output_table() {
        let result = SearchResult {
            total: 12,
            page: 1,
            perpage: 10,
            items: vec![LibrarySearchItem {
                id: 1,
                name: "OneWire".to_string(),
                description: "Access 1-wire devices".to_string(),
                frameworks: vec!["arduino".to_string()],
                ..Default::default()
            }],
        };

        let output = SearchOutput::new("onewire", result);
        let table = output.to_table();
        assert!(table.contains("[ID:1] OneWire"));
        assert!(table.contains("Compatible frameworks: arduino"));
        assert!(table.contains("--page 2"));
        assert_eq!(output.to_compact(), "1:OneWire");
    }

    #[test]
    fn test_library_changes_empty() {
        let changes = LibraryChanges {
            action: "installed".to_string(),
            libraries: Vec::new(),
        };
        assert_eq!(changes.to_table(), "Nothing installed");
    }

    #[test]
    fn test_library_details_compact() {
        let details = LibraryDetails(LibraryInfo {
            id: 7,
            name: "Servo".to_string(),
            versions: vec![RepoVersion::new("1.1.2", "2017-01-01T00:00:00Z")],
            ..Default::default()
        });
        assert_eq!(details.to_compact(), "7:Servo (1.1.2)");
        assert!(details.to_table().contains("#ID: 7"));
    }

    #[test]
    fn test_update_report_states() {
        let report = UpdateReport {
            libraries: vec![UpdateStatus {
                name: "OneWire".to_string(),
                current: "2.3.1".to_string(),
                latest: Some("2.3.2".to_string()),
                state: UpdateState::Outdated,
            }],
        };
        assert!(report.to_table().contains("Out-of-date (latest 2.3.2)"));
    }

    #[test]
    fn test_board_list_table() {
        let mut board = Board::new("uno", "Arduino Uno", "atmelavr").with_mcu("atmega328p");
        board.fcpu = 16_000_000;
        board.rom = 32256;
        board.ram = 2048;

        let table = BoardList { boards: vec![board] }.to_table();
        assert!(table.contains("16MHz"));
        assert!(table.contains("31kB"));
        assert!(table.contains("2kB"));
    }

    #[test]
    fn test_message_display() {
        let msg = Message {
            message: "Operation completed".to_string(),
            success: true,
        };

        assert!(msg.to_table().starts_with('✓'));
    }
}
