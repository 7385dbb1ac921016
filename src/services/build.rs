//! Build backend for scaffolded projects
//!
//! The actual compilation is delegated to an external build command.

use crate::error::CiError;

use std::path::Path;
use std::process::Command;

/// Builds a prepared project directory
pub trait BuildRunner {
    /// Build every environment of the project in `project_dir`
    fn build(&self, project_dir: &Path, verbose: bool) -> Result<(), CiError>;
}

/// Runs a configured command such as `pio run`
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    /// Create a runner from a command line split into words
    pub fn from_command(command: &[String]) -> Result<Self, CiError> {
        let (program, args) = command.split_first().ok_or_else(|| CiError::BuildSpawn {
            command: String::new(),
            reason: "build command is empty".to_string(),
        })?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BuildRunner for CommandRunner {
    fn build(&self, project_dir: &Path, verbose: bool) -> Result<(), CiError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--project-dir")
            .arg(project_dir)
            .current_dir(project_dir);
        if verbose {
            cmd.arg("-v");
        }

        log::info!("Running '{}' in {}", self.command_line(), project_dir.display());

        let status = cmd.status().map_err(|e| CiError::BuildSpawn {
            command: self.command_line(),
            reason: e.to_string(),
        })?;

        if !status.success() {
            return Err(CiError::BuildFailed {
                code: status.code(),
            });
        }

        Ok(())
    }
}
