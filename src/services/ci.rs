//! Continuous integration builds
//!
//! Turns loose source files into a throwaway project: sources and libraries
//! are copied into a build directory, build environments are generated from
//! board ids (or a given `platformio.ini`), the project is built and the
//! directory removed again.

use crate::domain::{ProjectConf, ProjectEnv, PROJECT_CONF_NAME};
use crate::error::CiError;
use crate::registry::Registry;
use crate::services::archive::copy_tree;
use crate::services::build::BuildRunner;

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding colon-delimited sources
pub const CI_SRC_ENV: &str = "PLATFORMIO_CI_SRC";

const TEMP_PREFIX: &str = "pioctl-ci-";

/// Options of one ci run
#[derive(Debug, Clone, Default)]
pub struct CiOptions {
    /// Source paths or globs
    pub sources: Vec<String>,
    /// Library paths or globs
    pub libs: Vec<String>,
    /// Globs relative to the build directory to remove before building
    pub excludes: Vec<String>,
    /// Board ids to generate environments for
    pub boards: Vec<String>,
    /// Explicit build directory, a temporary one otherwise
    pub build_dir: Option<PathBuf>,
    pub keep_build_dir: bool,
    /// Existing project configuration to use
    pub project_conf: Option<PathBuf>,
    pub verbose: bool,
}

impl CiOptions {
    /// Split a `PLATFORMIO_CI_SRC` value
    pub fn sources_from_env(value: &str) -> Vec<String> {
        value
            .split(':')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Result of a successful ci run
#[derive(Debug, Clone, Serialize)]
pub struct CiReport {
    pub build_dir: PathBuf,
    /// Whether the build directory still exists
    pub kept: bool,
    /// Environments that were built
    pub environments: Vec<String>,
}

/// Runs ci builds against a board catalog and a build backend
pub struct CiRunner<'a, R: Registry, B: BuildRunner> {
    registry: &'a R,
    builder: &'a B,
}

impl<'a, R: Registry, B: BuildRunner> CiRunner<'a, R, B> {
    pub fn new(registry: &'a R, builder: &'a B) -> Self {
        Self { registry, builder }
    }

    /// Prepare, build and clean up
    pub fn run(&self, opts: &CiOptions) -> Result<CiReport, CiError> {
        if opts.sources.is_empty() {
            return Err(CiError::MissingSource);
        }

        let build_dir = match &opts.build_dir {
            Some(dir) => {
                clean_dir(dir)?;
                dir.clone()
            }
            None => tempfile::Builder::new()
                .prefix(TEMP_PREFIX)
                .tempdir()?
                .keep(),
        };
        log::info!("Build directory: {}", build_dir.display());

        let result = self.process(&build_dir, opts);

        if !opts.keep_build_dir {
            if let Err(e) = fs::remove_dir_all(&build_dir) {
                log::warn!("Failed to remove {}: {}", build_dir.display(), e);
            }
        }

        let environments = result?;
        Ok(CiReport {
            build_dir,
            kept: opts.keep_build_dir,
            environments,
        })
    }

    fn process(&self, build_dir: &Path, opts: &CiOptions) -> Result<Vec<String>, CiError> {
        copy_contents(&build_dir.join("lib"), &expand_patterns(&opts.libs)?)?;
        copy_contents(&build_dir.join("src"), &expand_patterns(&opts.sources)?)?;

        let conf_path = build_dir.join(PROJECT_CONF_NAME);
        match &opts.project_conf {
            Some(conf) if conf.is_file() => {
                fs::copy(conf, &conf_path)?;
            }
            Some(conf) if opts.boards.is_empty() => {
                log::warn!("Project configuration {} does not exist", conf.display());
                return Err(CiError::BuildEnvsEmpty);
            }
            Some(conf) => {
                log::warn!("Project configuration {} does not exist", conf.display());
            }
            None if opts.boards.is_empty() => return Err(CiError::BuildEnvsEmpty),
            None => {}
        }

        exclude_contents(build_dir, &opts.excludes)?;
        let environments = self.init_project(build_dir, &opts.boards)?;

        self.builder.build(build_dir, opts.verbose)?;
        Ok(environments)
    }

    /// Ensure the project layout and add an environment per board
    fn init_project(&self, build_dir: &Path, boards: &[String]) -> Result<Vec<String>, CiError> {
        fs::create_dir_all(build_dir.join("src"))?;
        fs::create_dir_all(build_dir.join("lib"))?;

        let conf_path = build_dir.join(PROJECT_CONF_NAME);
        let mut conf = if conf_path.is_file() {
            ProjectConf::parse(&fs::read_to_string(&conf_path)?)
        } else {
            ProjectConf::new()
        };

        for id in boards {
            let board = self
                .registry
                .board(id)?
                .ok_or_else(|| CiError::UnknownBoard(id.clone()))?;
            if conf.add_env(&ProjectEnv::from_board(&board)) {
                log::debug!("Added environment for board {}", board.id);
            }
        }

        fs::write(&conf_path, conf.as_str())?;
        Ok(conf.env_names())
    }
}

/// Remove and recreate a directory
fn clean_dir(dir: &Path) -> Result<(), CiError> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Expand path globs; a pattern matching nothing is an error
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>, CiError> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matches = glob_paths(pattern)?;
        if matches.is_empty() {
            return Err(CiError::InvalidPattern {
                pattern: pattern.clone(),
                reason: "no such file or directory".to_string(),
            });
        }
        paths.extend(matches);
    }
    Ok(paths)
}

fn glob_paths(pattern: &str) -> Result<Vec<PathBuf>, CiError> {
    let entries = glob::glob(pattern).map_err(|e| CiError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => log::warn!("Skipping unreadable path: {}", e),
        }
    }
    paths.sort();
    Ok(paths)
}

/// Copy matched paths into `dst_dir`
///
/// A single directory copied into `src` becomes `src` itself. Loose files
/// copied into `lib` are grouped in a new sub-directory so they form one
/// library.
fn copy_contents(dst_dir: &Path, contents: &[PathBuf]) -> Result<(), CiError> {
    let (dirs, files): (Vec<&PathBuf>, Vec<&PathBuf>) = contents
        .iter()
        .filter(|p| p.exists())
        .partition(|p| p.is_dir());

    let dst_name = dst_dir.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    match dirs.as_slice() {
        [single] if dst_name == "src" => copy_tree(single, dst_dir)?,
        _ => {
            fs::create_dir_all(dst_dir)?;
            for dir in &dirs {
                let name = dir.file_name().unwrap_or(dir.as_os_str());
                copy_tree(dir, &dst_dir.join(name))?;
            }
        }
    }

    if files.is_empty() {
        return Ok(());
    }

    let files_dir = if dst_name == "lib" {
        fs::create_dir_all(dst_dir)?;
        tempfile::Builder::new()
            .prefix("lib")
            .tempdir_in(dst_dir)?
            .keep()
    } else {
        fs::create_dir_all(dst_dir)?;
        dst_dir.to_path_buf()
    };

    for file in files {
        if let Some(name) = file.file_name() {
            fs::copy(file, files_dir.join(name))?;
        }
    }
    Ok(())
}

/// Remove paths matching globs relative to `build_dir`
fn exclude_contents(build_dir: &Path, patterns: &[String]) -> Result<(), CiError> {
    let base = glob::Pattern::escape(&build_dir.to_string_lossy());
    for pattern in patterns {
        let full = format!("{}/{}", base.trim_end_matches('/'), pattern.trim_start_matches('/'));
        for path in glob_paths(&full)? {
            log::debug!("Excluding {}", path.display());
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else if path.exists() {
                fs::remove_file(&path)?;
            }
        }
    }
    Ok(())
}
