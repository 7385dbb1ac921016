//! Library manager
//!
//! Installs, updates and removes libraries in a storage directory. Every
//! installed library directory carries a `.library.json` manifest describing
//! where it came from; registry libraries are identified by their numeric id.

use crate::domain::package::parse_registry_id;
use crate::domain::{
    is_newer, max_satisfying, normalize_dependencies, systype, LibraryFilters, LibraryManifest,
    PackageSpec, Requirement, MANIFEST_NAME,
};
use crate::error::{AppError, PackageError};
use crate::registry::{LibraryInfo, LibrarySearchItem, Registry, SearchResult};
use crate::services::archive::{copy_tree, package_root, unpack_archive};

use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Picks one library when a registry search is ambiguous
pub trait LibraryChooser {
    /// Return the id of the chosen item, `None` to abort
    fn choose(&self, items: &[LibrarySearchItem]) -> Option<u32>;
}

/// Non-interactive chooser: always the first item
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstChoice;

impl LibraryChooser for FirstChoice {
    fn choose(&self, items: &[LibrarySearchItem]) -> Option<u32> {
        let first = items.first()?;
        eprintln!("Automatically chose the first available library");
        Some(first.id)
    }
}

/// Asks on stdin until one of the listed ids is entered
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptChooser;

impl LibraryChooser for PromptChooser {
    fn choose(&self, items: &[LibrarySearchItem]) -> Option<u32> {
        let ids: Vec<String> = items.iter().map(|i| i.id.to_string()).collect();
        let stdin = std::io::stdin();
        let mut input = stdin.lock();

        loop {
            eprint!("Please choose library ID ({}): ", ids.join(", "));
            let _ = std::io::stderr().flush();

            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            }

            let answer = line.trim();
            if ids.iter().any(|id| id == answer) {
                return answer.parse().ok();
            }
            eprintln!("Error: '{}' is not one of {}", answer, ids.join(", "));
        }
    }
}

/// An installed library and its location
#[derive(Debug, Clone, Serialize)]
pub struct InstalledLibrary {
    pub manifest: LibraryManifest,
    pub path: PathBuf,
}

/// Outcome of checking one library for updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateState {
    UpToDate,
    Outdated,
    Updated,
    /// Not installed from the registry
    Skipped,
}

/// Update result for one library
#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatus {
    pub name: String,
    pub current: String,
    pub latest: Option<String>,
    pub state: UpdateState,
}

/// Library manager over a storage directory
pub struct LibraryManager<'a, R: Registry> {
    registry: &'a R,
    storage_dir: PathBuf,
    chooser: Box<dyn LibraryChooser + 'a>,
    silent: bool,
}

impl<'a, R: Registry> LibraryManager<'a, R> {
    /// Create a manager storing libraries in `storage_dir`
    pub fn new(registry: &'a R, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            storage_dir: storage_dir.into(),
            chooser: Box::new(FirstChoice),
            silent: false,
        }
    }

    /// Builder: set how ambiguous searches are resolved
    pub fn with_chooser(mut self, chooser: impl LibraryChooser + 'a) -> Self {
        self.chooser = Box::new(chooser);
        self
    }

    /// Builder: suppress progress messages
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Storage directory
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn say(&self, message: impl AsRef<str>) {
        if !self.silent {
            eprintln!("{}", message.as_ref());
        }
    }

    /// Query the registry directly
    pub fn search(&self, query: &str, page: u32) -> Result<SearchResult, AppError> {
        Ok(self.registry.search(query, page)?)
    }

    /// Find exactly one registry library for the filters
    pub fn search_for_library(&self, filters: &LibraryFilters) -> Result<LibrarySearchItem, AppError> {
        self.say(format!("Looking for {} library in registry", filters.name));

        let result = self.registry.search(&filters.search_query(), 1)?;
        let lib_info = match result.items.len() {
            0 => None,
            1 if result.total <= 1 => result.items.into_iter().next(),
            _ => {
                eprintln!(
                    "Conflict: More than one library has been found by request {}:",
                    filters
                );
                for item in &result.items {
                    eprintln!("  #{:<6} {}  {}", item.id, item.name, item.description);
                }
                self.chooser
                    .choose(&result.items)
                    .and_then(|id| result.items.into_iter().find(|i| i.id == id))
            }
        };

        let lib_info = lib_info.ok_or_else(|| PackageError::LibNotFound(filters.to_string()))?;
        self.say(format!("Found: {}", lib_info.show_url()));
        Ok(lib_info)
    }

    /// Registry id for a library name or `id=<n>`
    pub fn get_pkg_id_by_name(&self, name: &str, requirements: Option<&str>) -> Result<u32, AppError> {
        if let Some(id) = parse_registry_id(name) {
            return Ok(id);
        }

        if let Some(installed) = self.get_installed_dir(name, requirements, None)? {
            if let Some(id) = installed.manifest.id {
                return Ok(id);
            }
        }

        Ok(self.search_for_library(&LibraryFilters::by_name(name))?.id)
    }

    /// Best registry version of a library name (or `id=<n>`) for the requirements
    pub fn get_latest_repo_version(
        &self,
        name: &str,
        requirements: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        let id = self.get_pkg_id_by_name(name, requirements)?;
        let versions = self.registry.versions(id)?;
        let requirement = Requirement::parse(requirements);
        Ok(max_satisfying(&versions, &requirement).map(|v| v.version.clone()))
    }

    /// All installed libraries sorted by name
    pub fn installed(&self) -> Result<Vec<InstalledLibrary>, PackageError> {
        if !self.storage_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut libs = Vec::new();
        for entry in std::fs::read_dir(&self.storage_dir)? {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if hidden || !path.join(MANIFEST_NAME).is_file() {
                continue;
            }

            match LibraryManifest::load(&path) {
                Ok(manifest) => libs.push(InstalledLibrary { manifest, path }),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }

        libs.sort_by(|a, b| {
            a.manifest
                .name
                .to_lowercase()
                .cmp(&b.manifest.name.to_lowercase())
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(libs)
    }

    /// Installed library for a source url, or by name (or `id=<n>`) and requirements
    ///
    /// A url identifies the library on its own: the stored name comes from
    /// the package metadata and may differ from the url base name.
    pub fn get_installed_dir(
        &self,
        name: &str,
        requirements: Option<&str>,
        url: Option<&str>,
    ) -> Result<Option<InstalledLibrary>, PackageError> {
        if let Some(url) = url {
            return Ok(self
                .installed()?
                .into_iter()
                .find(|lib| lib.manifest.url.as_deref() == Some(url)));
        }

        let id = parse_registry_id(name);
        let requirement = Requirement::parse(requirements);
        Ok(self.installed()?.into_iter().find(|lib| {
            let same_lib = match id {
                Some(id) => lib.manifest.id == Some(id),
                None => lib.manifest.name.eq_ignore_ascii_case(name),
            };
            same_lib && requirement.matches(&lib.manifest.version)
        }))
    }

    /// Install a library and its dependencies
    ///
    /// Returns the manifests of all newly installed libraries; an already
    /// installed library yields an empty list.
    pub fn install(
        &self,
        text: &str,
        requirements: Option<&str>,
    ) -> Result<Vec<LibraryManifest>, AppError> {
        std::fs::create_dir_all(&self.storage_dir)?;
        let mut installed = Vec::new();
        self.install_into(text, requirements, &mut installed)?;
        Ok(installed)
    }

    fn install_into(
        &self,
        text: &str,
        requirements: Option<&str>,
        installed: &mut Vec<LibraryManifest>,
    ) -> Result<(), AppError> {
        let spec = PackageSpec::parse(text, requirements)?;
        let reqs = spec.requirements.as_deref();

        let name = match &spec.url {
            Some(_) => spec.name.clone(),
            None => format!("id={}", self.get_pkg_id_by_name(&spec.name, reqs)?),
        };

        if let Some(existing) = self.get_installed_dir(&name, reqs, spec.url.as_deref())? {
            self.say(format!(
                "{} @ {} is already installed",
                existing.manifest.name, existing.manifest.version
            ));
            return Ok(());
        }

        let manifest = match (&spec.url, parse_registry_id(&name)) {
            (Some(url), _) => self.install_from_url(&spec.name, url, reqs)?,
            (None, Some(id)) => self.install_from_registry(id, reqs)?,
            (None, None) => return Err(PackageError::LibNotFound(spec.name.clone()).into()),
        };

        let dependencies = normalize_dependencies(&manifest.dependencies);
        installed.push(manifest);
        if dependencies.is_empty() {
            return Ok(());
        }

        self.say("Installing dependencies");
        for filters in dependencies {
            match filters.version.as_deref() {
                Some(source) if filters.is_external_source() => {
                    self.install_into(&format!("{}={}", filters.name, source), None, installed)?;
                }
                version => {
                    let lib_info = self.search_for_library(&filters)?;
                    self.install_into(&lib_info.id.to_string(), version, installed)?;
                }
            }
        }

        Ok(())
    }

    fn install_from_registry(
        &self,
        id: u32,
        requirements: Option<&str>,
    ) -> Result<LibraryManifest, AppError> {
        let name = format!("id={}", id);
        let version = self.get_latest_repo_version(&name, requirements)?.ok_or_else(|| {
            PackageError::UndefinedPackageVersion {
                requirements: requirements.unwrap_or("latest").to_string(),
                systype: systype(),
            }
        })?;

        let url = self.registry.download_url(id, &version)?;
        log::info!("Installing id={} @ {} from {}", id, version, url);

        let staging = self.staging_dir()?;
        let content = staging.path().join("content");
        let secure = match url.strip_prefix("http://") {
            Some(rest) => format!("https://{}", rest),
            None => url.clone(),
        };

        match self.unpack_from_url(&secure, &content) {
            Err(PackageError::Registry(e)) if secure != url => {
                log::warn!("Secure download failed ({}), retrying with {}", e, url);
                if content.exists() {
                    std::fs::remove_dir_all(&content)?;
                }
                self.unpack_from_url(&url, &content)?;
            }
            other => other?,
        }

        let root = package_root(&content)?;
        let mut manifest = LibraryManifest::from_source_dir(&root)?.unwrap_or_default();
        if manifest.name.is_empty() {
            manifest.name = self.registry.info(id)?.name;
        }
        manifest.id = Some(id);
        manifest.version = version;
        manifest.url = None;

        Ok(self.store_package(&root, manifest)?)
    }

    fn install_from_url(
        &self,
        name: &str,
        url: &str,
        requirements: Option<&str>,
    ) -> Result<LibraryManifest, AppError> {
        log::info!("Installing {} from {}", name, url);

        let staging = self.staging_dir()?;
        let content = staging.path().join("content");
        self.unpack_from_url(url, &content)?;

        let root = package_root(&content)?;
        let mut manifest = LibraryManifest::from_source_dir(&root)?.unwrap_or_default();
        if manifest.name.is_empty() {
            manifest.name = name.to_string();
        }
        if manifest.version.is_empty() {
            manifest.version = requirements
                .filter(|r| crate::domain::parse_partial(r).is_some())
                .unwrap_or("0.0.0")
                .to_string();
        }
        manifest.id = None;
        manifest.url = Some(url.to_string());

        Ok(self.store_package(&root, manifest)?)
    }

    fn staging_dir(&self) -> Result<tempfile::TempDir, PackageError> {
        Ok(tempfile::Builder::new()
            .prefix(".pioctl-")
            .tempdir_in(&self.storage_dir)?)
    }

    fn unpack_from_url(&self, url: &str, dest: &Path) -> Result<(), PackageError> {
        if let Some(local) = url.strip_prefix("file://") {
            let local = Path::new(local);
            if local.is_dir() {
                copy_tree(local, dest)?;
                return Ok(());
            }
        }

        let bytes = self.registry.fetch(url)?;
        unpack_archive(&bytes, dest, url)
    }

    /// Move unpacked sources into the storage directory and write the manifest
    fn store_package(
        &self,
        root: &Path,
        manifest: LibraryManifest,
    ) -> Result<LibraryManifest, PackageError> {
        let dir_name = sanitize_dir_name(&manifest.name);
        let mut target = self.storage_dir.join(&dir_name);

        if target.exists() && !holds_version(&target, &manifest.version) {
            target = self
                .storage_dir
                .join(format!("{}@{}", dir_name, sanitize_dir_name(&manifest.version)));
            if target.exists() && !holds_version(&target, &manifest.version) {
                return Err(PackageError::DirectoryOccupied(target));
            }
        }
        if target.exists() {
            std::fs::remove_dir_all(&target)?;
        }

        std::fs::rename(root, &target)?;
        manifest.save(&target)?;
        self.say(format!(
            "{} @ {} has been successfully installed",
            manifest.name, manifest.version
        ));
        Ok(manifest)
    }

    /// Remove an installed library
    pub fn uninstall(&self, text: &str) -> Result<InstalledLibrary, AppError> {
        let spec = PackageSpec::parse(text, None)?;
        let lib = self
            .get_installed_dir(&spec.name, spec.requirements.as_deref(), spec.url.as_deref())?
            .ok_or_else(|| PackageError::NotInstalled(text.to_string()))?;

        std::fs::remove_dir_all(&lib.path)?;
        self.say(format!(
            "{} @ {} has been successfully uninstalled",
            lib.manifest.name, lib.manifest.version
        ));
        Ok(lib)
    }

    /// Check installed libraries for newer registry versions
    ///
    /// With `only_check` nothing is changed; otherwise outdated libraries
    /// are replaced by the latest version.
    pub fn update(&self, names: &[String], only_check: bool) -> Result<Vec<UpdateStatus>, AppError> {
        let libs = if names.is_empty() {
            self.installed()?
        } else {
            let mut libs = Vec::with_capacity(names.len());
            for text in names {
                let spec = PackageSpec::parse(text, None)?;
                let lib = self
                    .get_installed_dir(&spec.name, spec.requirements.as_deref(), spec.url.as_deref())?
                    .ok_or_else(|| PackageError::NotInstalled(text.clone()))?;
                libs.push(lib);
            }
            libs
        };

        let mut statuses = Vec::with_capacity(libs.len());
        for lib in libs {
            statuses.push(self.update_one(lib, only_check)?);
        }
        Ok(statuses)
    }

    fn update_one(&self, lib: InstalledLibrary, only_check: bool) -> Result<UpdateStatus, AppError> {
        let mut status = UpdateStatus {
            name: lib.manifest.name.clone(),
            current: lib.manifest.version.clone(),
            latest: None,
            state: UpdateState::Skipped,
        };

        let Some(id) = lib.manifest.id else {
            log::info!("{} was not installed from the registry, skipping", status.name);
            return Ok(status);
        };

        let pkg_name = format!("id={}", id);
        status.latest = self.get_latest_repo_version(&pkg_name, None)?;
        let latest = match status.latest.clone() {
            Some(latest) if is_newer(&status.current, &latest) => latest,
            _ => {
                status.state = UpdateState::UpToDate;
                return Ok(status);
            }
        };

        if only_check {
            status.state = UpdateState::Outdated;
            return Ok(status);
        }

        self.say(format!("Updating {} @ {} to {}", status.name, status.current, latest));
        let backup = backup_path(&lib.path);
        std::fs::rename(&lib.path, &backup)?;

        let mut installed = Vec::new();
        match self.install_into(&pkg_name, Some(&latest), &mut installed) {
            Ok(()) => {
                std::fs::remove_dir_all(&backup)?;
                status.state = UpdateState::Updated;
                Ok(status)
            }
            Err(e) => {
                log::error!("Update of {} failed, restoring {}", status.name, status.current);
                if lib.path.exists() {
                    std::fs::remove_dir_all(&lib.path)?;
                }
                std::fs::rename(&backup, &lib.path)?;
                Err(e)
            }
        }
    }

    /// Registry details of a library
    pub fn show(&self, text: &str) -> Result<LibraryInfo, AppError> {
        let spec = PackageSpec::parse(text, None)?;
        let id = self.get_pkg_id_by_name(&spec.name, spec.requirements.as_deref())?;
        Ok(self.registry.info(id)?)
    }
}

fn sanitize_dir_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "library".to_string()
    } else {
        cleaned
    }
}

/// Whether `dir` is a managed library directory of exactly `version`
fn holds_version(dir: &Path, version: &str) -> bool {
    LibraryManifest::load(dir).is_ok_and(|m| m.version == version)
}

fn backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.bak", name))
}
