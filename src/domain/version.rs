//! Version requirement types
//!
//! Selects registry versions against user requirements. Registry versions
//! may be partial (`1.2`), so parsing pads missing components.

use chrono::NaiveDateTime;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Date format used by the registry for release dates
const REGISTRY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A single released version of a registry library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoVersion {
    /// Version string as published
    pub version: String,
    /// Release date, e.g. `2016-09-01T10:20:30Z`
    #[serde(default, alias = "released")]
    pub date: String,
}

impl RepoVersion {
    /// Create a new repo version entry
    pub fn new(version: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            date: date.into(),
        }
    }

    fn released_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, REGISTRY_DATE_FORMAT).ok()
    }
}

/// Parse a possibly partial version (`1`, `1.2`, `1.2.3-beta`)
///
/// Missing minor/patch components are treated as zero.
pub fn parse_partial(text: &str) -> Option<Version> {
    let text = text.trim().trim_start_matches('v');
    if let Ok(v) = Version::parse(text) {
        return Some(v);
    }

    let (core, rest) = match text.find(['-', '+']) {
        Some(pos) => text.split_at(pos),
        None => (text, ""),
    };

    let parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    if parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let mut padded = parts.join(".");
    for _ in parts.len()..3 {
        padded.push_str(".0");
    }
    padded.push_str(rest);

    Version::parse(&padded).ok()
}

/// Requirement on a library version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// No requirement: the newest release wins
    Any,
    /// Semantic version requirement (`^1.2`, `>=1.0,<2.0`, `1.2.3`)
    Spec(VersionReq),
    /// Requirement that is not a valid semver spec, compared verbatim
    Exact(String),
}

impl Requirement {
    /// Parse an optional requirement string
    ///
    /// A bare version (`1.2.3`) means exactly that version.
    pub fn parse(text: Option<&str>) -> Self {
        let text = match text.map(str::trim) {
            Some(t) if !t.is_empty() && t != "*" && t != "latest" => t,
            _ => return Requirement::Any,
        };

        let normalized = if text.starts_with(|c: char| c.is_ascii_digit()) {
            format!("={}", text)
        } else {
            text.to_string()
        };

        match VersionReq::parse(&normalized) {
            Ok(req) => Requirement::Spec(req),
            Err(_) => Requirement::Exact(text.to_string()),
        }
    }

    /// Check whether a version string satisfies this requirement
    pub fn matches(&self, version: &str) -> bool {
        match self {
            Requirement::Any => true,
            Requirement::Spec(req) => parse_partial(version)
                .map(|v| req.matches(&v))
                .unwrap_or(false),
            Requirement::Exact(text) => text == version,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Any => write!(f, "latest"),
            Requirement::Spec(req) => write!(f, "{}", req),
            Requirement::Exact(text) => write!(f, "{}", text),
        }
    }
}

/// Pick the best registry version for a requirement
///
/// - semver requirements pick the highest satisfying version
/// - verbatim requirements pick the first equal version string
/// - without requirements the most recently released version wins
pub fn max_satisfying<'a>(
    versions: &'a [RepoVersion],
    requirement: &Requirement,
) -> Option<&'a RepoVersion> {
    match requirement {
        Requirement::Spec(req) => {
            let mut best: Option<(Version, &RepoVersion)> = None;
            for v in versions {
                let Some(parsed) = parse_partial(&v.version) else {
                    continue;
                };
                if !req.matches(&parsed) {
                    continue;
                }
                if best.as_ref().map_or(true, |(current, _)| parsed > *current) {
                    best = Some((parsed, v));
                }
            }
            best.map(|(_, v)| v)
        }
        Requirement::Exact(text) => versions.iter().find(|v| &v.version == text),
        Requirement::Any => {
            let mut best: Option<&RepoVersion> = None;
            for v in versions {
                best = match best {
                    None => Some(v),
                    Some(current) => match (current.released_at(), v.released_at()) {
                        (Some(a), Some(b)) if b > a => Some(v),
                        (None, Some(_)) => Some(v),
                        _ => Some(current),
                    },
                };
            }
            best
        }
    }
}

/// Whether `candidate` is a newer release than `installed`
pub fn is_newer(installed: &str, candidate: &str) -> bool {
    match (parse_partial(installed), parse_partial(candidate)) {
        (Some(a), Some(b)) => b.cmp(&a) == Ordering::Greater,
        _ => installed != candidate,
    }
}
