//! Package content handling
//!
//! Unpacks downloaded library archives (zip or gzip tarball) and copies
//! directory trees for local sources and ci projects.

use crate::error::PackageError;

use flate2::read::GzDecoder;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Detect the archive format from its magic bytes
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(b"PK\x05\x06") {
            Some(ArchiveKind::Zip)
        } else if bytes.starts_with(&[0x1f, 0x8b]) {
            Some(ArchiveKind::TarGz)
        } else {
            None
        }
    }
}

/// Unpack archive bytes into `dest`
///
/// `source` is only used in error messages.
pub fn unpack_archive(bytes: &[u8], dest: &Path, source: &str) -> Result<(), PackageError> {
    fs::create_dir_all(dest)?;

    match ArchiveKind::detect(bytes) {
        Some(ArchiveKind::Zip) => {
            let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
            log::debug!("Extracting {} zip entries from {}", archive.len(), source);
            archive.extract(dest)?;
        }
        Some(ArchiveKind::TarGz) => {
            let mut archive = tar::Archive::new(GzDecoder::new(Cursor::new(bytes)));
            for entry in archive.entries()? {
                let mut entry = entry?;
                log::debug!("unpacking: {}", entry.path()?.display());
                entry.unpack_in(dest)?;
            }
        }
        None => return Err(PackageError::InvalidArchive(source.to_string())),
    }

    Ok(())
}

/// Library root inside unpacked content
///
/// Archives usually wrap sources in one top-level directory; that directory
/// is the root then.
pub fn package_root(dir: &Path) -> io::Result<PathBuf> {
    let entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.file_name().is_some_and(|n| n != "__MACOSX"))
        .collect();

    match entries.as_slice() {
        [single] if single.is_dir() => Ok(single.clone()),
        _ => Ok(dir.to_path_buf()),
    }
}

/// Recursively copy `src` into `dst`, preserving symlinks on unix
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let target = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let link = fs::read_link(src)?;
    std::os::unix::fs::symlink(link, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::{FileOptions, ZipWriter};

    /// Build an in-memory zip archive
    pub(crate) fn make_zip(files: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            zip.start_file::<_, ()>(*name, FileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn make_tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_detect() {
        assert_eq!(ArchiveKind::detect(b"PK\x03\x04rest"), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::detect(&[0x1f, 0x8b, 0x08]), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::detect(b"<html>"), None);
    }

    #[test]
    fn test_unpack_zip_with_single_root() {
        let tmp = TempDir::new().unwrap();
        let bytes = make_zip(&[
            ("OneWire-2.3.2/OneWire.h", "#pragma once"),
            ("OneWire-2.3.2/library.json", "{\"name\": \"OneWire\"}"),
        ]);

        unpack_archive(&bytes, tmp.path(), "test.zip").unwrap();
        let root = package_root(tmp.path()).unwrap();
        assert!(root.ends_with("OneWire-2.3.2"));
        assert!(root.join("OneWire.h").is_file());
    }

    #[test]
    fn test_unpack_tar_gz_flat() {
        let tmp = TempDir::new().unwrap();
        let bytes = make_tar_gz(&[("Servo.h", "// servo"), ("src/Servo.cpp", "// impl")]);

        unpack_archive(&bytes, tmp.path(), "test.tar.gz").unwrap();
        let root = package_root(tmp.path()).unwrap();
        assert_eq!(root, tmp.path());
        assert!(root.join("src/Servo.cpp").is_file());
    }

    #[test]
    fn test_unpack_invalid() {
        let tmp = TempDir::new().unwrap();
        let result = unpack_archive(b"not an archive", tmp.path(), "https://x/y");
        assert!(matches!(result, Err(PackageError::InvalidArchive(s)) if s == "https://x/y"));
    }

    #[test]
    fn test_copy_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("nested/deep")).unwrap();
        fs::write(src.join("main.cpp"), "int main() {}").unwrap();
        fs::write(src.join("nested/deep/util.h"), "#pragma once").unwrap();

        let dst = tmp.path().join("dst");
        copy_tree(&src, &dst).unwrap();

        assert!(dst.join("main.cpp").is_file());
        assert_eq!(
            fs::read_to_string(dst.join("nested/deep/util.h")).unwrap(),
            "#pragma once"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_keeps_symlinks() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("real.h"), "x").unwrap();
        std::os::unix::fs::symlink("real.h", src.join("alias.h")).unwrap();

        let dst = tmp.path().join("dst");
        copy_tree(&src, &dst).unwrap();

        let meta = fs::symlink_metadata(dst.join("alias.h")).unwrap();
        assert!(meta.file_type().is_symlink());
    }
}
