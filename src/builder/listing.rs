//! Directory listing and entry classification.

use super::InclusionFilter;
use crate::error::DataError;
use crate::syslog::DiagnosticSink;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Extensions of files read as test data.
pub const PROCESSED_EXTENSIONS: &[&str] = &["html", "xhtml", "htm", "tsv"];
/// Basename of a directory's init file.
pub const INIT_FILE_STEM: &str = "__init__";
/// Prefixes of ignored files and directories.
pub const IGNORED_PREFIXES: &[char] = &['_', '.'];
/// Directory names that are never descended into.
pub const IGNORED_DIRS: &[&str] = &["CVS"];

/// Split a lower-cased file name into its stem and extension.
fn stem_and_extension(lower: &str) -> (&str, Option<&str>) {
    let path = Utf8Path::new(lower);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => (stem, Some(ext)),
        _ => (lower, None),
    }
}

fn is_processed(ext: Option<&str>) -> bool {
    ext.is_some_and(|e| PROCESSED_EXTENSIONS.contains(&e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    InitFile,
    Ignored,
    Child,
}

fn classify(name: &str, path: &Utf8Path, filter: &InclusionFilter) -> EntryKind {
    let lower = name.to_lowercase();
    let (stem, ext) = stem_and_extension(&lower);
    if path.is_file() && stem == INIT_FILE_STEM && is_processed(ext) {
        return EntryKind::InitFile;
    }
    if name.starts_with(IGNORED_PREFIXES) {
        return EntryKind::Ignored;
    }
    if path.is_dir() {
        return if IGNORED_DIRS.contains(&name) {
            EntryKind::Ignored
        } else {
            EntryKind::Child
        };
    }
    if is_processed(ext) && filter.includes(stem) {
        EntryKind::Child
    } else {
        EntryKind::Ignored
    }
}

/// Classified content of a suite directory.
#[derive(Debug, Default)]
pub(super) struct DirectoryListing {
    pub(super) init_file: Option<Utf8PathBuf>,
    pub(super) children: Vec<Utf8PathBuf>,
}

fn read_error(dir: &Utf8Path, err: walkdir::Error) -> DataError {
    DataError::Read {
        path: dir.to_path_buf(),
        source: io::Error::from(err),
    }
}

/// List `dir` in case-insensitive name order and classify each entry.
pub(super) fn list_directory(
    dir: &Utf8Path,
    filter: &InclusionFilter,
    sink: &mut dyn DiagnosticSink,
) -> Result<DirectoryListing, DataError> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_key(|entry| entry.file_name().to_string_lossy().to_lowercase());
    let mut listing = DirectoryListing::default();
    for walk_entry in walker {
        let entry = walk_entry.map_err(|err| read_error(dir, err))?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            sink.info(&format!(
                "Ignoring file or directory '{}'",
                entry.file_name().to_string_lossy()
            ));
            continue;
        };
        let path = dir.join(&name);
        match classify(&name, &path, filter) {
            EntryKind::InitFile if listing.init_file.is_none() => listing.init_file = Some(path),
            EntryKind::InitFile => {
                sink.error(&format!("Ignoring second test suite init file '{path}'"));
            }
            EntryKind::Ignored => sink.info(&format!("Ignoring file or directory '{name}'")),
            EntryKind::Child => listing.children.push(path),
        }
    }
    Ok(listing)
}

/// Make `path` absolute and lexically normalised.
///
/// # Errors
///
/// Returns [`DataError::NonUtf8Path`] for paths that are not UTF-8 and
/// [`DataError::Read`] when the working directory is unavailable.
pub fn normalize_source(path: &Path) -> Result<Utf8PathBuf, DataError> {
    let absolute = std::path::absolute(path).map_err(|source| DataError::Read {
        path: Utf8PathBuf::from(path.to_string_lossy().into_owned()),
        source,
    })?;
    let utf8 = Utf8PathBuf::from_path_buf(absolute)
        .map_err(|original| DataError::NonUtf8Path { path: original })?;
    let mut normalized = Utf8PathBuf::new();
    for component in utf8.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_str()),
        }
    }
    Ok(normalized)
}
