//! Recursive directory copy used to relocate generated documentation.
//!
//! [`copy_tree`] copies the *contents* of a source directory into a
//! destination directory, merging into whatever is already there. Running it
//! twice with the same input leaves the destination exactly as one run would.

use crate::errors::DocflowError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Options controlling [`copy_tree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOptions {
    /// Remove everything inside the destination before copying.
    pub clear_destination: bool,
}

/// Summary of a completed copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyReport {
    /// Regular files written to the destination.
    pub files_copied: u64,
    /// Directories created, including the destination itself.
    pub dirs_created: u64,
    /// Total bytes written.
    pub bytes_copied: u64,
    /// Top-level entries removed from the destination before copying.
    pub entries_removed: u64,
}

impl CopyReport {
    /// Converts the report into stage output data.
    #[must_use]
    pub fn to_data(&self) -> HashMap<String, serde_json::Value> {
        let mut data = HashMap::new();
        data.insert("files_copied".to_string(), serde_json::json!(self.files_copied));
        data.insert("dirs_created".to_string(), serde_json::json!(self.dirs_created));
        data.insert("bytes_copied".to_string(), serde_json::json!(self.bytes_copied));
        data.insert("entries_removed".to_string(), serde_json::json!(self.entries_removed));
        data
    }
}

/// Copies the contents of `source` into `destination`.
///
/// The destination and its parents are created when missing. Existing files
/// are overwritten and existing directories merged; when
/// [`CopyOptions::clear_destination`] is set the destination is emptied
/// first. Symbolic links inside the source are followed. Symbolic links
/// inside the destination are replaced, never written through.
///
/// Overlapping trees are rejected before anything is created or removed.
///
/// # Errors
///
/// Returns [`DocflowError::MissingSource`] if `source` is not a directory,
/// [`DocflowError::Config`] if the two trees overlap, and
/// [`DocflowError::Io`] for any filesystem failure.
pub fn copy_tree(
    source: &Path,
    destination: &Path,
    options: CopyOptions,
) -> Result<CopyReport, DocflowError> {
    if !source.is_dir() {
        return Err(DocflowError::MissingSource(source.to_path_buf()));
    }
    if destination.exists() && !destination.is_dir() {
        return Err(DocflowError::io(
            destination,
            std::io::Error::new(std::io::ErrorKind::Other, "destination is not a directory"),
        ));
    }

    check_disjoint(source, destination, options)?;

    let mut report = CopyReport::default();

    if !destination.exists() {
        fs::create_dir_all(destination).map_err(|e| DocflowError::io(destination, e))?;
        report.dirs_created += 1;
    }

    if options.clear_destination {
        report.entries_removed = clear_dir(destination)?;
    }

    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            DocflowError::io(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| DocflowError::Internal(e.to_string()))?;
        let target = destination.join(relative);
        let existing = fs::symlink_metadata(&target).ok();

        if entry.file_type().is_dir() {
            match existing {
                Some(meta) if meta.is_dir() => {}
                Some(_) => {
                    fs::remove_file(&target).map_err(|e| DocflowError::io(&target, e))?;
                    fs::create_dir(&target).map_err(|e| DocflowError::io(&target, e))?;
                    report.dirs_created += 1;
                }
                None => {
                    fs::create_dir(&target).map_err(|e| DocflowError::io(&target, e))?;
                    report.dirs_created += 1;
                }
            }
        } else {
            match existing {
                Some(meta) if meta.is_dir() => {
                    fs::remove_dir_all(&target).map_err(|e| DocflowError::io(&target, e))?;
                }
                Some(meta) if meta.file_type().is_symlink() => {
                    fs::remove_file(&target).map_err(|e| DocflowError::io(&target, e))?;
                }
                _ => {}
            }
            let bytes = fs::copy(entry.path(), &target).map_err(|e| DocflowError::io(&target, e))?;
            debug!(from = %entry.path().display(), to = %target.display(), bytes, "Copied file");
            report.files_copied += 1;
            report.bytes_copied += bytes;
        }
    }

    Ok(report)
}

/// Removes every entry inside `dir`, keeping `dir` itself.
///
/// Returns the number of top-level entries removed.
///
/// # Errors
///
/// Returns [`DocflowError::Io`] if the directory cannot be read or an entry
/// cannot be removed.
pub fn clear_dir(dir: &Path) -> Result<u64, DocflowError> {
    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(|e| DocflowError::io(dir, e))? {
        let entry = entry.map_err(|e| DocflowError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| DocflowError::io(&path, e))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| DocflowError::io(&path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| DocflowError::io(&path, e))?;
        }
        removed += 1;
    }
    Ok(removed)
}

/// Rejects overlapping trees: copying into the source would recurse, and
/// clearing a destination that contains the source would delete it.
fn check_disjoint(
    source: &Path,
    destination: &Path,
    options: CopyOptions,
) -> Result<(), DocflowError> {
    let source = resolve(source)?;
    let destination = resolve(destination)?;

    if destination.starts_with(&source) {
        return Err(DocflowError::Config(format!(
            "destination {} lies inside source {}",
            destination.display(),
            source.display()
        )));
    }
    if options.clear_destination && source.starts_with(&destination) {
        return Err(DocflowError::Config(format!(
            "refusing to clear {} because it contains the source {}",
            destination.display(),
            source.display()
        )));
    }
    Ok(())
}

/// Absolute form of `path` with symlinks resolved for every component that
/// exists. Missing components are appended as written, so a destination can
/// be compared before it is created.
fn resolve(path: &Path) -> Result<PathBuf, DocflowError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| DocflowError::io(path, e))?
            .join(path)
    };

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => {
                resolved.push(other);
                if resolved.exists() {
                    resolved = resolved
                        .canonicalize()
                        .map_err(|e| DocflowError::io(&resolved, e))?;
                }
            }
        }
    }
    Ok(resolved)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    /// Relative path -> file contents (`None` for directories).
    fn snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
        WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|entry| {
                let entry = entry.unwrap();
                let rel = entry
                    .path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                let contents = entry
                    .file_type()
                    .is_file()
                    .then(|| fs::read(entry.path()).unwrap());
                (rel, contents)
            })
            .collect()
    }

    fn populate_source(root: &Path) {
        fs::create_dir_all(root.join("classes/Respectify")).unwrap();
        fs::write(root.join("index.md"), "# Index\n").unwrap();
        fs::write(root.join("classes/Respectify/Client.md"), "# Client\n").unwrap();
    }

    #[test]
    fn test_copy_creates_missing_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("docs");
        let destination = tmp.path().join("site/nested/php");
        populate_source(&source);

        let report = copy_tree(&source, &destination, CopyOptions::default()).unwrap();

        assert!(destination.is_dir());
        assert_eq!(report.files_copied, 2);
        assert_eq!(report.dirs_created, 3);
        assert_eq!(report.bytes_copied, 17);
        assert_eq!(snapshot(&source), snapshot(&destination));
    }

    #[test]
    fn test_copy_twice_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("docs");
        let destination = tmp.path().join("docs_ex/php");
        populate_source(&source);

        copy_tree(&source, &destination, CopyOptions::default()).unwrap();
        let after_first = snapshot(&destination);

        let second = copy_tree(&source, &destination, CopyOptions::default()).unwrap();
        assert_eq!(after_first, snapshot(&destination));
        assert_eq!(second.dirs_created, 0);
        assert_eq!(second.files_copied, 2);
    }

    #[test]
    fn test_copy_merges_without_clearing() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("docs");
        let destination = tmp.path().join("dest");
        populate_source(&source);
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("keep.md"), "kept").unwrap();
        fs::write(destination.join("index.md"), "stale").unwrap();

        let report = copy_tree(&source, &destination, CopyOptions::default()).unwrap();

        assert_eq!(report.entries_removed, 0);
        assert_eq!(fs::read_to_string(destination.join("keep.md")).unwrap(), "kept");
        assert_eq!(fs::read_to_string(destination.join("index.md")).unwrap(), "# Index\n");
    }

    #[test]
    fn test_copy_clears_destination_first() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("docs");
        let destination = tmp.path().join("dest");
        populate_source(&source);
        fs::create_dir_all(destination.join("old")).unwrap();
        fs::write(destination.join("old/page.md"), "old").unwrap();
        fs::write(destination.join("stale.md"), "stale").unwrap();

        let options = CopyOptions {
            clear_destination: true,
        };
        let report = copy_tree(&source, &destination, options).unwrap();

        assert_eq!(report.entries_removed, 2);
        assert_eq!(snapshot(&source), snapshot(&destination));
    }

    #[test]
    fn test_copy_replaces_file_with_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("docs");
        let destination = tmp.path().join("dest");
        populate_source(&source);
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("classes"), "was a file").unwrap();

        copy_tree(&source, &destination, CopyOptions::default()).unwrap();

        assert!(destination.join("classes/Respectify/Client.md").is_file());
    }

    #[test]
    fn test_missing_source_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = copy_tree(
            &tmp.path().join("nope"),
            &tmp.path().join("dest"),
            CopyOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, DocflowError::MissingSource(_)));
        assert!(!tmp.path().join("dest").exists());
    }

    #[test]
    fn test_destination_inside_source_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("docs");
        populate_source(&source);

        let destination = source.join("nested/copy");
        let err = copy_tree(&source, &destination, CopyOptions::default()).unwrap_err();

        assert!(matches!(err, DocflowError::Config(_)));
        assert!(!source.join("nested").exists());
    }

    #[test]
    fn test_overlap_through_parent_components_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("docs");
        populate_source(&source);

        let destination = tmp.path().join("missing/../docs/copy");
        let err = copy_tree(&source, &destination, CopyOptions::default()).unwrap_err();

        assert!(matches!(err, DocflowError::Config(_)));
        assert!(!source.join("copy").exists());
        assert!(!tmp.path().join("missing").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_destination_dir_is_replaced() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("docs");
        let destination = tmp.path().join("dest");
        let outside = tmp.path().join("outside");
        populate_source(&source);
        fs::create_dir_all(&destination).unwrap();
        fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, destination.join("classes")).unwrap();

        copy_tree(&source, &destination, CopyOptions::default()).unwrap();

        let classes = fs::symlink_metadata(destination.join("classes")).unwrap();
        assert!(classes.is_dir());
        assert!(destination.join("classes/Respectify/Client.md").is_file());
        assert!(!outside.join("Respectify").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_destination_file_is_replaced() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("docs");
        let destination = tmp.path().join("dest");
        let outside = tmp.path().join("outside.md");
        populate_source(&source);
        fs::create_dir_all(&destination).unwrap();
        fs::write(&outside, "untouched").unwrap();
        std::os::unix::fs::symlink(&outside, destination.join("index.md")).unwrap();

        copy_tree(&source, &destination, CopyOptions::default()).unwrap();

        assert_eq!(fs::read_to_string(&outside).unwrap(), "untouched");
        assert_eq!(
            fs::read_to_string(destination.join("index.md")).unwrap(),
            "# Index\n"
        );
    }

    #[test]
    fn test_clearing_parent_of_source_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("docs");
        populate_source(&source);

        let options = CopyOptions {
            clear_destination: true,
        };
        let err = copy_tree(&source, tmp.path(), options).unwrap_err();

        assert!(matches!(err, DocflowError::Config(_)));
        assert!(source.join("index.md").is_file());
    }

    #[test]
    fn test_clear_dir_keeps_root() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("c.txt"), "c").unwrap();

        assert_eq!(clear_dir(tmp.path()).unwrap(), 2);
        assert!(tmp.path().is_dir());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_report_to_data() {
        let report = CopyReport {
            files_copied: 2,
            dirs_created: 1,
            bytes_copied: 10,
            entries_removed: 0,
        };
        let data = report.to_data();
        assert_eq!(data.get("files_copied"), Some(&serde_json::json!(2)));
        assert_eq!(data.get("bytes_copied"), Some(&serde_json::json!(10)));
    }
}
