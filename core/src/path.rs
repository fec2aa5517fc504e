//! Mapping between filesystem paths and archive entry names.
//!
//! Entry names are always relative, `/`-separated, and directories carry a
//! trailing `/`. The source root itself never appears in a name.

use crate::{Error, Result};
use rand::RngCore;
use rand::rngs::OsRng;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Random bytes behind a generated extraction root name.
const RANDOM_NAME_BYTES: usize = 16;

/// Attempts at finding an unused random name before taking the last candidate.
const RANDOM_NAME_ATTEMPTS: usize = 8;

/// Converts `path` into the entry name it has inside an archive of `root`.
pub fn archive_entry_name(path: &Path, root: &Path, is_dir: bool) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| Error::PrefixMismatch {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| Error::NonUtf8Path {
                    path: path.to_path_buf(),
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(Error::PrefixMismatch {
                    path: path.to_path_buf(),
                    root: root.to_path_buf(),
                });
            }
        }
    }

    if parts.is_empty() {
        return Err(Error::PrefixMismatch {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        });
    }

    let mut name = parts.join("/");
    if is_dir {
        name.push('/');
    }
    Ok(name)
}

/// Resolves an archive entry name to its location under `root`.
///
/// Names are split on `/` only; any other character, `\` included, belongs to
/// the component. Absolute names and names climbing out through `..` are
/// rejected, as is any component the host would not treat as a plain file name.
pub fn resolve_entry_path(root: &Path, name: &str) -> Result<PathBuf> {
    let unsafe_entry = || Error::UnsafeEntryPath {
        name: name.to_string(),
    };

    if name.contains('\0') || name.starts_with('/') {
        return Err(unsafe_entry());
    }

    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;
    for part in name.split('/') {
        match part {
            "" | "." => {}
            ".." => return Err(unsafe_entry()),
            part => {
                let mut components = Path::new(part).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => {}
                    _ => return Err(unsafe_entry()),
                }
                resolved.push(part);
                depth += 1;
            }
        }
    }

    if depth == 0 {
        return Err(unsafe_entry());
    }
    Ok(resolved)
}

/// Picks where the archive of `source_root` is written.
///
/// An existing `dest_hint` is used as given. Otherwise the archive sits next to
/// the source directory as `<name>.<extension>`.
pub fn archive_destination(
    source_root: &Path,
    dest_hint: Option<&Path>,
    extension: &str,
) -> Result<PathBuf> {
    if let Some(hint) = dest_hint {
        match std::fs::symlink_metadata(hint) {
            Ok(_) => return Ok(hint.to_path_buf()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(
                    "Destination {} does not exist, deriving archive name",
                    hint.display()
                );
            }
            Err(e) => return Err(Error::io(hint, e)),
        }
    }

    // ".", "foo/.." and the like only get a name once resolved.
    let resolved;
    let source_root = if source_root.file_name().is_some() {
        source_root
    } else {
        resolved = std::fs::canonicalize(source_root).map_err(|e| Error::io(source_root, e))?;
        resolved.as_path()
    };

    let name = source_root
        .file_name()
        .ok_or_else(|| {
            Error::io(
                source_root,
                io::Error::new(
                    ErrorKind::InvalidInput,
                    "source directory has no name to derive the archive name from",
                ),
            )
        })?
        .to_str()
        .ok_or_else(|| Error::NonUtf8Path {
            path: source_root.to_path_buf(),
        })?;
    let parent = source_root.parent().unwrap_or_else(|| Path::new(""));

    Ok(parent.join(format!("{}.{}", name, extension)))
}

/// Derives the directory an archive is extracted into.
///
/// The extension is stripped from the archive's file name. When nothing is left,
/// a random hex name is generated instead.
pub fn extraction_root(archive: &Path, extension: &str) -> Result<PathBuf> {
    let unsupported = |reason: String| Error::UnsupportedFormat {
        path: archive.to_path_buf(),
        reason,
    };

    let file_name = archive
        .file_name()
        .ok_or_else(|| unsupported("archive path has no file name".to_string()))?
        .to_str()
        .ok_or_else(|| Error::NonUtf8Path {
            path: archive.to_path_buf(),
        })?;

    let stem = file_name
        .strip_suffix(&format!(".{}", extension))
        .ok_or_else(|| unsupported(format!("expected a .{} file", extension)))?;

    let parent = archive.parent().unwrap_or_else(|| Path::new(""));

    if !stem.is_empty() {
        return Ok(parent.join(stem));
    }

    let mut candidate = parent.join(random_name());
    for _ in 1..RANDOM_NAME_ATTEMPTS {
        if std::fs::symlink_metadata(&candidate).is_err() {
            break;
        }
        debug!("Random name {} already taken, rolling again", candidate.display());
        candidate = parent.join(random_name());
    }
    Ok(candidate)
}

/// Fixed-length lowercase hex name drawn from the OS random source.
pub fn random_name() -> String {
    let mut bytes = [0u8; RANDOM_NAME_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_for_file_and_directory() {
        let root = Path::new("/home/user/foo");

        let file = archive_entry_name(Path::new("/home/user/foo/bar/baz.txt"), root, false).unwrap();
        let dir = archive_entry_name(Path::new("/home/user/foo/bar"), root, true).unwrap();

        assert_eq!(file, "bar/baz.txt");
        assert_eq!(dir, "bar/");
    }

    #[test]
    fn test_entry_name_is_suffix_without_leading_separator() {
        let root = Path::new("/data/src");
        let path = Path::new("/data/src/a/b/c.bin");

        let name = archive_entry_name(path, root, false).unwrap();

        assert!(!name.starts_with('/'));
        assert!(path.to_str().unwrap().ends_with(&name));
        assert!(!name.contains("src"));
    }

    #[test]
    fn test_entry_name_prefix_mismatch() {
        let err = archive_entry_name(Path::new("/other/file"), Path::new("/data/src"), false)
            .unwrap_err();
        assert!(matches!(err, Error::PrefixMismatch { .. }));

        // Partial component matches are not prefixes.
        let err = archive_entry_name(Path::new("/data/srcfile"), Path::new("/data/src"), false)
            .unwrap_err();
        assert!(matches!(err, Error::PrefixMismatch { .. }));
    }

    #[test]
    fn test_entry_name_rejects_root_itself() {
        let err = archive_entry_name(Path::new("/data/src"), Path::new("/data/src"), true)
            .unwrap_err();
        assert!(matches!(err, Error::PrefixMismatch { .. }));
    }

    #[test]
    fn test_resolve_entry_path() {
        let root = Path::new("/out/Foo");

        assert_eq!(
            resolve_entry_path(root, "bar/baz.txt").unwrap(),
            PathBuf::from("/out/Foo/bar/baz.txt")
        );
        assert_eq!(
            resolve_entry_path(root, "bar/").unwrap(),
            PathBuf::from("/out/Foo/bar")
        );
    }

    #[test]
    fn test_resolve_entry_path_rejects_escapes() {
        let root = Path::new("/out/Foo");

        for name in ["../evil", "a/../../evil", "/etc/passwd", "", "./", "a\0b"] {
            let err = resolve_entry_path(root, name).unwrap_err();
            assert!(
                matches!(err, Error::UnsafeEntryPath { .. }),
                "expected {:?} to be rejected",
                name
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_entry_path_keeps_backslashes_in_names() {
        let root = Path::new("/out/Foo");

        assert_eq!(
            resolve_entry_path(root, "a\\b.txt").unwrap(),
            PathBuf::from("/out/Foo/a\\b.txt")
        );
        assert_eq!(
            resolve_entry_path(root, "\\lead.txt").unwrap(),
            PathBuf::from("/out/Foo/\\lead.txt")
        );
        assert_eq!(
            resolve_entry_path(root, "dir\\/x").unwrap(),
            PathBuf::from("/out/Foo/dir\\/x")
        );
    }

    #[cfg(windows)]
    #[test]
    fn test_resolve_entry_path_rejects_windows_escapes() {
        let root = Path::new("C:\\out\\Foo");

        for name in ["\\evil", "a\\..\\..\\evil", "C:evil"] {
            let err = resolve_entry_path(root, name).unwrap_err();
            assert!(matches!(err, Error::UnsafeEntryPath { .. }), "{}", name);
        }
    }

    #[test]
    fn test_destination_derived_from_source() {
        let dest = archive_destination(Path::new("/a/b/Foo"), None, "zip").unwrap();
        assert_eq!(dest, PathBuf::from("/a/b/Foo.zip"));
    }

    #[test]
    fn test_destination_resolves_unnamed_source() {
        let temp = tempfile::TempDir::new().unwrap();
        let source = temp.path().join("Foo");
        std::fs::create_dir_all(source.join("sub")).unwrap();

        let dest = archive_destination(&source.join("sub").join(".."), None, "zip").unwrap();

        let expected = std::fs::canonicalize(temp.path()).unwrap().join("Foo.zip");
        assert_eq!(dest, expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_destination_for_filesystem_root_fails() {
        let err = archive_destination(Path::new("/"), None, "zip").unwrap_err();
        assert!(err.is_io());
        assert!(!matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_destination_missing_hint_is_ignored() {
        let dest = archive_destination(
            Path::new("/a/b/Foo"),
            Some(Path::new("/definitely/not/here.zip")),
            "zip",
        )
        .unwrap();
        assert_eq!(dest, PathBuf::from("/a/b/Foo.zip"));
    }

    #[test]
    fn test_destination_existing_hint_is_kept() {
        let temp = tempfile::TempDir::new().unwrap();
        let hint = temp.path().join("custom.zip");
        std::fs::write(&hint, b"").unwrap();

        let dest = archive_destination(Path::new("/a/b/Foo"), Some(&hint), "zip").unwrap();
        assert_eq!(dest, hint);
    }

    #[test]
    fn test_extraction_root_strips_extension() {
        let root = extraction_root(Path::new("/a/b/Foo.zip"), "zip").unwrap();
        assert_eq!(root, PathBuf::from("/a/b/Foo"));

        let root = extraction_root(Path::new("/a/b/Foo.tar.zip"), "zip").unwrap();
        assert_eq!(root, PathBuf::from("/a/b/Foo.tar"));
    }

    #[test]
    fn test_extraction_root_wrong_extension() {
        for archive in ["/a/b/Foo.tar", "/a/b/Foo", "/a/b/Foo.ZIP", "/a/b/Foozip"] {
            let err = extraction_root(Path::new(archive), "zip").unwrap_err();
            assert!(matches!(err, Error::UnsupportedFormat { .. }), "{}", archive);
        }
    }

    #[test]
    fn test_extraction_root_random_fallback() {
        let root = extraction_root(Path::new("/a/b/.zip"), "zip").unwrap();

        assert_eq!(root.parent(), Some(Path::new("/a/b")));
        let name = root.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), RANDOM_NAME_BYTES * 2);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_random_names_differ() {
        assert_ne!(random_name(), random_name());
    }
}
