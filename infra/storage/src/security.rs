use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Suffix reserved for in-flight writes. Objects never carry it.
pub(crate) const TMP_SUFFIX: &str = ".imghub-tmp";

/// Splits a logical path into clean segments.
///
/// Both `/` and `\` separate segments, empty and `.` segments vanish, and `..` pops the
/// previous segment. Popping past the start means the path climbs above the root.
fn normalize(logical: &str) -> Result<Vec<&str>, StorageError> {
    let mut segments = Vec::new();

    for segment in logical.split(['/', '\\']) {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    return Err(StorageError::PathTraversal {
                        message: logical.to_owned().into(),
                        context: Some("Path climbs above the storage root via '..'".into()),
                    });
                }
            },
            other => {
                if !is_plain_segment(other) {
                    return Err(StorageError::PathTraversal {
                        message: logical.to_owned().into(),
                        context: Some("Path segment carries a drive or root prefix".into()),
                    });
                }
                segments.push(other);
            },
        }
    }

    Ok(segments)
}

/// A segment must be exactly one normal component on the host platform (rejects `C:` on Windows).
fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}

/// Maps a logical image path to its physical location inside `root`.
///
/// `root` must already be canonical. The check runs on the final absolute form, so symlinks
/// inside the tree that point elsewhere are caught as well as lexical `..` escapes.
pub(crate) fn resolve_path(root: &Path, logical: &str) -> Result<PathBuf, StorageError> {
    let segments = normalize(logical)?;

    let Some(file_name) = segments.last() else {
        return Err(StorageError::InvalidPath {
            message: logical.to_owned().into(),
            context: Some("Path does not name a file".into()),
        });
    };
    if file_name.ends_with(TMP_SUFFIX) {
        return Err(StorageError::InvalidPath {
            message: logical.to_owned().into(),
            context: Some(format!("Suffix '{TMP_SUFFIX}' is reserved").into()),
        });
    }

    let joined = segments.iter().fold(root.to_path_buf(), |acc, segment| acc.join(segment));

    match joined.canonicalize() {
        Ok(canonical) => validate_canonical(root, canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => validate_missing(root, &joined),
        Err(e) => Err(StorageError::Io {
            source: e,
            context: Some(format!("Failed to canonicalize {}", joined.display()).into()),
        }),
    }
}

/// Containment uses component-wise [`Path::starts_with`], so `/data/store-evil` is not
/// considered inside `/data/store`.
fn validate_canonical(root: &Path, canonical: PathBuf) -> Result<PathBuf, StorageError> {
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        Err(StorageError::PathTraversal {
            message: canonical.display().to_string().into(),
            context: Some("Resolved path is outside the storage root".into()),
        })
    }
}

/// Validates a target that does not exist yet through its nearest existing ancestor.
fn validate_missing(root: &Path, joined: &Path) -> Result<PathBuf, StorageError> {
    if !joined.starts_with(root) {
        return Err(StorageError::PathTraversal {
            message: joined.display().to_string().into(),
            context: Some("Path is outside the storage root".into()),
        });
    }

    let mut current = joined.parent();

    while let Some(path) = current {
        if path == root {
            return Ok(joined.to_path_buf());
        }

        if path.exists() {
            return match path.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined.to_path_buf()),
                Ok(canonical) => Err(StorageError::PathTraversal {
                    message: canonical.display().to_string().into(),
                    context: Some("Parent directory links outside the storage root".into()),
                }),
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }

        current = path.parent();
    }

    Err(StorageError::PathTraversal {
        message: joined.display().to_string().into(),
        context: Some("No ancestor inside the storage root".into()),
    })
}

/// Converts a root-relative physical path back into its logical form.
///
/// Returns `None` for names that are not valid UTF-8, since no logical path can reach them.
pub(crate) fn logical_path(relative: &Path) -> Option<String> {
    let mut logical = String::new();
    for component in relative.components() {
        let Component::Normal(part) = component else { return None };
        logical.push('/');
        logical.push_str(part.to_str()?);
    }
    if logical.is_empty() { None } else { Some(logical) }
}
