use crate::security::TMP_SUFFIX;
use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Temporary files younger than this may still belong to a live writer in another process.
const STALE_AFTER: Duration = Duration::from_secs(300);

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now, STALE_AFTER)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Cleaned up temporary files");
        },
        Err(e) => {
            error!(error = %e, "Temp file cleanup task panicked");
        },
        _ => {},
    }
}

pub(crate) fn is_tmp_name(name: &OsStr) -> bool {
    name.to_str().is_some_and(|name| name.ends_with(TMP_SUFFIX))
}

/// Walks children before parents so directories emptied by the purge are pruned in the same pass.
/// The root itself is never removed.
fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    WalkDir::new(root).min_depth(1).contents_first(true).into_iter().flatten().for_each(|entry| {
        let path = entry.path();

        if entry.file_type().is_file() {
            if is_tmp_name(entry.file_name()) && is_stale(&entry, now, threshold) {
                match std::fs::remove_file(path) {
                    Ok(()) => removed += 1,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to remove stale temp file");
                        failed += 1;
                    },
                }
            }
        } else if entry.file_type().is_dir() {
            // Fails harmlessly on non-empty directories.
            let _ = std::fs::remove_dir(path);
        }
    });

    (removed, failed)
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}
