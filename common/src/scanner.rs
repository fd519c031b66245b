//! Directory walks that feed the state table.
//!
//! Two structurally similar passes: a one-shot baseline walk that records
//! everything already present as `Complete`, and a per-cycle incremental walk
//! that registers new paths and detects size changes on known files. Walk
//! errors below the root are logged and skipped; a missing source root is
//! fatal to the whole run.

use async_recursion::async_recursion;

use crate::table::{DIRECTORY_SIZE, EntryKind, FileObservation, SyncTable, TransferStatus};

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("source directory {0:?} does not exist")]
    SourceMissing(std::path::PathBuf),
}

fn classify(metadata: &std::fs::Metadata) -> (EntryKind, u64) {
    if metadata.is_dir() {
        (EntryKind::Directory, DIRECTORY_SIZE)
    } else {
        // anything that isn't a directory (including symlinks) is tracked by
        // its lstat size, same as the transfer treats it
        (EntryKind::File, metadata.len())
    }
}

/// One-shot startup pass: register the root and its entire subtree with every
/// status forced to `Complete`, so pre-existing content is never re-sent.
pub async fn baseline(table: &SyncTable, root: &std::path::Path) -> Result<(), ScanError> {
    let metadata = match tokio::fs::metadata(root).await {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::SourceMissing(root.to_owned()));
        }
        Err(error) => {
            tracing::warn!("baseline scan of {:?} failed: {}", root, error);
            return Ok(());
        }
    };
    let (kind, size) = classify(&metadata);
    table.insert(root, kind, size);
    table.set_status(root, TransferStatus::Complete);
    if metadata.is_dir() {
        mark_subtree_complete(table, root).await;
    }
    Ok(())
}

/// Per-cycle pass: walk the tree below the root, registering new paths and
/// updating known files whose size changed.
pub async fn incremental(table: &SyncTable, root: &std::path::Path) -> Result<(), ScanError> {
    match tokio::fs::metadata(root).await {
        Ok(_) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::SourceMissing(root.to_owned()));
        }
        Err(error) => {
            tracing::warn!("incremental scan of {:?} failed: {}", root, error);
            return Ok(());
        }
    }
    scan_dir(table, root).await;
    Ok(())
}

#[async_recursion]
async fn scan_dir(table: &SyncTable, dir: &std::path::Path) {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!("cannot open directory {:?} for scanning: {}", dir, error);
            return;
        }
    };
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(error) => {
                tracing::warn!("failed traversing directory {:?}: {}", dir, error);
                break;
            }
        };
        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!("failed reading metadata from {:?}: {}", &path, error);
                continue;
            }
        };
        if metadata.is_dir() {
            if table.contains(&path) {
                scan_dir(table, &path).await;
            } else {
                tracing::debug!("found new directory: {:?}", &path);
                register_new_directory(table, &path).await;
            }
        } else {
            match table.observe_file(&path, metadata.len()) {
                FileObservation::New => tracing::debug!("found new file: {:?}", &path),
                FileObservation::Updated => tracing::debug!("found updated file: {:?}", &path),
                FileObservation::Unchanged => {}
            }
        }
    }
}

/// Register a newly discovered directory: the directory itself goes in idle,
/// so one recursive copy rooted at it gets scheduled, while every descendant
/// is registered `Complete` up front - the root's transfer carries them, and
/// they must not be scheduled independently.
async fn register_new_directory(table: &SyncTable, root: &std::path::Path) {
    table.insert(root, EntryKind::Directory, DIRECTORY_SIZE);
    mark_subtree_complete(table, root).await;
}

#[async_recursion]
async fn mark_subtree_complete(table: &SyncTable, dir: &std::path::Path) {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!("cannot open directory {:?} for scanning: {}", dir, error);
            return;
        }
    };
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(error) => {
                tracing::warn!("failed traversing directory {:?}: {}", dir, error);
                break;
            }
        };
        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!("failed reading metadata from {:?}: {}", &path, error);
                continue;
            }
        };
        let (kind, size) = classify(&metadata);
        table.insert(&path, kind, size);
        table.set_status(&path, TransferStatus::Complete);
        if metadata.is_dir() {
            mark_subtree_complete(table, &path).await;
        }
    }
}
