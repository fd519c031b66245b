//! Selects table entries eligible for transfer and hands them to the worker.

use crate::config::Settings;
use crate::table::{Claim, SyncTable};

/// A single outbound transfer: local source path to remote destination spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub src: std::path::PathBuf,
    pub dst: std::ffi::OsString,
}

/// Join the destination spec with a path's location relative to the source
/// root. The source root itself maps to the destination spec unchanged.
/// Filename bytes are carried through untouched, so names that are not valid
/// UTF-8 keep their spelling on the remote side.
pub fn remote_destination(settings: &Settings, path: &std::path::Path) -> std::ffi::OsString {
    let relative = path.strip_prefix(&settings.source).unwrap_or(path);
    if relative.as_os_str().is_empty() {
        return settings.destination.clone().into();
    }
    let mut dst = std::ffi::OsString::from(settings.destination.trim_end_matches('/'));
    dst.push("/");
    dst.push(relative.as_os_str());
    dst
}

/// One pass over the table, claiming and emitting every eligible entry.
///
/// Sending awaits the worker's single-slot queue, so a slow transfer blocks
/// this pass (it runs on its own task) but never the scan loop. Entries are
/// marked `Transferring` at claim time, before the send, so an overlapping
/// pass from a later cycle cannot emit the same path again.
pub async fn dispatch(
    table: &SyncTable,
    settings: &Settings,
    tasks: &tokio::sync::mpsc::Sender<Task>,
) {
    for path in table.paths() {
        match table.try_claim(&path, settings.check_count) {
            Claim::Ready => {
                let dst = remote_destination(settings, &path);
                tracing::debug!("scheduling transfer: {:?} -> {:?}", &path, &dst);
                if tasks.send(Task { src: path, dst }).await.is_err() {
                    // worker is gone; nothing left to dispatch to
                    return;
                }
            }
            Claim::Deferred | Claim::Skip => {}
        }
    }
}
