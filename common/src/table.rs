//! Shared per-path state table - the single source of truth for sync status.
//!
//! The table owns its lock; callers only ever see atomic per-key operations.
//! Iteration goes through [`SyncTable::paths`], a key snapshot, so a scan
//! registering new paths can never invalidate a dispatch pass walking the
//! table concurrently.

/// Nominal size recorded for directories so they always compare as unchanged.
pub const DIRECTORY_SIZE: u64 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Idle,
    Transferring,
    Complete,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub kind: EntryKind,
    pub size: u64,
    pub status: TransferStatus,
    /// Consecutive polls this file was seen with an unchanged size while idle.
    pub checks: u32,
}

impl Entry {
    fn new(kind: EntryKind, size: u64) -> Self {
        Self {
            kind,
            size,
            status: TransferStatus::Idle,
            checks: 0,
        }
    }
}

/// Result of observing a file during an incremental scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileObservation {
    New,
    Updated,
    Unchanged,
}

/// Result of asking whether an entry may be transferred this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// Entry was marked `Transferring` and must be dispatched now.
    Ready,
    /// Idle file still settling; its check counter was incremented.
    Deferred,
    /// Not idle (or unknown) - nothing to do.
    Skip,
}

#[derive(Debug, Default)]
pub struct SyncTable {
    entries: std::sync::Mutex<std::collections::HashMap<std::path::PathBuf, Entry>>,
}

impl SyncTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path, overwriting any previous entry. New entries always
    /// start `Idle` with a zeroed check counter.
    pub fn insert(&self, path: &std::path::Path, kind: EntryKind, size: u64) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(path.to_owned(), Entry::new(kind, size));
    }

    pub fn contains(&self, path: &std::path::Path) -> bool {
        let entries = self.entries.lock().unwrap();
        entries.contains_key(path)
    }

    pub fn status(&self, path: &std::path::Path) -> Option<TransferStatus> {
        let entries = self.entries.lock().unwrap();
        entries.get(path).map(|entry| entry.status)
    }

    pub fn set_status(&self, path: &std::path::Path, status: TransferStatus) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(path) {
            entry.status = status;
        }
    }

    pub fn is_idle(&self, path: &std::path::Path) -> bool {
        self.status(path) == Some(TransferStatus::Idle)
    }

    pub fn size(&self, path: &std::path::Path) -> Option<u64> {
        let entries = self.entries.lock().unwrap();
        entries.get(path).map(|entry| entry.size)
    }

    pub fn set_size(&self, path: &std::path::Path, size: u64) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(path) {
            entry.size = size;
        }
    }

    pub fn checks(&self, path: &std::path::Path) -> Option<u32> {
        let entries = self.entries.lock().unwrap();
        entries.get(path).map(|entry| entry.checks)
    }

    pub fn reset_checks(&self, path: &std::path::Path) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(path) {
            entry.checks = 0;
        }
    }

    pub fn increment_checks(&self, path: &std::path::Path) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(path) {
            entry.checks += 1;
        }
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all known paths. The only sanctioned way to iterate the
    /// table; entries inserted after the snapshot show up on the next pass.
    pub fn paths(&self) -> Vec<std::path::PathBuf> {
        let entries = self.entries.lock().unwrap();
        entries.keys().cloned().collect()
    }

    /// Record a file sighting from an incremental scan in one atomic step.
    ///
    /// Unknown paths are registered idle; a size change forces the entry back
    /// to `Idle` and zeroes its check counter, whatever state it was in.
    pub fn observe_file(&self, path: &std::path::Path, size: u64) -> FileObservation {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(path) {
            None => {
                entries.insert(path.to_owned(), Entry::new(EntryKind::File, size));
                FileObservation::New
            }
            Some(entry) if entry.size != size => {
                entry.size = size;
                entry.status = TransferStatus::Idle;
                entry.checks = 0;
                FileObservation::Updated
            }
            Some(_) => FileObservation::Unchanged,
        }
    }

    /// Evaluate the selection rule for one entry and claim it if eligible.
    ///
    /// Idle directories are claimed immediately. An idle file is claimed once
    /// its check counter has reached `check_count`; otherwise the counter is
    /// incremented and the file stays idle for a later cycle. Claiming marks
    /// the entry `Transferring` before the caller ever sees `Ready`, so two
    /// overlapping dispatch passes cannot emit the same path twice.
    pub fn try_claim(&self, path: &std::path::Path, check_count: u32) -> Claim {
        let mut entries = self.entries.lock().unwrap();
        let Some(entry) = entries.get_mut(path) else {
            return Claim::Skip;
        };
        if entry.status != TransferStatus::Idle {
            return Claim::Skip;
        }
        match entry.kind {
            EntryKind::Directory => {
                entry.status = TransferStatus::Transferring;
                Claim::Ready
            }
            EntryKind::File => {
                if entry.checks >= check_count {
                    entry.checks = 0;
                    entry.status = TransferStatus::Transferring;
                    Claim::Ready
                } else {
                    entry.checks += 1;
                    Claim::Deferred
                }
            }
        }
    }

    /// Post-transfer reconciliation: mark the entry `Complete` unless a scan
    /// reset it to `Idle` while the transfer was in flight, in which case it
    /// stays idle and gets re-queued on a later cycle.
    pub fn finish_transfer(&self, path: &std::path::Path) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(path)
            && entry.status != TransferStatus::Idle
        {
            entry.status = TransferStatus::Complete;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> std::path::PathBuf {
        std::path::PathBuf::from(s)
    }

    #[test]
    fn insert_defaults_to_idle() {
        let table = SyncTable::new();
        table.insert(&path("a"), EntryKind::File, 10);
        assert_eq!(table.status(&path("a")), Some(TransferStatus::Idle));
        assert_eq!(table.size(&path("a")), Some(10));
        assert_eq!(table.checks(&path("a")), Some(0));
    }

    #[test]
    fn insert_overwrites_existing_entry() {
        let table = SyncTable::new();
        table.insert(&path("a"), EntryKind::File, 10);
        table.set_status(&path("a"), TransferStatus::Complete);
        table.increment_checks(&path("a"));
        table.insert(&path("a"), EntryKind::File, 20);
        assert_eq!(table.len(), 1);
        assert_eq!(table.status(&path("a")), Some(TransferStatus::Idle));
        assert_eq!(table.size(&path("a")), Some(20));
        assert_eq!(table.checks(&path("a")), Some(0));
    }

    #[test]
    fn idle_directory_is_claimed_immediately() {
        let table = SyncTable::new();
        table.insert(&path("d"), EntryKind::Directory, DIRECTORY_SIZE);
        assert_eq!(table.try_claim(&path("d"), 5), Claim::Ready);
        assert_eq!(table.status(&path("d")), Some(TransferStatus::Transferring));
    }

    #[test]
    fn file_is_deferred_until_checks_reach_threshold() {
        let table = SyncTable::new();
        table.insert(&path("f"), EntryKind::File, 100);
        assert_eq!(table.try_claim(&path("f"), 2), Claim::Deferred);
        assert_eq!(table.checks(&path("f")), Some(1));
        assert_eq!(table.try_claim(&path("f"), 2), Claim::Deferred);
        assert_eq!(table.checks(&path("f")), Some(2));
        assert_eq!(table.try_claim(&path("f"), 2), Claim::Ready);
        assert_eq!(table.checks(&path("f")), Some(0));
        assert_eq!(table.status(&path("f")), Some(TransferStatus::Transferring));
    }

    #[test]
    fn zero_threshold_claims_file_on_first_pass() {
        let table = SyncTable::new();
        table.insert(&path("f"), EntryKind::File, 100);
        assert_eq!(table.try_claim(&path("f"), 0), Claim::Ready);
    }

    #[test]
    fn non_idle_and_unknown_entries_are_skipped() {
        let table = SyncTable::new();
        table.insert(&path("f"), EntryKind::File, 100);
        table.set_status(&path("f"), TransferStatus::Complete);
        assert_eq!(table.try_claim(&path("f"), 0), Claim::Skip);
        assert_eq!(table.try_claim(&path("missing"), 0), Claim::Skip);
    }

    #[test]
    fn claimed_entry_is_not_claimed_again() {
        let table = SyncTable::new();
        table.insert(&path("d"), EntryKind::Directory, DIRECTORY_SIZE);
        assert_eq!(table.try_claim(&path("d"), 0), Claim::Ready);
        assert_eq!(table.try_claim(&path("d"), 0), Claim::Skip);
    }

    #[test]
    fn observe_file_registers_unknown_path_idle() {
        let table = SyncTable::new();
        assert_eq!(table.observe_file(&path("f"), 7), FileObservation::New);
        assert_eq!(table.status(&path("f")), Some(TransferStatus::Idle));
        assert_eq!(table.size(&path("f")), Some(7));
    }

    #[test]
    fn observe_file_size_change_forces_idle_and_zeroes_checks() {
        let table = SyncTable::new();
        table.insert(&path("f"), EntryKind::File, 100);
        table.set_status(&path("f"), TransferStatus::Complete);
        table.increment_checks(&path("f"));
        table.increment_checks(&path("f"));
        assert_eq!(table.observe_file(&path("f"), 150), FileObservation::Updated);
        assert_eq!(table.status(&path("f")), Some(TransferStatus::Idle));
        assert_eq!(table.size(&path("f")), Some(150));
        assert_eq!(table.checks(&path("f")), Some(0));
    }

    #[test]
    fn observe_file_unchanged_size_leaves_entry_alone() {
        let table = SyncTable::new();
        table.insert(&path("f"), EntryKind::File, 100);
        table.set_status(&path("f"), TransferStatus::Complete);
        assert_eq!(
            table.observe_file(&path("f"), 100),
            FileObservation::Unchanged
        );
        assert_eq!(table.status(&path("f")), Some(TransferStatus::Complete));
    }

    #[test]
    fn finish_transfer_completes_transferring_entry() {
        let table = SyncTable::new();
        table.insert(&path("f"), EntryKind::File, 100);
        table.set_status(&path("f"), TransferStatus::Transferring);
        table.finish_transfer(&path("f"));
        assert_eq!(table.status(&path("f")), Some(TransferStatus::Complete));
    }

    #[test]
    fn finish_transfer_leaves_idle_entry_idle() {
        // The entry was reset to idle while its transfer was in flight; it
        // must be picked up again on a later cycle, not marked done.
        let table = SyncTable::new();
        table.insert(&path("f"), EntryKind::File, 100);
        table.set_status(&path("f"), TransferStatus::Transferring);
        table.set_status(&path("f"), TransferStatus::Idle);
        table.finish_transfer(&path("f"));
        assert_eq!(table.status(&path("f")), Some(TransferStatus::Idle));
    }

    #[test]
    fn paths_snapshot_tolerates_inserts_while_iterating() {
        let table = SyncTable::new();
        table.insert(&path("a"), EntryKind::File, 1);
        table.insert(&path("b"), EntryKind::File, 2);
        for p in table.paths() {
            table.insert(&path("c"), EntryKind::File, 3);
            assert!(table.contains(&p));
        }
        assert_eq!(table.len(), 3);
    }
}
