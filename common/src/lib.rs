//! Core of the `rmirror` tool: a per-path state table, directory scanners
//! that classify filesystem entries into transfer lifecycle states, a
//! debounce-aware scheduler and a single serialized transfer worker, tied
//! together by a poll loop. All state is in-memory and rebuilt from a fresh
//! baseline scan on every run.

pub mod config;
pub mod mirror;
pub mod scanner;
pub mod scheduler;
pub mod table;
pub mod transport;
pub mod worker;

#[cfg(test)]
mod testutils;

pub use config::Settings;
pub use scanner::ScanError;
pub use scheduler::Task;
pub use table::{EntryKind, SyncTable, TransferStatus};
