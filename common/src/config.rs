//! Resolved configuration handed to the mirror loop by the binary

/// Settings for a single mirror run.
///
/// Built once from the CLI and threaded through every component; there is no
/// global mutable state. Verbosity is not carried here - the binary maps it
/// onto the tracing subscriber level before the run starts.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Source directory being watched
    pub source: std::path::PathBuf,
    /// Destination specification, e.g. `user@host:/path`
    pub destination: String,
    /// Delay between poll cycles
    pub interval: std::time::Duration,
    /// Consecutive unchanged-size observations required before a file is
    /// transferred (0 = transfer on first idle observation)
    pub check_count: u32,
    /// Skip the startup bulk transfer of content that already exists
    pub ignore_existing: bool,
}
