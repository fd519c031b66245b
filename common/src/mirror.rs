//! The poll loop tying scanner, scheduler and worker together.

use anyhow::Result;

use crate::config::Settings;
use crate::scanner;
use crate::scheduler::{self, Task};
use crate::table::SyncTable;
use crate::worker;

/// Run the mirror until the process is killed.
///
/// Startup: baseline-scan the source so existing content is marked done,
/// then (unless configured off) bulk-transfer the whole source root once.
/// After that, each cycle runs an incremental scan and spawns a dispatch
/// pass; dispatch passes feed a capacity-1 queue consumed by one persistent
/// worker, so a slow transfer throttles dispatch but never detection.
///
/// The only way out is a fatal scan error (source root missing), which the
/// binary turns into a non-zero exit.
pub async fn run<C, Fut>(settings: Settings, copy: C) -> Result<()>
where
    C: Fn(std::path::PathBuf, std::ffi::OsString) -> Fut + Clone + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<()>> + Send + 'static,
{
    let table = std::sync::Arc::new(SyncTable::new());
    scanner::baseline(&table, &settings.source).await?;
    tracing::info!(
        "watching {:?} -> {} ({} existing entries)",
        &settings.source,
        &settings.destination,
        table.len()
    );
    let (task_tx, task_rx) = tokio::sync::mpsc::channel::<Task>(1);
    {
        let table = table.clone();
        let copy = copy.clone();
        tokio::spawn(worker::run(table, task_rx, copy));
    }
    if !settings.ignore_existing {
        // first-run bulk copy of everything already present, done inline
        // before any polling starts
        let task = Task {
            src: settings.source.clone(),
            dst: settings.destination.clone().into(),
        };
        worker::run_task(&table, &task, &copy).await;
    }
    loop {
        scanner::incremental(&table, &settings.source).await?;
        let table = table.clone();
        let settings_for_pass = settings.clone();
        let task_tx = task_tx.clone();
        tokio::spawn(async move {
            scheduler::dispatch(&table, &settings_for_pass, &task_tx).await;
        });
        tokio::time::sleep(settings.interval).await;
    }
}
