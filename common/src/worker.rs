//! The sole consumer of scheduled transfers.

use crate::scheduler::Task;
use crate::table::SyncTable;

/// Execute one transfer and reconcile the entry's state afterwards.
///
/// Failures are logged only - the entry still advances to `Complete` (there
/// is no retry and no failure state), unless a concurrent scan reset it to
/// `Idle` during the transfer window, in which case it stays idle and gets
/// picked up again on a later cycle.
pub async fn run_task<C, Fut>(table: &SyncTable, task: &Task, copy: &C)
where
    C: Fn(std::path::PathBuf, std::ffi::OsString) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<()>>,
{
    tracing::debug!("transfer: {:?} -> {:?}", &task.src, &task.dst);
    if let Err(error) = copy(task.src.clone(), task.dst.clone()).await {
        tracing::warn!("transfer of {:?} failed: {:#}", &task.src, error);
    }
    table.finish_transfer(&task.src);
}

/// Persistent worker loop: transfers are pulled one at a time off a
/// single-slot queue, so exactly one is ever outstanding system-wide.
pub async fn run<C, Fut>(
    table: std::sync::Arc<SyncTable>,
    mut tasks: tokio::sync::mpsc::Receiver<Task>,
    copy: C,
) where
    C: Fn(std::path::PathBuf, std::ffi::OsString) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<()>>,
{
    while let Some(task) = tasks.recv().await {
        run_task(&table, &task, &copy).await;
    }
}
