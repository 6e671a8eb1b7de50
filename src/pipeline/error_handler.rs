use anyhow::Result;
use std::thread::JoinHandle;

use crate::WorkerStats;

/// Join every worker and sum their stats. Keeps joining after a panic so no thread is left behind;
/// the panic is reported as an error once all workers are done.
pub fn join_workers(worker_handles: Vec<JoinHandle<WorkerStats>>) -> Result<WorkerStats> {
    let mut total = WorkerStats::default();
    let mut panicked = 0_usize;
    for h in worker_handles {
        match h.join() {
            Ok(stats) => {
                total.processed += stats.processed;
                total.failed += stats.failed;
            }
            Err(_) => panicked += 1,
        }
    }
    if panicked > 0 {
        anyhow::bail!("{} worker thread(s) panicked", panicked);
    }
    Ok(total)
}

/// Join a thread whose panic should become an error named after `what`.
pub fn join_named<T>(handle: JoinHandle<T>, what: &str) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("{} thread panicked", what))
}
