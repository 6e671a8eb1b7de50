//! Output collector: the only consumer of the output queue.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::queue::CloseableQueue;
use crate::utils::config::PackagePaths;

/// Write records to `sink` in the order they are popped, one line each, flushing per line.
/// After a write error the queue is still drained (so nothing upstream is left waiting) and the
/// first error is returned. Otherwise returns the number of lines written.
pub fn collect_loop<W: Write>(output: &CloseableQueue<String>, mut sink: W) -> Result<usize> {
    let mut emitted = 0_usize;
    let mut first_error: Option<std::io::Error> = None;
    while let Some(record) = output.pop() {
        if first_error.is_some() {
            continue;
        }
        match writeln!(sink, "{}", record).and_then(|_| sink.flush()) {
            Ok(()) => emitted += 1,
            Err(e) => {
                warn!("result sink failed, discarding remaining results: {}", e);
                first_error = Some(e);
            }
        }
    }
    debug!("collector: output closed, {} records written", emitted);
    match first_error {
        Some(e) => Err(e).context("write result line"),
        None => Ok(emitted),
    }
}

/// Start the collector thread. It runs until `output` is closed and drained.
pub fn spawn_collector<W>(
    output: Arc<CloseableQueue<String>>,
    sink: W,
) -> std::io::Result<JoinHandle<Result<usize>>>
where
    W: Write + Send + 'static,
{
    thread::Builder::new()
        .name(PackagePaths::get().collector_thread_name())
        .spawn(move || collect_loop(&output, sink))
}
