//! Worker pool: N threads draining the shared input queue into the output queue.

use log::{debug, error};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::queue::CloseableQueue;
use crate::utils::config::PackagePaths;
use crate::{ItemError, PipelineSettings, Prediction, WorkerStats};

/// The classification collaborator. Called concurrently from every worker thread,
/// so implementations must be reentrant or synchronize internally.
pub trait Classify: Send + Sync {
    fn classify(&self, item: &str, top_k: usize) -> Result<Vec<Prediction>, ItemError>;
}

impl<F> Classify for F
where
    F: Fn(&str, usize) -> Result<Vec<Prediction>, ItemError> + Send + Sync,
{
    fn classify(&self, item: &str, top_k: usize) -> Result<Vec<Prediction>, ItemError> {
        self(item, top_k)
    }
}

/// Side channel for item-level failures.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, item: &str, error: &ItemError);
}

/// One line on the diagnostic stream for a failed item.
pub fn format_diagnostic(item: &str, error: &ItemError) -> String {
    format!(
        "{}: could not process the file '{}': {}",
        PackagePaths::get().pkg_name(),
        item,
        error
    )
}

/// Writes each failure to stderr as a single write, so lines never interleave mid-line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&self, item: &str, error: &ItemError) {
        let mut line = format_diagnostic(item, error);
        line.push('\n');
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }
}

/// Keeps failure messages in memory (library callers, tests).
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, item: &str, error: &ItemError) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(format_diagnostic(item, error));
    }
}

/// Result line: `item[, <ms>ms][, label confidence, ...]`, confidence with six decimals.
pub fn format_record(item: &str, elapsed: Option<Duration>, predictions: &[Prediction]) -> String {
    let mut record = String::from(item);
    if let Some(elapsed) = elapsed {
        record.push_str(&format!(", {}ms", elapsed.as_millis()));
    }
    for p in predictions {
        record.push_str(&format!(", {} {:.6}", p.label, p.confidence));
    }
    record
}

/// Everything a worker thread needs; cloned once per worker.
#[derive(Clone)]
pub struct WorkerContext {
    pub input: Arc<CloseableQueue<String>>,
    pub output: Arc<CloseableQueue<String>>,
    pub classifier: Arc<dyn Classify>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
    pub settings: PipelineSettings,
}

/// Single worker: pop until end-of-stream, classify, push a record or report the failure.
pub fn worker_loop(ctx: &WorkerContext) -> WorkerStats {
    let mut stats = WorkerStats::default();
    while let Some(item) = ctx.input.pop() {
        let start = Instant::now();
        match ctx.classifier.classify(&item, ctx.settings.top_k) {
            Ok(predictions) => {
                let elapsed = ctx.settings.timing.then(|| start.elapsed());
                let record = format_record(&item, elapsed, &predictions);
                if ctx.output.push(record).is_err() {
                    error!(
                        "output queue closed while workers were running; dropped result for '{}'",
                        item
                    );
                    stats.failed += 1;
                    continue;
                }
                stats.processed += 1;
            }
            Err(err) => {
                ctx.diagnostics.report(&item, &err);
                stats.failed += 1;
            }
        }
    }
    debug!(
        "worker done: {} processed, {} failed",
        stats.processed, stats.failed
    );
    stats
}

/// Spawn the worker pool. Each worker exits on its own once `ctx.input` is closed and drained.
pub fn spawn_workers(ctx: &WorkerContext) -> std::io::Result<Vec<JoinHandle<WorkerStats>>> {
    (0..ctx.settings.worker_count())
        .map(|i| {
            let ctx = ctx.clone();
            thread::Builder::new()
                .name(PackagePaths::get().worker_thread_name(i))
                .spawn(move || worker_loop(&ctx))
        })
        .collect()
}
