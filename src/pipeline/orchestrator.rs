use anyhow::{Context, Result};
use log::debug;
use std::io::Write;
use std::sync::Arc;

use super::collector::spawn_collector;
use super::context::{ItemSource, PipelineHandles, PipelineQueues, create_pipeline_queues};
use super::error_handler::{join_named, join_workers};
use super::producer::{push_direct, spawn_stream_producer};
use super::worker::{Classify, DiagnosticSink, WorkerContext, spawn_workers};
use crate::{PipelineSettings, RunSummary};

/// Start the collector and the worker pool on fresh queues. On a spawn failure, everything already
/// started is shut down before the error is returned.
pub fn start_pipeline<W>(
    classifier: Arc<dyn Classify>,
    diagnostics: Arc<dyn DiagnosticSink>,
    sink: W,
    settings: PipelineSettings,
) -> Result<(PipelineQueues, PipelineHandles)>
where
    W: Write + Send + 'static,
{
    let queues = create_pipeline_queues();

    // Collector first so it drains as soon as workers produce.
    let collector_handle =
        spawn_collector(Arc::clone(&queues.output), sink).context("spawn collector thread")?;

    let ctx = WorkerContext {
        input: Arc::clone(&queues.input),
        output: Arc::clone(&queues.output),
        classifier,
        diagnostics,
        settings,
    };
    let worker_handles = match spawn_workers(&ctx) {
        Ok(handles) => handles,
        Err(e) => {
            // Already-spawned workers exit on end-of-stream; the collector follows the output close.
            queues.input.close();
            queues.output.close();
            let _ = collector_handle.join();
            return Err(e).context("spawn worker threads");
        }
    };
    debug!("started {} workers", worker_handles.len());

    Ok((
        queues,
        PipelineHandles {
            collector_handle,
            worker_handles,
        },
    ))
}

/// Run the producer against `queues.input`. Direct mode pushes and closes on this thread;
/// streaming mode runs on its own thread and this call blocks until it finishes.
/// The input queue is closed when this returns, whatever the outcome.
pub fn run_producer(queues: &PipelineQueues, source: ItemSource) -> Result<usize> {
    match source {
        ItemSource::Direct(items) => Ok(push_direct(&queues.input, items)),
        ItemSource::Stream { source, filter } => {
            let handle = match spawn_stream_producer(Arc::clone(&queues.input), source, filter) {
                Ok(handle) => handle,
                Err(e) => {
                    queues.input.close();
                    return Err(e).context("spawn producer thread");
                }
            };
            join_named(handle, "producer")
        }
    }
}

/// Shut down in order: join workers, then close the output queue, then join the collector.
/// The output queue must not close before every worker has exited or late results would be lost.
pub fn shutdown_pipeline(
    queues: &PipelineQueues,
    handles: PipelineHandles,
) -> Result<(crate::WorkerStats, usize)> {
    let workers = join_workers(handles.worker_handles);
    queues.output.close();
    let emitted = join_named(handles.collector_handle, "collector").and_then(|r| r);
    Ok((workers?, emitted?))
}

/// Main orchestrator: producer → input queue → N workers → output queue → collector → `sink`.
///
/// Item failures go to `diagnostics` and never stop the run. Errors are returned only for
/// thread spawn failures, thread panics, and result sink write failures, and only after every
/// thread has been joined.
pub fn run_pipeline<W>(
    source: ItemSource,
    classifier: Arc<dyn Classify>,
    diagnostics: Arc<dyn DiagnosticSink>,
    sink: W,
    settings: PipelineSettings,
) -> Result<RunSummary>
where
    W: Write + Send + 'static,
{
    let (queues, handles) = start_pipeline(classifier, diagnostics, sink, settings)?;

    let submitted = run_producer(&queues, source);
    debug!("main: input closed, waiting for workers");

    let shutdown = shutdown_pipeline(&queues, handles);
    let submitted = submitted?;
    let (workers, emitted) = shutdown?;

    let summary = RunSummary {
        submitted,
        processed: workers.processed,
        failed: workers.failed,
        emitted,
    };
    debug!("{:?}", summary);
    Ok(summary)
}
