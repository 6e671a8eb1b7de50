//! Pipeline components: closeable queue, producer, worker pool, collector, orchestration.

pub mod collector;
pub mod context;
pub mod error_handler;
pub mod orchestrator;
pub mod producer;
pub mod queue;
pub mod worker;

pub use collector::{collect_loop, spawn_collector};
pub use context::{ItemSource, PipelineHandles, PipelineQueues, create_pipeline_queues};
pub use error_handler::{join_named, join_workers};
pub use orchestrator::{run_pipeline, run_producer, shutdown_pipeline, start_pipeline};
pub use producer::{line_source, push_direct, run_stream_loop, spawn_stream_producer, walk_source};
pub use queue::{CloseableQueue, QueueClosed};
pub use worker::{
    Classify, DiagnosticSink, MemorySink, StderrSink, WorkerContext, format_diagnostic,
    format_record, spawn_workers, worker_loop,
};
