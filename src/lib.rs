//! Pixclass: command-line image classification over a fixed pool of worker threads.
//!
//! Items (image paths) flow producer → input queue → N workers → output queue → collector.
//! Shutdown is driven by closing the queues: the producer closes the input queue when its
//! source is exhausted, and the orchestrator closes the output queue once every worker has exited.

pub mod classify;
pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use std::io::Write;
use std::sync::Arc;

/// Result alias used by public pixclass API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use classify::ImageClassifier;
pub use pipeline::{
    Classify, CloseableQueue, DiagnosticSink, ItemSource, MemorySink, StderrSink, run_pipeline,
};

/// Classify `items` with `classifier` and write one line per success to `sink`.
///
/// Failures are reported to `diagnostics` (use [`StderrSink`] or [`MemorySink`]). Line order
/// follows completion order, not input order.
///
/// ```ignore
/// let classifier = pixclass::ImageClassifier::load(model, classes, true, 100 << 20)?;
/// let summary = pixclass::classify_items(
///     vec!["fox.png".into()],
///     Arc::new(classifier),
///     Arc::new(pixclass::StderrSink),
///     std::io::stdout(),
///     &pixclass::PipelineSettings::default(),
/// )?;
/// ```
pub fn classify_items<W>(
    items: Vec<String>,
    classifier: Arc<dyn Classify>,
    diagnostics: Arc<dyn DiagnosticSink>,
    sink: W,
    settings: &PipelineSettings,
) -> Result<RunSummary>
where
    W: Write + Send + 'static,
{
    log::debug!(
        "{} SETTINGS:{:?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        settings
    );
    run_pipeline(
        ItemSource::Direct(items),
        classifier,
        diagnostics,
        sink,
        *settings,
    )
}
