//! Public and internal types for the pixclass API and pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// One scored label for an image.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Why a single item could not be classified. Workers report these and move on.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("path is not a regular file or does not exist")]
    NotAFile,
    #[error("file is empty")]
    Empty,
    #[error("file is too large ({size} bytes, limit {max})")]
    TooLarge { size: u64, max: u64 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("could not read or decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("{0}")]
    Inference(String),
}

/// Pipeline knobs that are fixed for the lifetime of a run.
#[derive(Clone, Copy, Debug)]
pub struct PipelineSettings {
    /// Worker count. Zero is treated as one.
    pub threads: usize,
    /// Predictions per result line.
    pub top_k: usize,
    /// Include wall-clock classification time in each result line.
    pub timing: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            threads: crate::utils::config::WorkerThreads::available(),
            top_k: crate::utils::config::DEFAULT_TOP_K,
            timing: false,
        }
    }
}

impl PipelineSettings {
    pub fn worker_count(&self) -> usize {
        self.threads.max(1)
    }
}

/// Per-worker counters returned when a worker thread exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Items that produced a result record.
    pub processed: usize,
    /// Items reported to the diagnostic sink.
    pub failed: usize,
}

/// Totals for one pipeline run, returned by [`run_pipeline`](crate::pipeline::run_pipeline).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items pushed onto the input queue by the producer.
    pub submitted: usize,
    pub processed: usize,
    pub failed: usize,
    /// Lines written to the result sink.
    pub emitted: usize,
}

/// Full options (CLI and config file merged).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Path to the JSON model file.
    pub model_path: Option<PathBuf>,
    /// Path to the class names file (one label per line).
    pub classes_path: Option<PathBuf>,
    pub top_k: usize,
    /// Override worker thread count. When None, uses available parallelism.
    pub threads: Option<usize>,
    pub timing: bool,
    /// Apply softmax to raw model scores.
    pub softmax: bool,
    /// Maximum image size in bytes.
    pub max_filesize: u64,
    /// Only accept streamed paths with a known image extension.
    pub extension_check: bool,
    /// Treat positional arguments as directories to walk.
    pub recursive: bool,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
    pub verbose: bool,
    /// Positional items (image paths, or roots when recursive).
    pub items: Vec<String>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            model_path: None,
            classes_path: None,
            top_k: crate::utils::config::DEFAULT_TOP_K,
            threads: None,
            timing: false,
            softmax: false,
            max_filesize: crate::utils::config::DEFAULT_MAX_FILESIZE,
            extension_check: true,
            recursive: false,
            follow_links: false,
            verbose: false,
            items: Vec::new(),
        }
    }
}

impl Opts {
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            threads: self
                .threads
                .unwrap_or_else(crate::utils::config::WorkerThreads::available),
            top_k: self.top_k,
            timing: self.timing,
        }
    }
}
