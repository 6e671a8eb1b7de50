//! Pipeline wiring: the two shared queues and the thread handles the orchestrator joins.

use anyhow::Result;
use std::sync::Arc;
use std::thread::JoinHandle;

use super::queue::CloseableQueue;
use crate::WorkerStats;

/// Where work items come from. Chosen once per run by the caller.
pub enum ItemSource {
    /// Known list, pushed and closed on the orchestrating thread.
    Direct(Vec<String>),
    /// Read on a producer thread; items failing `filter` are dropped silently.
    Stream {
        source: Box<dyn Iterator<Item = String> + Send>,
        filter: Box<dyn Fn(&str) -> bool + Send>,
    },
}

impl ItemSource {
    /// Streaming source that accepts every item.
    pub fn stream<I>(source: I) -> Self
    where
        I: Iterator<Item = String> + Send + 'static,
    {
        ItemSource::Stream {
            source: Box::new(source),
            filter: Box::new(|_: &str| true),
        }
    }

    /// Streaming source with a filter predicate applied once per item before enqueue.
    pub fn filtered<I, F>(source: I, filter: F) -> Self
    where
        I: Iterator<Item = String> + Send + 'static,
        F: Fn(&str) -> bool + Send + 'static,
    {
        ItemSource::Stream {
            source: Box::new(source),
            filter: Box::new(filter),
        }
    }
}

/// Input queue (producer → workers) and output queue (workers → collector).
/// Created once per run and shared by every stage wired to them.
pub struct PipelineQueues {
    pub input: Arc<CloseableQueue<String>>,
    pub output: Arc<CloseableQueue<String>>,
}

pub fn create_pipeline_queues() -> PipelineQueues {
    PipelineQueues {
        input: Arc::new(CloseableQueue::new()),
        output: Arc::new(CloseableQueue::new()),
    }
}

/// Threads started by the orchestrator, joined in shutdown order: workers, then collector.
pub struct PipelineHandles {
    pub collector_handle: JoinHandle<Result<usize>>,
    pub worker_handles: Vec<JoinHandle<WorkerStats>>,
}
