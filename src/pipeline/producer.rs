//! Producers: fill the input queue and close it once the source is exhausted.

use log::{debug, warn};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use super::queue::{CloseOnDrop, CloseableQueue};
use crate::utils::config::PackagePaths;

/// Direct mode: push a known list of items, then close the queue. Returns the number pushed.
pub fn push_direct<I>(queue: &CloseableQueue<String>, items: I) -> usize
where
    I: IntoIterator<Item = String>,
{
    let _close = CloseOnDrop(queue);
    let mut count = 0_usize;
    for item in items {
        if queue.push(item).is_err() {
            warn!("input queue closed before the producer finished");
            break;
        }
        count += 1;
    }
    debug!("producer: pushed {} items (direct)", count);
    count
}

/// Streaming mode: drain `source` on a dedicated thread, pushing items that pass `filter`.
/// The queue is closed when the source ends, also when nothing passed the filter.
/// The handle yields the number of items pushed.
pub fn spawn_stream_producer<I, F>(
    queue: Arc<CloseableQueue<String>>,
    source: I,
    filter: F,
) -> std::io::Result<JoinHandle<usize>>
where
    I: Iterator<Item = String> + Send + 'static,
    F: Fn(&str) -> bool + Send + 'static,
{
    thread::Builder::new()
        .name(PackagePaths::get().producer_thread_name())
        .spawn(move || run_stream_loop(&queue, source, filter))
}

/// Body of the streaming producer; runs on the caller's thread. Closes `queue` before returning.
pub fn run_stream_loop<I, F>(queue: &CloseableQueue<String>, source: I, filter: F) -> usize
where
    I: Iterator<Item = String>,
    F: Fn(&str) -> bool,
{
    let _close = CloseOnDrop(queue);
    let mut count = 0_usize;
    let mut dropped = 0_usize;
    for item in source {
        if !filter(&item) {
            dropped += 1;
            continue;
        }
        if queue.push(item).is_err() {
            warn!("input queue closed before the producer finished");
            break;
        }
        count += 1;
    }
    debug!(
        "producer: source exhausted, pushed {} items, filtered out {}",
        count, dropped
    );
    count
}

/// Items from a line-oriented reader: one per `\n`-terminated line, trailing `\r` stripped.
/// Blank lines and lines that are not valid UTF-8 are skipped. Stops at the first read error.
pub fn line_source<R>(reader: R) -> impl Iterator<Item = String>
where
    R: BufRead,
{
    reader
        .split(b'\n')
        .map_while(|line| match line {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("stopped reading input: {}", e);
                None
            }
        })
        .filter_map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            String::from_utf8(bytes).ok()
        })
        .filter(|line| !line.trim().is_empty())
}

/// Every regular file under `roots`, as path strings. Walk errors are logged and skipped.
pub fn walk_source(roots: Vec<PathBuf>, follow_links: bool) -> impl Iterator<Item = String> {
    roots.into_iter().flat_map(move |root| {
        WalkDir::new(root)
            .follow_links(follow_links)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("skipping unreadable path: {}", err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.into_path().into_os_string().into_string().ok())
    })
}
