//! Closeable FIFO shared between pipeline stages.
//!
//! Built on an unbounded crossbeam channel. The queue owns the only sender; closing drops it,
//! which disconnects the channel: consumers keep receiving buffered items and then see
//! end-of-stream (`None`) forever. Blocked consumers are parked by crossbeam (no spinning) and
//! all of them are woken on disconnect.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use std::fmt;
use std::sync::Mutex;

/// Returned by [`CloseableQueue::push`] after [`CloseableQueue::close`]; carries the rejected item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueClosed<T>(pub T);

impl<T> QueueClosed<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for QueueClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("push on a closed queue")
    }
}

impl<T: fmt::Debug> std::error::Error for QueueClosed<T> {}

/// Thread-safe unbounded FIFO with blocking [`pop`](Self::pop) and a one-way close signal.
pub struct CloseableQueue<T> {
    /// `None` once closed. Push and close serialize on this lock.
    tx: Mutex<Option<Sender<T>>>,
    rx: Receiver<T>,
}

impl<T> Default for CloseableQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CloseableQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx: Mutex::new(Some(tx)),
            rx,
        }
    }

    /// Append `item` at the tail and wake one blocked consumer.
    /// Fails with the item handed back if the queue is already closed; queue state is untouched.
    pub fn push(&self, item: T) -> Result<(), QueueClosed<T>> {
        let guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            // Unbounded and we hold the receiver, so send only fails on disconnect.
            Some(tx) => tx.send(item).map_err(|e| QueueClosed(e.into_inner())),
            None => Err(QueueClosed(item)),
        }
    }

    /// Remove and return the head. Blocks while the queue is empty and open.
    /// Returns `None` (end-of-stream) iff the queue is closed and drained; repeatable.
    pub fn pop(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Non-blocking variant of [`pop`](Self::pop): `None` when nothing is ready right now.
    pub fn try_pop(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Mark the queue closed and wake every blocked consumer. Idempotent.
    pub fn close(&self) {
        let mut guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        guard.take();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).is_none()
    }

    /// Items currently buffered (snapshot).
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Pop everything left after the queue was closed. Blocks until closed if it is still open.
    pub fn drain(&self) -> Vec<T> {
        let mut items = Vec::with_capacity(self.len());
        while let Some(item) = self.pop() {
            items.push(item);
        }
        items
    }
}

impl<T> fmt::Debug for CloseableQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseableQueue")
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Closes the wrapped queue when dropped, including on unwind.
pub(crate) struct CloseOnDrop<'a, T>(pub(crate) &'a CloseableQueue<T>);

impl<T> Drop for CloseOnDrop<'_, T> {
    fn drop(&mut self) {
        self.0.close();
    }
}
