//! Handle-style operations over a queue that may be absent.
//!
//! Every call accepts `None` in place of a queue. Mutating calls report
//! [`QueueError::InvalidArgument`] for it, `size` reports zero and
//! `reverse`/`sort` do nothing.

use log::debug;

use crate::{alloc::Allocator, error::QueueError, queue::Queue};

pub fn create() -> Result<Queue, QueueError> {
    Queue::with_allocator(Allocator::default())
}

/// Releases the queue and every element it holds.
pub fn destroy(queue: Option<Queue>) {
    if let Some(queue) = queue {
        debug!("releasing queue of {} elements", queue.size());
        drop(queue);
    }
}

pub fn insert_head(queue: Option<&mut Queue>, value: &str) -> Result<(), QueueError> {
    queue.ok_or(QueueError::InvalidArgument)?.insert_head(value)
}

pub fn insert_tail(queue: Option<&mut Queue>, value: &str) -> Result<(), QueueError> {
    queue.ok_or(QueueError::InvalidArgument)?.insert_tail(value)
}

pub fn remove_head(queue: Option<&mut Queue>, out: Option<&mut [u8]>) -> Result<(), QueueError> {
    queue.ok_or(QueueError::InvalidArgument)?.remove_head(out)
}

pub fn size(queue: Option<&Queue>) -> usize {
    queue.map_or(0, Queue::size)
}

pub fn reverse(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.reverse();
    }
}

pub fn sort(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.sort();
    }
}
