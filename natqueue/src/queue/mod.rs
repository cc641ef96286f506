use std::cmp::Ordering;

use log::debug;

use crate::{alloc::Allocator, error::QueueError, natsort::natural_cmp};

mod arena;
mod mergesort;
mod reverse;

use arena::Arena;

/// A FIFO queue of owned strings backed by a singly linked chain.
///
/// Insertion at either end and removal at the head are O(1). The tail is
/// tracked as a slot index so that appending never walks the chain.
#[derive(Debug, Default)]
pub struct Queue {
    arena: Arena,
    head: Option<usize>,
    tail: Option<usize>,
    size: usize,
    alloc: Allocator,
}

/// How the merge step resolves two elements that compare equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Take the element from the left run, preserving insertion order.
    #[default]
    Stable,
    /// Take the left element only when it is strictly less.
    PreferRight,
}

impl TieBreak {
    fn takes_left(self, ordering: Ordering) -> bool {
        match self {
            TieBreak::Stable => ordering.is_le(),
            TieBreak::PreferRight => ordering.is_lt(),
        }
    }
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty queue whose storage requests go through `alloc`.
    /// The queue itself counts as one request.
    pub fn with_allocator(mut alloc: Allocator) -> Result<Self, QueueError> {
        alloc.grant()?;
        Ok(Self {
            alloc,
            ..Self::default()
        })
    }

    pub fn allocator(&self) -> &Allocator {
        &self.alloc
    }

    pub fn allocator_mut(&mut self) -> &mut Allocator {
        &mut self.alloc
    }

    /// Inserts a copy of `value` in front of the current head.
    ///
    /// On failure the queue is left exactly as it was.
    pub fn insert_head(&mut self, value: &str) -> Result<(), QueueError> {
        let idx = self.arena.insert(&mut self.alloc, value).map_err(|err| {
            debug!("insert_head failed: {err}");
            err
        })?;

        self.arena.set_next(idx, self.head);
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.size += 1;

        Ok(())
    }

    /// Appends a copy of `value` after the current tail.
    ///
    /// On failure the queue is left exactly as it was.
    pub fn insert_tail(&mut self, value: &str) -> Result<(), QueueError> {
        let idx = self.arena.insert(&mut self.alloc, value).map_err(|err| {
            debug!("insert_tail failed: {err}");
            err
        })?;

        match self.tail {
            Some(tail) => self.arena.set_next(tail, Some(idx)),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.size += 1;

        Ok(())
    }

    /// Removes the head element, copying its payload into `out` when given.
    ///
    /// At most `out.len() - 1` bytes are copied, followed by a `0`
    /// terminator. A truncated copy may end in the middle of a multi-byte
    /// character. An empty buffer receives nothing.
    pub fn remove_head(&mut self, out: Option<&mut [u8]>) -> Result<(), QueueError> {
        let element = self.detach_head().ok_or(QueueError::Empty)?;

        if let Some(out) = out {
            copy_truncated(&element.value, out);
        }

        Ok(())
    }

    /// Removes the head element and hands its payload back.
    pub fn pop_head(&mut self) -> Option<String> {
        self.detach_head().map(|element| element.value)
    }

    fn detach_head(&mut self) -> Option<arena::Element> {
        let head = self.head?;
        let element = self.arena.remove(head);

        self.head = element.next;
        self.size -= 1;
        if self.size == 0 {
            self.tail = None;
        }

        Some(element)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn head_value(&self) -> Option<&str> {
        self.head.map(|idx| self.arena.value(idx))
    }

    pub fn tail_value(&self) -> Option<&str> {
        self.tail.map(|idx| self.arena.value(idx))
    }

    /// Payloads from head to tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            arena: &self.arena,
            current: self.head,
        }
    }

    /// Appends every value in order, stopping at the first failed insertion.
    /// Values appended before the failure stay in the queue.
    pub fn try_extend<I, S>(&mut self, iter: I) -> Result<(), QueueError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        iter.into_iter().try_for_each(|value| self.insert_tail(value.as_ref()))
    }

    /// Releases every element; the queue stays usable.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
        self.size = 0;
    }

    /// Sorts ascending in natural order with a stable merge.
    pub fn sort(&mut self) {
        self.sort_by(natural_cmp, TieBreak::Stable)
    }

    pub fn sort_with(&mut self, ties: TieBreak) {
        self.sort_by(natural_cmp, ties)
    }

    pub fn sort_by<F>(&mut self, mut cmp: F, ties: TieBreak)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        if self.size < 2 {
            return;
        }

        self.head = mergesort::sort(&mut self.arena, self.head, &mut cmp, ties);

        // the merge does not track its last element
        let mut tail = self.head;
        while let Some(next) = tail.and_then(|idx| self.arena.next(idx)) {
            tail = Some(next);
        }
        self.tail = tail;

        debug!("sorted {} elements", self.size);
    }
}

fn copy_truncated(value: &str, out: &mut [u8]) {
    let Some(cap) = out.len().checked_sub(1) else {
        return;
    };
    let length = value.len().min(cap);
    out[..length].copy_from_slice(&value.as_bytes()[..length]);
    out[length] = 0;
}

pub struct Iter<'a> {
    arena: &'a Arena,
    current: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.current?;
        self.current = self.arena.next(idx);
        Some(self.arena.value(idx))
    }
}

impl<'a> IntoIterator for &'a Queue {
    type Item = &'a str;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds a queue on the default allocator, which never refuses a request.
///
/// # Panics
///
/// Panics only if the system allocator itself runs out, as the standard
/// collections do. Use [`Queue::try_extend`] to handle that case.
impl<S: AsRef<str>> FromIterator<S> for Queue {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut queue = Queue::new();
        if let Err(err) = queue.try_extend(iter) {
            panic!("could not build queue: {err}");
        }
        queue
    }
}

#[cfg(test)]
impl Queue {
    /// Walks the chain and checks the head/tail/size bookkeeping.
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.size == 0, self.head.is_none());
        assert_eq!(self.size == 0, self.tail.is_none());
        if self.size == 1 {
            assert_eq!(self.head, self.tail);
        }
        if let Some(tail) = self.tail {
            assert_eq!(self.arena.next(tail), None, "tail has a successor");
        }

        let mut reachable = 0;
        let mut last = None;
        let mut current = self.head;
        while let Some(idx) = current {
            reachable += 1;
            assert!(reachable <= self.arena.occupied(), "cycle in chain");
            last = Some(idx);
            current = self.arena.next(idx);
        }
        assert_eq!(reachable, self.size);
        assert_eq!(last, self.tail);
        assert_eq!(self.arena.occupied(), self.size, "unlinked element");
    }
}
