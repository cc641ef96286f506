use crate::{alloc::Allocator, error::QueueError};

#[derive(Debug)]
pub(crate) struct Element {
    pub(crate) value: String,
    pub(crate) next: Option<usize>,
}

#[derive(Debug)]
enum Slot {
    Occupied(Element),
    Vacant { next_free: Option<usize> },
}

/// Element storage addressed by stable slot indices. Vacant slots are
/// threaded on a free list and handed out again before the vector grows.
#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Option<usize>,
    occupied: usize,
}

impl Arena {
    /// Builds a detached element holding a copy of `value`.
    ///
    /// Either the element is fully placed and its index returned, or nothing
    /// observable changes: the slot is secured before the payload is copied,
    /// and a secured slot is only consumed once the payload exists.
    pub(crate) fn insert(
        &mut self,
        alloc: &mut Allocator,
        value: &str,
    ) -> Result<usize, QueueError> {
        alloc.grant()?;
        if self.free.is_none() {
            self.slots.try_reserve(1)?;
        }
        let value = alloc.copy_payload(value)?;
        let element = Element { value, next: None };

        let idx = match self.free {
            Some(idx) => {
                self.free = match self.slots[idx] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot {idx}"),
                };
                self.slots[idx] = Slot::Occupied(element);
                idx
            }
            None => {
                self.slots.push(Slot::Occupied(element));
                self.slots.len() - 1
            }
        };
        self.occupied += 1;
        Ok(idx)
    }

    /// Releases the element at `idx`, returning it to the caller.
    pub(crate) fn remove(&mut self, idx: usize) -> Element {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match std::mem::replace(&mut self.slots[idx], vacant) {
            Slot::Occupied(element) => {
                self.free = Some(idx);
                self.occupied -= 1;
                element
            }
            Slot::Vacant { .. } => unreachable!("removing vacant slot {idx}"),
        }
    }

    pub(crate) fn get(&self, idx: usize) -> &Element {
        match &self.slots[idx] {
            Slot::Occupied(element) => element,
            Slot::Vacant { .. } => unreachable!("link to vacant slot {idx}"),
        }
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> &mut Element {
        match &mut self.slots[idx] {
            Slot::Occupied(element) => element,
            Slot::Vacant { .. } => unreachable!("link to vacant slot {idx}"),
        }
    }

    pub(crate) fn next(&self, idx: usize) -> Option<usize> {
        self.get(idx).next
    }

    pub(crate) fn set_next(&mut self, idx: usize, next: Option<usize>) {
        self.get_mut(idx).next = next;
    }

    pub(crate) fn value(&self, idx: usize) -> &str {
        &self.get(idx).value
    }

    /// Number of live elements, whether or not they are linked.
    pub(crate) fn occupied(&self) -> usize {
        self.occupied
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.occupied = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::Arena;
    use crate::{
        alloc::{Allocator, FailPolicy},
        error::QueueError,
    };

    #[test]
    fn test_vacated_slots_are_reused() {
        let mut alloc = Allocator::default();
        let mut arena = Arena::default();
        let a = arena.insert(&mut alloc, "a").unwrap();
        let b = arena.insert(&mut alloc, "b").unwrap();

        assert_eq!(arena.remove(a).value, "a");
        let c = arena.insert(&mut alloc, "c").unwrap();

        assert_eq!(c, a);
        assert_eq!(arena.value(b), "b");
        assert_eq!(arena.value(c), "c");
        assert_eq!(arena.occupied(), 2);
    }

    #[test]
    fn test_failed_payload_copy_leaves_free_list_intact() {
        let mut alloc = Allocator::default();
        let mut arena = Arena::default();
        let a = arena.insert(&mut alloc, "a").unwrap();
        arena.remove(a);

        // slot request granted, payload copy refused
        alloc.set_policy(FailPolicy::After(1));
        assert_eq!(arena.insert(&mut alloc, "b"), Err(QueueError::AllocationFailure));
        assert_eq!(arena.occupied(), 0);
        assert_eq!(arena.free, Some(a));

        alloc.set_policy(FailPolicy::Never);
        assert_eq!(arena.insert(&mut alloc, "b"), Ok(a));
    }
}
