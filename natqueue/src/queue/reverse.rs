use log::debug;

use super::Queue;

impl Queue {
    /// Reverses the queue in place by pointing every link at its
    /// predecessor. No element is created or released.
    pub fn reverse(&mut self) {
        if self.size < 2 {
            return;
        }

        let mut previous = None;
        let mut current = self.head;
        self.tail = self.head;

        while let Some(idx) = current {
            let element = self.arena.get_mut(idx);
            current = std::mem::replace(&mut element.next, previous);
            previous = Some(idx);
        }

        self.head = previous;
        debug!("reversed {} elements", self.size);
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rstest::rstest;

    use crate::queue::Queue;

    #[rstest]
    #[case(&[], &[])]
    #[case(&["a"], &["a"])]
    #[case(&["a", "b"], &["b", "a"])]
    #[case(&["a", "b", "c", "d", "e"], &["e", "d", "c", "b", "a"])]
    fn test_reverse(#[case] input: &[&str], #[case] expected: &[&str]) {
        let mut queue: Queue = input.iter().copied().collect();
        queue.reverse();
        assert_eq!(queue.iter().collect_vec(), expected);
        queue.assert_invariants();
    }

    #[test]
    fn test_reverse_keeps_element_storage() {
        let mut queue: Queue = ["x", "y", "z"].into_iter().collect();
        let requests = queue.allocator().requests();
        queue.reverse();
        assert_eq!(queue.allocator().requests(), requests);
        assert_eq!(queue.head_value(), Some("z"));
        assert_eq!(queue.tail_value(), Some("x"));
    }

    #[test]
    fn test_reverse_twice_restores_order() {
        let values = ["10", "9", "alpha", "beta", "1"];
        let mut queue: Queue = values.into_iter().collect();
        queue.reverse();
        queue.reverse();
        assert_eq!(queue.iter().collect_vec(), values);
        queue.assert_invariants();
    }

    #[test]
    fn test_append_after_reverse_uses_new_tail() {
        let mut queue: Queue = ["a", "b", "c"].into_iter().collect();
        queue.reverse();
        queue.insert_tail("d").unwrap();
        assert_eq!(queue.iter().collect_vec(), ["c", "b", "a", "d"]);
        queue.assert_invariants();
    }
}
