use std::cmp::Ordering;

use super::{arena::Arena, TieBreak};

/// Sorts the chain starting at `head` and returns the new first element.
/// Elements are only relinked, never copied.
pub(crate) fn sort<F>(
    arena: &mut Arena,
    head: Option<usize>,
    cmp: &mut F,
    ties: TieBreak,
) -> Option<usize>
where
    F: FnMut(&str, &str) -> Ordering,
{
    let first = head?;
    if arena.next(first).is_none() {
        return head;
    }

    let second = split(arena, first);
    let left = sort(arena, Some(first), cmp, ties);
    let right = sort(arena, second, cmp, ties);

    merge(arena, left, right, cmp, ties)
}

/// Detaches the back half of a chain of two or more elements and returns
/// its first element. The slow cursor moves one link per step while the
/// fast one moves two, so no length count is needed.
fn split(arena: &mut Arena, head: usize) -> Option<usize> {
    let mut slow = head;
    let mut fast = arena.next(head);

    while let Some(after_fast) = fast.and_then(|idx| arena.next(idx)) {
        slow = match arena.next(slow) {
            Some(idx) => idx,
            None => break,
        };
        fast = arena.next(after_fast);
    }

    let second = arena.next(slow);
    arena.set_next(slow, None);
    second
}

fn merge<F>(
    arena: &mut Arena,
    mut left: Option<usize>,
    mut right: Option<usize>,
    cmp: &mut F,
    ties: TieBreak,
) -> Option<usize>
where
    F: FnMut(&str, &str) -> Ordering,
{
    let mut head = None;
    let mut last: Option<usize> = None;

    loop {
        let picked = match (left, right) {
            (Some(l), Some(r)) => {
                if ties.takes_left(cmp(arena.value(l), arena.value(r))) {
                    left = arena.next(l);
                    l
                } else {
                    right = arena.next(r);
                    r
                }
            }
            // the remaining run is already sorted
            (rest, None) | (None, rest) => {
                match last {
                    Some(last) => arena.set_next(last, rest),
                    None => head = rest,
                }
                return head;
            }
        };

        match last {
            Some(last) => arena.set_next(last, Some(picked)),
            None => head = Some(picked),
        }
        last = Some(picked);
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use crate::{
        alloc::Allocator,
        natsort::natural_cmp,
        queue::{arena::Arena, TieBreak},
    };

    fn chain(arena: &mut Arena, values: &[&str]) -> Option<usize> {
        let mut alloc = Allocator::default();
        let indices: Vec<usize> = values
            .iter()
            .map(|value| arena.insert(&mut alloc, value).unwrap())
            .collect();
        for pair in indices.windows(2) {
            arena.set_next(pair[0], Some(pair[1]));
        }
        indices.first().copied()
    }

    fn collect(arena: &Arena, mut current: Option<usize>) -> Vec<String> {
        let mut values = vec![];
        while let Some(idx) = current {
            values.push(arena.value(idx).to_owned());
            current = arena.next(idx);
        }
        values
    }

    #[test]
    fn test_split_halves() {
        let mut arena = Arena::default();
        let head = chain(&mut arena, &["1", "2", "3", "4", "5"]).unwrap();
        let second = super::split(&mut arena, head);
        assert_eq!(collect(&arena, Some(head)), ["1", "2", "3"]);
        assert_eq!(collect(&arena, second), ["4", "5"]);
    }

    #[test]
    fn test_split_pair() {
        let mut arena = Arena::default();
        let head = chain(&mut arena, &["1", "2"]).unwrap();
        let second = super::split(&mut arena, head);
        assert_eq!(collect(&arena, Some(head)), ["1"]);
        assert_eq!(collect(&arena, second), ["2"]);
    }

    #[test]
    fn test_merge_appends_remainder() {
        let mut arena = Arena::default();
        let left = chain(&mut arena, &["a", "d", "e", "f"]);
        let right = chain(&mut arena, &["b", "c"]);
        let head = super::merge(&mut arena, left, right, &mut natural_cmp, TieBreak::Stable);
        assert_eq!(collect(&arena, head), ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_tie_break_picks_run() {
        let by_key = |a: &str, b: &str| -> Ordering { a[..1].cmp(&b[..1]) };

        let mut arena = Arena::default();
        let head = chain(&mut arena, &["k-left", "k-right"]);
        let stable = super::sort(&mut arena, head, &mut { by_key }, TieBreak::Stable);
        assert_eq!(collect(&arena, stable), ["k-left", "k-right"]);

        let mut arena = Arena::default();
        let head = chain(&mut arena, &["k-left", "k-right"]);
        let inherited = super::sort(&mut arena, head, &mut { by_key }, TieBreak::PreferRight);
        assert_eq!(collect(&arena, inherited), ["k-right", "k-left"]);
    }
}
