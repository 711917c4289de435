//! In-order traversal: visitor walks with early stop and a lazy iterator.

use super::node::{Node, NodeRef};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::iter::FusedIterator;
use std::ops::ControlFlow;

/// Walks the subtree in order, stopping as soon as `visitor` breaks.
pub(crate) fn walk<T, F>(node: Option<&NodeRef<T>>, visitor: &mut F) -> ControlFlow<()>
where
    F: FnMut(&T) -> ControlFlow<()>,
{
    let Some(node) = node else {
        return ControlFlow::Continue(());
    };
    walk(node.left.as_ref(), visitor)?;
    visitor(&node.element)?;
    walk(node.right.as_ref(), visitor)
}

/// Walks the elements `e` with `from <= e < to` in order, skipping subtrees
/// that lie entirely outside the interval.
pub(crate) fn walk_range<T, Q, F>(
    node: Option<&NodeRef<T>>,
    from: &Q,
    to: &Q,
    visitor: &mut F,
) -> ControlFlow<()>
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
    F: FnMut(&T) -> ControlFlow<()>,
{
    let Some(node) = node else {
        return ControlFlow::Continue(());
    };
    let element: &Q = node.element.borrow();
    let at_or_after_from = from <= element;
    let before_to = to > element;

    if at_or_after_from {
        walk_range(node.left.as_ref(), from, to, visitor)?;
    }
    if at_or_after_from && before_to {
        visitor(&node.element)?;
    }
    if before_to {
        walk_range(node.right.as_ref(), from, to, visitor)
    } else {
        ControlFlow::Continue(())
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// Inline capacity of the descent stack. The height of the tree is at most
/// `2 * log2(n + 1)`, so trees of up to 2^24 elements never spill to the heap.
const STACK_CAPACITY: usize = 48;

/// A lazy in-order iterator over the elements of a
/// [`PersistentTree`](super::PersistentTree).
///
/// The iterator keeps the path of pending ancestors, so it holds at most
/// tree-height entries at any time.
pub struct PersistentTreeIterator<'a, T> {
    stack: SmallVec<[&'a Node<T>; STACK_CAPACITY]>,
    remaining: usize,
}

impl<'a, T> PersistentTreeIterator<'a, T> {
    pub(crate) fn new(root: Option<&'a NodeRef<T>>, length: usize) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
            remaining: length,
        };
        iterator.push_left_spine(root);
        iterator
    }

    fn push_left_spine(&mut self, mut node: Option<&'a NodeRef<T>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_ref();
        }
    }
}

impl<'a, T> Iterator for PersistentTreeIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_ref());
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for PersistentTreeIterator<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for PersistentTreeIterator<'_, T> {}

impl<T> Clone for PersistentTreeIterator<'_, T> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::super::mutation::insert;
    use super::super::node::{Link, blacken};
    use super::*;
    use rstest::rstest;

    fn build(elements: &[i32]) -> Link<i32> {
        elements.iter().fold(None, |root, element| {
            insert(root, *element).root.map(blacken)
        })
    }

    fn collect_range(root: Option<&NodeRef<i32>>, from: i32, to: i32) -> Vec<i32> {
        let mut visited = Vec::new();
        let flow = walk_range(root, &from, &to, &mut |element: &i32| {
            visited.push(*element);
            ControlFlow::Continue(())
        });
        assert!(flow.is_continue());
        visited
    }

    #[rstest]
    fn test_walk_empty_makes_no_calls() {
        let mut calls = 0;
        let flow = walk::<i32, _>(None, &mut |_: &i32| {
            calls += 1;
            ControlFlow::Continue(())
        });
        assert!(flow.is_continue());
        assert_eq!(calls, 0);
    }

    #[rstest]
    fn test_walk_stops_at_first_break() {
        let root = build(&[5, 3, 8, 1, 4, 7, 9]);
        let mut visited = Vec::new();
        let flow = walk(root.as_ref(), &mut |element: &i32| {
            visited.push(*element);
            if *element == 4 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(flow.is_break());
        assert_eq!(visited, vec![1, 3, 4]);
    }

    #[rstest]
    #[case(0, 100, vec![1, 3, 4, 5, 7, 8, 9])]
    #[case(3, 8, vec![3, 4, 5, 7])]
    #[case(2, 3, vec![])]
    #[case(5, 5, vec![])]
    #[case(9, 10, vec![9])]
    fn test_walk_range_half_open(#[case] from: i32, #[case] to: i32, #[case] expected: Vec<i32>) {
        let root = build(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(collect_range(root.as_ref(), from, to), expected);
    }

    #[rstest]
    fn test_walk_range_stops_early() {
        let root = build(&(0..50).collect::<Vec<_>>());
        let mut visited = Vec::new();
        let flow = walk_range(root.as_ref(), &10, &40, &mut |element: &i32| {
            visited.push(*element);
            if visited.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(flow.is_break());
        assert_eq!(visited, vec![10, 11, 12]);
    }

    #[rstest]
    fn test_iterator_yields_sorted_with_exact_size() {
        let root = build(&[5, 3, 8, 1, 4, 7, 9]);
        let iterator = PersistentTreeIterator::new(root.as_ref(), 7);
        assert_eq!(iterator.len(), 7);
        let elements: Vec<i32> = iterator.copied().collect();
        assert_eq!(elements, vec![1, 3, 4, 5, 7, 8, 9]);
    }

    #[rstest]
    fn test_iterator_is_restartable_through_clone() {
        let root = build(&[2, 1, 3]);
        let mut iterator = PersistentTreeIterator::new(root.as_ref(), 3);
        assert_eq!(iterator.next(), Some(&1));
        let rest = iterator.clone();
        assert_eq!(iterator.copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(rest.copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[rstest]
    fn test_iterator_empty() {
        let mut iterator = PersistentTreeIterator::<i32>::new(None, 0);
        assert_eq!(iterator.next(), None);
        assert_eq!(iterator.next(), None);
    }
}
