//! Persistent (immutable) ordered set based on a left-leaning red-black tree.
//!
//! This module provides [`PersistentTree`], an immutable snapshot of an
//! ordered collection. Trees are never modified after they are published:
//! all changes go through a [`Transaction`], whose commit yields a new tree
//! sharing every untouched subtree with the tree it started from.
//!
//! # Overview
//!
//! - O(log N) get
//! - O(log N) insert / delete / delete-min / delete-max (via [`Transaction`])
//! - O(log N) min/max
//! - O(log N + k) range walks where k is the number of visited elements
//! - O(1) len, `is_empty`, clone and snapshot
//!
//! # Examples
//!
//! ```rust
//! use llrb::persistent::PersistentTree;
//!
//! let tree: PersistentTree<i32> = [3, 1, 2].into_iter().collect();
//!
//! // Elements are always in sorted order
//! let elements: Vec<&i32> = tree.iter().collect();
//! assert_eq!(elements, vec![&1, &2, &3]);
//!
//! // Changes go through a transaction and leave the original untouched
//! let mut transaction = tree.transaction();
//! transaction.insert(4);
//! transaction.delete(&1);
//! let updated = transaction.commit();
//!
//! assert_eq!(tree.len(), 3);
//! assert_eq!(updated.len(), 3);
//! assert_eq!(updated.min(), Some(&2));
//! ```

use super::ReferenceCounter;
use super::invariant::{self, InvariantViolation};
use super::node::{self, Link, Node};
use super::transaction::Transaction;
use super::traversal::{self, PersistentTreeIterator};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::ControlFlow;

// =============================================================================
// PersistentTree Definition
// =============================================================================

/// A persistent (immutable) ordered collection based on a left-leaning
/// red-black tree.
///
/// Element order is defined by `T: Ord`. Lookups accept any borrowed form
/// of the element whose ordering agrees with `T`'s, which makes the tree
/// usable as a map by ordering entries on their key only.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log N)          |
/// | `min`/`max`    | O(log N)          |
/// | `for_each`     | O(N)              |
/// | `range`        | O(log N + k)      |
/// | `snapshot`     | O(1)              |
/// | `transaction`  | O(1)              |
/// | `len`          | O(1)              |
///
/// # Examples
///
/// ```rust
/// use llrb::persistent::PersistentTree;
///
/// let tree = PersistentTree::singleton(42);
/// assert_eq!(tree.get(&42), Some(&42));
/// assert_eq!(tree.get(&7), None);
/// ```
pub struct PersistentTree<T> {
    /// Root node of the tree
    pub(crate) root: Link<T>,
    /// Number of elements
    pub(crate) length: usize,
}

impl<T> PersistentTree<T> {
    /// Creates a new empty tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use llrb::persistent::PersistentTree;
    ///
    /// let tree: PersistentTree<i32> = PersistentTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of elements in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the minimum element, or `None` for an empty tree.
    ///
    /// When the ordering admits equal elements this is the left-most one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use llrb::persistent::PersistentTree;
    ///
    /// let tree: PersistentTree<i32> = [3, 1, 2].into_iter().collect();
    /// assert_eq!(tree.min(), Some(&1));
    /// ```
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        node::min(self.root.as_ref())
    }

    /// Returns the maximum element, or `None` for an empty tree.
    ///
    /// When the ordering admits equal elements this is the right-most one.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        node::max(self.root.as_ref())
    }

    /// Calls `visitor` on every element in ascending order.
    ///
    /// The walk stops as soon as `visitor` returns [`ControlFlow::Break`], and
    /// the result tells whether that happened.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use llrb::persistent::PersistentTree;
    /// use std::ops::ControlFlow;
    ///
    /// let tree: PersistentTree<i32> = (1..=10).collect();
    ///
    /// let mut sum = 0;
    /// let flow = tree.for_each(|element| {
    ///     sum += element;
    ///     if sum > 10 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
    /// });
    ///
    /// assert!(flow.is_break());
    /// assert_eq!(sum, 15);
    /// ```
    pub fn for_each<F>(&self, mut visitor: F) -> ControlFlow<()>
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        traversal::walk(self.root.as_ref(), &mut visitor)
    }

    /// Returns a lazy iterator over the elements in ascending order.
    #[must_use]
    pub fn iter(&self) -> PersistentTreeIterator<'_, T> {
        PersistentTreeIterator::new(self.root.as_ref(), self.length)
    }
}

impl<T: Ord> PersistentTree<T> {
    /// Returns the first element matching `query`.
    ///
    /// The query may be any borrowed form of the element type, but the
    /// ordering on the borrowed form must match the ordering of the element.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn get<Q>(&self, query: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        node::find(self.root.as_ref(), query)
    }

    /// Returns `true` if an element matching `query` is stored.
    #[must_use]
    pub fn contains<Q>(&self, query: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(query).is_some()
    }

    /// Calls `visitor` in ascending order on every element `e` with
    /// `from <= e < to`.
    ///
    /// The walk stops as soon as `visitor` returns [`ControlFlow::Break`], and
    /// the result tells whether that happened.
    ///
    /// # Panics
    ///
    /// Panics if `from` is greater than `to`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use llrb::persistent::PersistentTree;
    /// use std::ops::ControlFlow;
    ///
    /// let tree: PersistentTree<i32> = (0..10).collect();
    ///
    /// let mut visited = Vec::new();
    /// let _ = tree.range(&3, &6, |element| {
    ///     visited.push(*element);
    ///     ControlFlow::Continue(())
    /// });
    /// assert_eq!(visited, vec![3, 4, 5]);
    /// ```
    pub fn range<Q, F>(&self, from: &Q, to: &Q, mut visitor: F) -> ControlFlow<()>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnMut(&T) -> ControlFlow<()>,
    {
        assert!(from <= to, "inverted range");
        traversal::walk_range(self.root.as_ref(), from, to, &mut visitor)
    }

    /// Checks the structural invariants of the tree.
    ///
    /// A tree produced by this crate always passes; the check exists for
    /// tests and for diagnosing orderings that are not consistent.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        invariant::verify(self.root.as_ref(), self.length)
    }
}

impl<T: Clone + Ord> PersistentTree<T> {
    /// Creates a tree containing a single element.
    #[must_use]
    pub fn singleton(element: T) -> Self {
        let mut transaction = Transaction::new();
        transaction.insert(element);
        transaction.commit()
    }

    /// Returns a new tree whose root node is a private copy, sharing all
    /// children with `self`.
    ///
    /// Mutating the copy can therefore never reach a node that is visible
    /// through `self`.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        Self {
            root: self
                .root
                .as_ref()
                .map(|root| ReferenceCounter::new(Node::clone(root))),
            length: self.length,
        }
    }

    /// Starts a transaction on a snapshot of this tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use llrb::persistent::PersistentTree;
    ///
    /// let tree = PersistentTree::singleton(1);
    /// let mut transaction = tree.transaction();
    /// transaction.insert(2);
    /// let updated = transaction.commit();
    ///
    /// assert_eq!(tree.len(), 1);
    /// assert_eq!(updated.len(), 2);
    /// ```
    #[must_use]
    pub fn transaction(&self) -> Transaction<T> {
        Transaction::from_snapshot(self.snapshot())
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Clone for PersistentTree<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            length: self.length,
        }
    }
}

impl<T> Default for PersistentTree<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Ord> FromIterator<T> for PersistentTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transaction = Transaction::new();
        transaction.extend(iter);
        transaction.commit()
    }
}

impl<'a, T> IntoIterator for &'a PersistentTree<T> {
    type Item = &'a T;
    type IntoIter = PersistentTreeIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentTree<T> {}

/// Hashes the length followed by every element in ascending order, so equal
/// trees hash equally regardless of their shape.
impl<T: Hash> Hash for PersistentTree<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentTree<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentTree<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::hash_map::DefaultHasher;

    fn collect(tree: &PersistentTree<i32>) -> Vec<i32> {
        let mut elements = Vec::new();
        let _ = tree.for_each(|element| {
            elements.push(*element);
            ControlFlow::Continue(())
        });
        elements
    }

    fn hash_of(tree: &PersistentTree<i32>) -> u64 {
        let mut hasher = DefaultHasher::new();
        tree.hash(&mut hasher);
        hasher.finish()
    }

    // =========================================================================
    // Display Tests
    // =========================================================================

    #[rstest]
    fn test_display_empty_tree() {
        let tree: PersistentTree<i32> = PersistentTree::new();
        assert_eq!(format!("{tree}"), "{}");
    }

    #[rstest]
    fn test_display_sorted() {
        let tree: PersistentTree<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(format!("{tree}"), "{1, 2, 3}");
        assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
    }

    // =========================================================================
    // Accessor Tests
    // =========================================================================

    #[rstest]
    fn test_new_creates_empty() {
        let tree: PersistentTree<i32> = PersistentTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.min(), None);
        assert_eq!(tree.max(), None);
        assert_eq!(tree.get(&42), None);
        assert_eq!(tree.verify(), Ok(()));
    }

    #[rstest]
    fn test_singleton() {
        let tree = PersistentTree::singleton(42);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&42), Some(&42));
        assert!(tree.contains(&42));
        assert!(!tree.contains(&41));
    }

    #[rstest]
    fn test_min_max() {
        let tree: PersistentTree<i32> = [5, -3, 12, 0].into_iter().collect();
        assert_eq!(tree.min(), Some(&-3));
        assert_eq!(tree.max(), Some(&12));
    }

    #[rstest]
    fn test_get_with_borrowed_query() {
        let tree: PersistentTree<String> = ["pear".to_string(), "apple".to_string()]
            .into_iter()
            .collect();
        assert_eq!(tree.get("apple"), Some(&"apple".to_string()));
        assert_eq!(tree.get("plum"), None);
    }

    // =========================================================================
    // Traversal Tests
    // =========================================================================

    #[rstest]
    fn test_for_each_on_empty_tree_makes_no_calls() {
        let tree: PersistentTree<i32> = PersistentTree::new();
        let mut calls = 0;
        let flow = tree.for_each(|_| {
            calls += 1;
            ControlFlow::Continue(())
        });
        assert!(flow.is_continue());
        assert_eq!(calls, 0);
    }

    #[rstest]
    fn test_range_matches_filtered_for_each() {
        let tree: PersistentTree<i32> = (0..100).map(|element| element * 3).collect();
        let mut visited = Vec::new();
        let flow = tree.range(&10, &40, |element| {
            visited.push(*element);
            ControlFlow::Continue(())
        });
        assert!(flow.is_continue());

        let expected: Vec<i32> = collect(&tree)
            .into_iter()
            .filter(|element| (10..40).contains(element))
            .collect();
        assert_eq!(visited, expected);
    }

    #[rstest]
    fn test_range_with_equal_bounds_is_empty() {
        let tree: PersistentTree<i32> = (0..10).collect();
        let mut calls = 0;
        let _ = tree.range(&4, &4, |_| {
            calls += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(calls, 0);
    }

    #[rstest]
    #[should_panic(expected = "inverted range")]
    fn test_range_inverted_panics() {
        let tree: PersistentTree<i32> = (0..10).collect();
        let _ = tree.range(&5, &2, |_| ControlFlow::Continue(()));
    }

    #[rstest]
    fn test_iter_matches_for_each() {
        let tree: PersistentTree<i32> = [9, 4, 7, 1, 8].into_iter().collect();
        let iterated: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(iterated, collect(&tree));
        assert_eq!(tree.iter().len(), 5);
    }

    // =========================================================================
    // Snapshot Tests
    // =========================================================================

    #[rstest]
    fn test_snapshot_copies_root_only() {
        let tree: PersistentTree<i32> = (0..7).collect();
        let snapshot = tree.snapshot();

        let (Some(root), Some(copy)) = (tree.root.as_ref(), snapshot.root.as_ref()) else {
            panic!("both trees should have a root");
        };
        assert!(!ReferenceCounter::ptr_eq(root, copy));
        let shared_left = match (root.left.as_ref(), copy.left.as_ref()) {
            (Some(left), Some(copy_left)) => ReferenceCounter::ptr_eq(left, copy_left),
            _ => false,
        };
        assert!(shared_left);
        assert_eq!(snapshot, tree);
    }

    #[rstest]
    fn test_snapshot_of_empty_tree() {
        let tree: PersistentTree<i32> = PersistentTree::new();
        let snapshot = tree.snapshot();
        assert!(snapshot.is_empty());
        assert!(snapshot.root.is_none());
    }

    // =========================================================================
    // Equality and Hash Tests
    // =========================================================================

    #[rstest]
    fn test_eq_ignores_insertion_order() {
        let ascending: PersistentTree<i32> = (0..50).collect();
        let descending: PersistentTree<i32> = (0..50).rev().collect();
        assert_eq!(ascending, descending);
        assert_eq!(hash_of(&ascending), hash_of(&descending));
    }

    #[rstest]
    fn test_ne_for_different_elements() {
        let first: PersistentTree<i32> = [1, 2, 3].into_iter().collect();
        let second: PersistentTree<i32> = [1, 2, 4].into_iter().collect();
        assert_ne!(first, second);
    }
}
