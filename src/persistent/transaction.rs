//! Scoped mutation of a [`PersistentTree`].
//!
//! A [`Transaction`] wraps one snapshot of a tree, applies a batch of
//! inserts and deletes to it, and yields a new tree on [`commit`]. The tree
//! the transaction was started from is never affected.
//!
//! Nodes created by the transaction are owned by it alone, so repeated
//! changes to the same region of the tree update those nodes in place; a node
//! still shared with any other tree is copied before it is touched.
//!
//! [`commit`]: Transaction::commit

use super::PersistentTree;
use super::invariant::{self, InvariantViolation};
use super::mutation::{self, Outcome};
use super::node::{self, blacken};
use std::borrow::Borrow;
use std::marker::PhantomData;
use std::rc::Rc;

// =============================================================================
// Transaction Definition
// =============================================================================

/// A single-owner batch of changes to a [`PersistentTree`].
///
/// # Design
///
/// - Wraps a snapshot of the source tree, so the first copy-on-write step at
///   the root has already been taken
/// - The root is forced black after every change, so the wrapped tree
///   satisfies every invariant between calls
/// - `PhantomData<Rc<()>>` ensures `!Send` and `!Sync`; a transaction must
///   stay with one owner
///
/// # Examples
///
/// ```rust
/// use llrb::persistent::{PersistentTree, Transaction};
///
/// let mut transaction = Transaction::new();
/// transaction.insert(3);
/// transaction.insert(1);
/// transaction.insert(2);
/// assert_eq!(transaction.delete_min(), Some(1));
///
/// let tree: PersistentTree<i32> = transaction.commit();
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.min(), Some(&2));
/// ```
pub struct Transaction<T> {
    tree: PersistentTree<T>,
    /// Marker to ensure `!Send` and `!Sync`.
    _marker: PhantomData<Rc<()>>,
}

// Static assertions to verify Transaction is not Send/Sync
static_assertions::assert_not_impl_any!(Transaction<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(Transaction<String>: Send, Sync);

// Arc feature verification: trees are shareable, transactions are not
#[cfg(feature = "arc")]
mod arc_send_sync_verification {
    use super::{PersistentTree, Transaction};
    use std::sync::Arc;

    static_assertions::assert_impl_all!(PersistentTree<i32>: Send, Sync);
    static_assertions::assert_impl_all!(PersistentTree<Arc<String>>: Send, Sync);
    static_assertions::assert_not_impl_any!(Transaction<Arc<i32>>: Send, Sync);
}

impl<T> Transaction<T> {
    /// Creates a transaction over an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::from_snapshot(PersistentTree::new())
    }

    pub(crate) fn from_snapshot(tree: PersistentTree<T>) -> Self {
        log::trace!("transaction opened on tree of {} elements", tree.length);
        Self {
            tree,
            _marker: PhantomData,
        }
    }

    /// Returns the number of elements currently in the transaction's tree.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the transaction's tree contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the minimum element, or `None` if the tree is empty.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        self.tree.min()
    }

    /// Returns the maximum element, or `None` if the tree is empty.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        self.tree.max()
    }
}

impl<T: Ord> Transaction<T> {
    /// Returns the first element matching `query`.
    #[must_use]
    pub fn get<Q>(&self, query: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(query)
    }

    /// Returns `true` if an element matching `query` is stored.
    #[must_use]
    pub fn contains<Q>(&self, query: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains(query)
    }

    /// Checks the structural invariants of the transaction's current tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        invariant::verify(self.tree.root.as_ref(), self.tree.length)
    }
}

impl<T: Clone + Ord> Transaction<T> {
    /// Inserts `element`, replacing an equal element if one is stored.
    ///
    /// Returns the replaced element. To keep several elements that share a
    /// key, order them by something that tells them apart.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use llrb::persistent::Transaction;
    ///
    /// let mut transaction = Transaction::new();
    /// assert_eq!(transaction.insert(1), None);
    /// assert_eq!(transaction.insert(1), Some(1));
    /// assert_eq!(transaction.len(), 1);
    /// ```
    pub fn insert(&mut self, element: T) -> Option<T> {
        let outcome = mutation::insert(self.tree.root.take(), element);
        self.apply(outcome)
    }

    /// Deletes the first element matching `query` and returns it.
    ///
    /// Deleting an element that is not stored leaves the tree untouched.
    ///
    /// # Complexity
    ///
    /// O(log N)
    pub fn delete<Q>(&mut self, query: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if node::find(self.tree.root.as_ref(), query).is_none() {
            return None;
        }
        let root = self.tree.root.take()?;
        let outcome = mutation::delete(root, query);
        self.apply(outcome)
    }

    /// Deletes the minimum element and returns it.
    ///
    /// When the ordering admits equal elements the left-most one is deleted.
    pub fn delete_min(&mut self) -> Option<T> {
        let root = self.tree.root.take()?;
        let outcome = mutation::delete_min(root);
        self.apply(outcome)
    }

    /// Deletes the maximum element and returns it.
    ///
    /// When the ordering admits equal elements the right-most one is deleted.
    pub fn delete_max(&mut self) -> Option<T> {
        let root = self.tree.root.take()?;
        let outcome = mutation::delete_max(root);
        self.apply(outcome)
    }

    /// Finishes the transaction and returns the resulting tree.
    #[must_use]
    pub fn commit(mut self) -> PersistentTree<T> {
        self.tree.root = self.tree.root.take().map(blacken);
        log::trace!("transaction committed with {} elements", self.tree.length);
        self.tree
    }

    fn apply(&mut self, outcome: Outcome<T>) -> Option<T> {
        self.tree.length = outcome.change.apply(self.tree.length);
        self.tree.root = outcome.root.map(blacken);
        outcome.change.into_previous()
    }
}

impl<T: Clone + Ord> PersistentTree<T> {
    /// Consumes a tree that is not shared with anyone else into a transaction.
    ///
    /// Unlike [`transaction`](Self::transaction) this skips the root copy; if
    /// the tree is in fact shared, the first change copies the root anyway.
    #[must_use]
    pub fn into_transaction(self) -> Transaction<T> {
        Transaction::from_snapshot(self)
    }
}

impl<T> Default for Transaction<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Ord> Extend<T> for Transaction<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<T: Clone + Ord> FromIterator<T> for Transaction<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transaction = Self::new();
        transaction.extend(iter);
        transaction
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_operations_on_empty_transaction() {
        let mut transaction: Transaction<i32> = Transaction::new();
        assert_eq!(transaction.delete(&42), None);
        assert_eq!(transaction.delete_min(), None);
        assert_eq!(transaction.delete_max(), None);
        assert_eq!(transaction.get(&42), None);
        assert_eq!(transaction.min(), None);
        assert_eq!(transaction.max(), None);

        let tree = transaction.commit();
        assert!(tree.is_empty());
        assert_eq!(tree, PersistentTree::new());
    }

    #[rstest]
    fn test_insert_reports_replaced_element() {
        let mut transaction = Transaction::new();
        assert_eq!(transaction.insert("a".to_string()), None);
        assert_eq!(transaction.insert("a".to_string()), Some("a".to_string()));
        assert_eq!(transaction.len(), 1);
    }

    #[rstest]
    fn test_delete_returns_removed_element() {
        let mut transaction: Transaction<i32> = (0..10).collect();
        assert_eq!(transaction.delete(&4), Some(4));
        assert_eq!(transaction.delete(&4), None);
        assert_eq!(transaction.len(), 9);
        assert_eq!(transaction.verify(), Ok(()));
    }

    #[rstest]
    fn test_absent_delete_leaves_root_untouched() {
        let mut transaction: Transaction<i32> = (0..10).map(|element| element * 2).collect();
        let before = transaction.tree.root.clone();
        assert_eq!(transaction.delete(&7), None);

        let unchanged = match (before.as_ref(), transaction.tree.root.as_ref()) {
            (Some(before), Some(after)) => super::super::ReferenceCounter::ptr_eq(before, after),
            _ => false,
        };
        assert!(unchanged);
    }

    #[rstest]
    fn test_invariants_hold_between_calls() {
        let mut transaction = Transaction::new();
        for element in 0..300 {
            transaction.insert((element * 7919) % 301);
            assert_eq!(transaction.verify(), Ok(()));
        }
        for element in (0..301).step_by(3) {
            transaction.delete(&element);
            assert_eq!(transaction.verify(), Ok(()));
        }
    }

    #[rstest]
    fn test_into_transaction_reuses_tree() {
        let tree: PersistentTree<i32> = (0..5).collect();
        let mut transaction = tree.into_transaction();
        transaction.insert(5);
        let tree = transaction.commit();
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[rstest]
    fn test_commit_after_emptying() {
        let mut transaction: Transaction<i32> = (0..3).collect();
        transaction.delete_max();
        transaction.delete_max();
        transaction.delete_max();
        let tree = transaction.commit();
        assert!(tree.is_empty());
        assert!(tree.root.is_none());
    }
}
