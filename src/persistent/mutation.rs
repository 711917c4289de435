//! Copy-on-write insert and delete algorithms.
//!
//! Each algorithm consumes the handle of a subtree root and returns an
//! [`Outcome`]: the handle of the rebuilt subtree together with the
//! [`Change`] it made. Only nodes on the visited path are copied, and only
//! when another tree still holds them.

use super::ReferenceCounter;
use super::node::{
    Link, Node, NodeRef, fix_up, is_red, left_is_two_node, move_red_left, move_red_right,
    right_is_two_node, rotate_right,
};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

/// What a mutation did to the element count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Change<T> {
    /// A new element was added.
    Inserted,
    /// An equal element was overwritten; carries the previous one.
    Replaced(T),
    /// An element was removed; carries it.
    Removed(T),
    /// Nothing matched.
    Unchanged,
}

impl<T> Change<T> {
    /// Applies the size delta of this change to `length`.
    pub(crate) const fn apply(&self, length: usize) -> usize {
        match self {
            Self::Inserted => length + 1,
            Self::Removed(_) => length.saturating_sub(1),
            Self::Replaced(_) | Self::Unchanged => length,
        }
    }

    /// Returns the element that left the tree, if any.
    pub(crate) fn into_previous(self) -> Option<T> {
        match self {
            Self::Replaced(element) | Self::Removed(element) => Some(element),
            Self::Inserted | Self::Unchanged => None,
        }
    }
}

/// Result of one recursive mutation step.
pub(crate) struct Outcome<T> {
    pub(crate) root: Link<T>,
    pub(crate) change: Change<T>,
}

impl<T> Outcome<T> {
    const fn new(root: Link<T>, change: Change<T>) -> Self {
        Self { root, change }
    }
}

/// Detaches `node` from the tree and hands back its element.
fn remove<T: Clone>(node: NodeRef<T>) -> Outcome<T> {
    let element = ReferenceCounter::unwrap_or_clone(node).element;
    Outcome::new(None, Change::Removed(element))
}

fn matches<T, Q>(query: &Q, node: &Node<T>) -> bool
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    query.cmp(node.element.borrow()) == Ordering::Equal
}

/// Inserts `element` below `node`, replacing an equal element if present.
pub(crate) fn insert<T: Clone + Ord>(node: Link<T>, element: T) -> Outcome<T> {
    let Some(mut node) = node else {
        return Outcome::new(
            Some(ReferenceCounter::new(Node::new_red(element))),
            Change::Inserted,
        );
    };

    let inner = ReferenceCounter::make_mut(&mut node);
    let change = match element.cmp(&inner.element) {
        Ordering::Equal => Change::Replaced(mem::replace(&mut inner.element, element)),
        Ordering::Less => {
            let outcome = insert(inner.left.take(), element);
            inner.left = outcome.root;
            outcome.change
        }
        Ordering::Greater => {
            let outcome = insert(inner.right.take(), element);
            inner.right = outcome.root;
            outcome.change
        }
    };

    Outcome::new(Some(fix_up(node)), change)
}

/// Deletes the first element matching `query` below `node`.
///
/// The order of the steps on the right-hand side is significant: the red
/// left link is rotated away first, then the match is checked against the
/// node that ends up on top, and only then is the right child prepared.
pub(crate) fn delete<T, Q>(mut node: NodeRef<T>, query: &Q) -> Outcome<T>
where
    T: Clone + Borrow<Q>,
    Q: Ord + ?Sized,
{
    let mut change = Change::Unchanged;

    if query.cmp(node.element.borrow()) == Ordering::Less {
        if node.left.is_some() {
            if left_is_two_node(&node) {
                node = move_red_left(node);
            }
            let inner = ReferenceCounter::make_mut(&mut node);
            if let Some(left) = inner.left.take() {
                let outcome = delete(left, query);
                inner.left = outcome.root;
                change = outcome.change;
            }
        }
    } else {
        if is_red(node.left.as_ref()) {
            node = rotate_right(node);
        }
        if node.right.is_none() && matches(query, &node) {
            return remove(node);
        }
        if node.right.is_some() {
            if right_is_two_node(&node) {
                node = move_red_right(node);
            }
            let found = matches(query, &node);
            let inner = ReferenceCounter::make_mut(&mut node);
            if let Some(right) = inner.right.take() {
                if found {
                    let outcome = delete_min(right);
                    inner.right = outcome.root;
                    if let Change::Removed(successor) = outcome.change {
                        change = Change::Removed(mem::replace(&mut inner.element, successor));
                    }
                } else {
                    let outcome = delete(right, query);
                    inner.right = outcome.root;
                    change = outcome.change;
                }
            }
        }
    }

    Outcome::new(Some(fix_up(node)), change)
}

/// Deletes the left-most element below `node`.
pub(crate) fn delete_min<T: Clone>(mut node: NodeRef<T>) -> Outcome<T> {
    if node.left.is_none() {
        return remove(node);
    }
    if left_is_two_node(&node) {
        node = move_red_left(node);
    }

    let inner = ReferenceCounter::make_mut(&mut node);
    let change = match inner.left.take() {
        Some(left) => {
            let outcome = delete_min(left);
            inner.left = outcome.root;
            outcome.change
        }
        None => Change::Unchanged,
    };

    Outcome::new(Some(fix_up(node)), change)
}

/// Deletes the right-most element below `node`.
pub(crate) fn delete_max<T: Clone>(mut node: NodeRef<T>) -> Outcome<T> {
    if is_red(node.left.as_ref()) {
        node = rotate_right(node);
    }
    if node.right.is_none() {
        return remove(node);
    }
    if right_is_two_node(&node) {
        node = move_red_right(node);
    }

    let inner = ReferenceCounter::make_mut(&mut node);
    let change = match inner.right.take() {
        Some(right) => {
            let outcome = delete_max(right);
            inner.right = outcome.root;
            outcome.change
        }
        None => Change::Unchanged,
    };

    Outcome::new(Some(fix_up(node)), change)
}

// =============================================================================
// Tests
// =============================================================================
