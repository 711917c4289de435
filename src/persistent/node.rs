//! Tree cells and the balancing primitives of the left-leaning red-black tree.
//!
//! Every primitive in this module takes ownership of a node handle and
//! returns the handle of the (possibly new) subtree root. Mutable access to a
//! node is only ever obtained through [`ReferenceCounter::make_mut`], which
//! copies the node first whenever any other tree still holds it. This is what
//! keeps previously committed trees intact.
//!
//! # Color
//!
//! The color of a node describes the link from its parent. A red link glues
//! a node to its parent into a 3-node of the equivalent 2-3 tree.

use super::ReferenceCounter;
use std::borrow::Borrow;
use std::cmp::Ordering;

// =============================================================================
// Color Definition
// =============================================================================

/// The color of the link pointing at a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns the opposite color.
    pub(crate) const fn flipped(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }
}

// =============================================================================
// Node Definition
// =============================================================================

/// Shared handle to a node.
pub(crate) type NodeRef<T> = ReferenceCounter<Node<T>>;

/// An optional child (or root) of the tree.
pub(crate) type Link<T> = Option<NodeRef<T>>;

/// Internal node structure for the left-leaning red-black tree.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) element: T,
    pub(crate) color: Color,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    /// Creates a new red node with no children.
    pub(crate) const fn new_red(element: T) -> Self {
        Self {
            element,
            color: Color::Red,
            left: None,
            right: None,
        }
    }

    /// Checks if this node is red.
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    fn left_left_is_red(&self) -> bool {
        self.left
            .as_ref()
            .is_some_and(|left| is_red(left.left.as_ref()))
    }

    fn right_left_is_red(&self) -> bool {
        self.right
            .as_ref()
            .is_some_and(|right| is_red(right.left.as_ref()))
    }
}

/// Helper function to check if an optional node is red. Missing nodes are black.
pub(crate) fn is_red<T>(node: Option<&NodeRef<T>>) -> bool {
    node.is_some_and(|node| node.is_red())
}

/// Returns true when the left child is a 2-node, i.e. neither it nor its
/// left child is red. Descending into such a child during deletion requires
/// [`move_red_left`] first.
pub(crate) fn left_is_two_node<T>(node: &Node<T>) -> bool {
    !is_red(node.left.as_ref()) && !node.left_left_is_red()
}

/// Right-hand counterpart of [`left_is_two_node`].
pub(crate) fn right_is_two_node<T>(node: &Node<T>) -> bool {
    !is_red(node.right.as_ref()) && !node.right_left_is_red()
}

// =============================================================================
// Balancing Engine
// =============================================================================

//              node                       x
//              /  \                      / \
//             /    (r)                 (r)  \
//            /       \                 /     \
//          left       x             node      xr
//                    / \            /  \
//                  xl   xr       left   xl
//
/// Rotates the subtree left around `node`.
///
/// The new root takes over the color of `node` and `node` becomes red.
/// A node without a right child is returned unchanged.
pub(crate) fn rotate_left<T: Clone>(mut node: NodeRef<T>) -> NodeRef<T> {
    let inner = ReferenceCounter::make_mut(&mut node);
    let Some(mut root) = inner.right.take() else {
        return node;
    };
    let pivot = ReferenceCounter::make_mut(&mut root);
    inner.right = pivot.left.take();
    pivot.color = inner.color;
    inner.color = Color::Red;
    pivot.left = Some(node);
    root
}

//              node                       x
//              /  \                      / \
//            (r)   \                   (r)  \
//           /       \                 /      \
//          x       right             xl      node
//         / \                                / \
//       xl   xr                             xr  right
//
/// Rotates the subtree right around `node`.
///
/// The new root takes over the color of `node` and `node` becomes red.
/// A node without a left child is returned unchanged.
pub(crate) fn rotate_right<T: Clone>(mut node: NodeRef<T>) -> NodeRef<T> {
    let inner = ReferenceCounter::make_mut(&mut node);
    let Some(mut root) = inner.left.take() else {
        return node;
    };
    let pivot = ReferenceCounter::make_mut(&mut root);
    inner.left = pivot.right.take();
    pivot.color = inner.color;
    inner.color = Color::Red;
    pivot.right = Some(node);
    root
}

/// Toggles the color of `node` and of both of its children.
///
/// Callers guarantee that both children exist.
pub(crate) fn flip_colors<T: Clone>(node: &mut Node<T>) {
    debug_assert!(
        node.left.is_some() && node.right.is_some(),
        "flip_colors requires two children"
    );
    node.color = node.color.flipped();
    for child in [&mut node.left, &mut node.right].into_iter().flatten() {
        let child = ReferenceCounter::make_mut(child);
        child.color = child.color.flipped();
    }
}

/// Restores the left-leaning invariants on the way back up a mutation path.
///
/// The checks run in a fixed order because each rotation can set up the
/// condition tested by the next one.
pub(crate) fn fix_up<T: Clone>(mut node: NodeRef<T>) -> NodeRef<T> {
    if is_red(node.right.as_ref()) && !is_red(node.left.as_ref()) {
        node = rotate_left(node);
    }
    if is_red(node.left.as_ref()) && node.left_left_is_red() {
        node = rotate_right(node);
    }
    if is_red(node.left.as_ref()) && is_red(node.right.as_ref()) {
        flip_colors(ReferenceCounter::make_mut(&mut node));
    }
    node
}

/// Borrows a red link from the right sibling so the left child is no longer
/// a 2-node before a deletion descends into it.
pub(crate) fn move_red_left<T: Clone>(mut node: NodeRef<T>) -> NodeRef<T> {
    flip_colors(ReferenceCounter::make_mut(&mut node));
    if node.right_left_is_red() {
        let inner = ReferenceCounter::make_mut(&mut node);
        inner.right = inner.right.take().map(rotate_right);
        node = rotate_left(node);
        flip_colors(ReferenceCounter::make_mut(&mut node));
    }
    node
}

/// Borrows a red link from the left sibling so the right child is no longer
/// a 2-node before a deletion descends into it.
pub(crate) fn move_red_right<T: Clone>(mut node: NodeRef<T>) -> NodeRef<T> {
    flip_colors(ReferenceCounter::make_mut(&mut node));
    if node.left_left_is_red() {
        node = rotate_right(node);
        flip_colors(ReferenceCounter::make_mut(&mut node));
    }
    node
}

/// Forces the color of a root link to black.
pub(crate) fn blacken<T: Clone>(mut node: NodeRef<T>) -> NodeRef<T> {
    if node.is_red() {
        ReferenceCounter::make_mut(&mut node).color = Color::Black;
    }
    node
}

// =============================================================================
// Lookup
// =============================================================================

/// Finds the first element matching `query` on the descent from `node`.
pub(crate) fn find<'a, T, Q>(mut node: Option<&'a NodeRef<T>>, query: &Q) -> Option<&'a T>
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    while let Some(current) = node {
        match query.cmp(current.element.borrow()) {
            Ordering::Less => node = current.left.as_ref(),
            Ordering::Greater => node = current.right.as_ref(),
            Ordering::Equal => return Some(&current.element),
        }
    }
    None
}

/// Returns the left-most element below `node`.
pub(crate) fn min<T>(node: Option<&NodeRef<T>>) -> Option<&T> {
    let mut current = node?;
    while let Some(left) = current.left.as_ref() {
        current = left;
    }
    Some(&current.element)
}

/// Returns the right-most element below `node`.
pub(crate) fn max<T>(node: Option<&NodeRef<T>>) -> Option<&T> {
    let mut current = node?;
    while let Some(right) = current.right.as_ref() {
        current = right;
    }
    Some(&current.element)
}

// =============================================================================
// Tests
// =============================================================================
