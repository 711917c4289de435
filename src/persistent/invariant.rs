//! Structural verification of committed trees.
//!
//! A committed tree must be a valid binary search tree whose red links all
//! lean left, never stack two in a row, and leave every root-to-leaf path
//! with the same number of black links. Together these make the tree
//! equivalent to a balanced 2-3 tree.

use super::node::{NodeRef, is_red};
use std::fmt;

/// Describes the first structural invariant a tree was found to violate.
///
/// Returned by [`PersistentTree::verify`](super::PersistentTree::verify) and
/// [`Transaction::verify`](super::Transaction::verify).
///
/// # Examples
///
/// ```rust
/// use llrb::persistent::InvariantViolation;
///
/// let violation = InvariantViolation::LengthMismatch { recorded: 3, counted: 2 };
/// assert_eq!(
///     format!("{violation}"),
///     "recorded length 3 does not match the 2 reachable elements"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The root link is red.
    RedRoot,
    /// A node has a red right child.
    RedRightLink,
    /// A red node has a red left child.
    DoubleRedLink,
    /// The two subtrees of a node have different black heights.
    UnbalancedBlackHeight {
        /// Black height of the left subtree.
        left: usize,
        /// Black height of the right subtree.
        right: usize,
    },
    /// The in-order element at `position` is smaller than its predecessor.
    OutOfOrder {
        /// Zero-based in-order position of the offending element.
        position: usize,
    },
    /// The recorded length differs from the number of reachable elements.
    LengthMismatch {
        /// Length stored alongside the root.
        recorded: usize,
        /// Number of elements found by traversal.
        counted: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot => write!(formatter, "root link is red"),
            Self::RedRightLink => write!(formatter, "red link leans right"),
            Self::DoubleRedLink => write!(formatter, "two consecutive red links"),
            Self::UnbalancedBlackHeight { left, right } => write!(
                formatter,
                "black height differs between subtrees: left {left}, right {right}"
            ),
            Self::OutOfOrder { position } => {
                write!(formatter, "element at in-order position {position} is out of order")
            }
            Self::LengthMismatch { recorded, counted } => write!(
                formatter,
                "recorded length {recorded} does not match the {counted} reachable elements"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Checks every committed-tree invariant of the tree rooted at `root`.
pub(crate) fn verify<T: Ord>(
    root: Option<&NodeRef<T>>,
    length: usize,
) -> Result<(), InvariantViolation> {
    let result = check(root, length);
    if let Err(violation) = &result {
        log::debug!("tree of {length} elements failed verification: {violation}");
    }
    result
}

fn check<T: Ord>(root: Option<&NodeRef<T>>, length: usize) -> Result<(), InvariantViolation> {
    if is_red(root) {
        return Err(InvariantViolation::RedRoot);
    }
    black_height(root)?;

    let mut previous: Option<&T> = None;
    let mut counted = 0;
    check_order(root, &mut previous, &mut counted)?;
    if counted != length {
        return Err(InvariantViolation::LengthMismatch {
            recorded: length,
            counted,
        });
    }
    Ok(())
}

/// Returns the number of black links on every path below `node`.
fn black_height<T>(node: Option<&NodeRef<T>>) -> Result<usize, InvariantViolation> {
    let Some(node) = node else {
        return Ok(0);
    };
    if is_red(node.right.as_ref()) {
        return Err(InvariantViolation::RedRightLink);
    }
    if node.is_red() && is_red(node.left.as_ref()) {
        return Err(InvariantViolation::DoubleRedLink);
    }

    let left = black_height(node.left.as_ref())?;
    let right = black_height(node.right.as_ref())?;
    if left != right {
        return Err(InvariantViolation::UnbalancedBlackHeight { left, right });
    }
    Ok(left + usize::from(!node.is_red()))
}

fn check_order<'a, T: Ord>(
    node: Option<&'a NodeRef<T>>,
    previous: &mut Option<&'a T>,
    counted: &mut usize,
) -> Result<(), InvariantViolation> {
    let Some(node) = node else {
        return Ok(());
    };
    check_order(node.left.as_ref(), previous, counted)?;
    if previous.is_some_and(|previous| *previous > node.element) {
        return Err(InvariantViolation::OutOfOrder { position: *counted });
    }
    *previous = Some(&node.element);
    *counted += 1;
    check_order(node.right.as_ref(), previous, counted)
}

// =============================================================================
// Tests
// =============================================================================
