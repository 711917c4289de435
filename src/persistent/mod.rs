//! Persistent (immutable) ordered collections.
//!
//! This module provides an ordered set built on a left-leaning red-black
//! tree that uses structural sharing to minimize copying:
//!
//! - [`PersistentTree`]: Immutable, shareable snapshot of an ordered set
//! - [`Transaction`]: Single-owner batch of changes producing a new tree
//! - [`PersistentTreeIterator`]: Lazy in-order iterator over a tree
//! - [`InvariantViolation`]: Structural error reported by `verify`
//!
//! # Structural Sharing
//!
//! A committed tree is never modified. A transaction copies only the nodes on
//! the paths it changes, and only while those nodes are still reachable from
//! another tree; every other subtree is shared between the old and the new
//! version.
//!
//! # Examples
//!
//! ```rust
//! use llrb::persistent::PersistentTree;
//! use std::ops::ControlFlow;
//!
//! let tree: PersistentTree<i32> = [5, 1, 4, 2, 3].into_iter().collect();
//!
//! // Structural sharing: the original tree is preserved
//! let mut transaction = tree.transaction();
//! transaction.delete(&1);
//! transaction.insert(6);
//! let updated = transaction.commit();
//!
//! assert_eq!(tree.min(), Some(&1));    // Original unchanged
//! assert_eq!(updated.min(), Some(&2)); // New version
//!
//! // Half-open range walks
//! let mut visited = Vec::new();
//! let _ = updated.range(&3, &6, |element| {
//!     visited.push(*element);
//!     ControlFlow::Continue(())
//! });
//! assert_eq!(visited, vec![3, 4, 5]);
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled (default), this is `std::sync::Arc`,
/// which lets committed trees be shared across threads.
///
/// When the `arc` feature is disabled, this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod invariant;
mod mutation;
mod node;
mod transaction;
mod traversal;
mod tree;

pub use invariant::InvariantViolation;
pub use transaction::Transaction;
pub use traversal::PersistentTreeIterator;
pub use tree::PersistentTree;

// =============================================================================
// Tests
// =============================================================================
