//! # llrb
//!
//! A persistent ordered set for Rust, built on a left-leaning red-black tree.
//!
//! ## Overview
//!
//! Committed trees are immutable and cheap to share: readers hold a
//! [`PersistentTree`](persistent::PersistentTree) for as long as they like,
//! while writers batch changes in a [`Transaction`](persistent::Transaction)
//! and publish the result as a new tree. The two versions share every
//! subtree the transaction did not touch.
//!
//! - **Lookups**: get, contains, min, max
//! - **Traversal**: ordered visitor walks with early stop, half-open range
//!   walks, and a lazy iterator
//! - **Mutation**: insert, delete, delete-min, delete-max inside a
//!   transaction
//! - **Verification**: structural invariant checks for tests and diagnostics
//!
//! ## Feature Flags
//!
//! - `arc` (default): nodes are shared through `Arc`, so committed trees are
//!   `Send + Sync`. Without it nodes use `Rc`.
//!
//! ## Example
//!
//! ```rust
//! use llrb::prelude::*;
//!
//! let mut transaction = Transaction::new();
//! for element in [20, 10, 30] {
//!     transaction.insert(element);
//! }
//! let tree = transaction.commit();
//!
//! let snapshot = tree.clone();
//! let mut transaction = tree.transaction();
//! transaction.delete_max();
//! let trimmed = transaction.commit();
//!
//! assert_eq!(snapshot.max(), Some(&30));
//! assert_eq!(trimmed.max(), Some(&20));
//! assert_eq!(trimmed.verify(), Ok(()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the public collection types.
///
/// # Usage
///
/// ```rust
/// use llrb::prelude::*;
/// ```
pub mod prelude {
    pub use crate::persistent::*;
}

pub mod persistent;
