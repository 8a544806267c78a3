//! An ordered map backed by an arena-allocated red-black tree.
//!
//! This crate provides [`RBTreeMap`], a sorted key-value container with
//! logarithmic insertion, lookup and removal, and [`Cursor`]s that walk the
//! entries in either direction:
//!
//! - [`find`](RBTreeMap::find), [`lower_bound`](RBTreeMap::lower_bound) and
//!   [`upper_bound`](RBTreeMap::upper_bound) return cursors rather than values
//! - [`insert`](RBTreeMap::insert) keeps the first value stored for a key and
//!   reports whether the pair was added
//! - ordering is pluggable through [`Compare`]: the key's own [`Ord`], its
//!   reverse, or any closure
//!
//! # Example
//!
//! ```
//! use rb_tree_map::RBTreeMap;
//!
//! let mut scores = RBTreeMap::new();
//! scores.insert("Carol", 92);
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//!
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Walk from "B" onwards.
//! let mut cursor = scores.lower_bound(&"B");
//! assert_eq!(cursor.key(), Some(&"Bob"));
//! cursor.move_next();
//! assert_eq!(cursor.key(), Some(&"Carol"));
//! cursor.move_next();
//! assert!(cursor.is_end());
//!
//! // Remove through the cursor returned by a lookup.
//! let mut cursor = scores.find_mut(&"Alice");
//! assert_eq!(cursor.remove_current(), Some(("Alice", 100)));
//! assert_eq!(cursor.key(), Some(&"Bob"));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Stable positions** - Inserting or removing one entry never moves another
//! - **`tracing`** - Optional feature that emits `trace!` events for every
//!   rotation and rebalancing case, and `debug!` events for bulk operations
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to their parent and children by 32-bit
//! handles. The tree maintains the red-black invariants after every mutation;
//! [`RBTreeMap::check_invariants`] verifies them on demand.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: Mutable iteration hands out disjoint `&mut V` through a raw slot pointer.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod compare;
mod error;
mod raw;

pub mod rb_tree_map;

pub use compare::{Compare, Natural, Reversed};
pub use error::{Error, InvariantViolation};
pub use rb_tree_map::{Cursor, CursorMut, RBTreeMap};
