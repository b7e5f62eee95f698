//! Identifier allocation for sacco records.
//!
//! Every membership, loan, and application record carries a human-readable
//! identifier of the form `prefix + time bucket + zero-padded sequence`.
//! This crate provides:
//!
//! - A `CounterStore` trait wrapping the document store's atomic
//!   upsert-increment primitive, with a SQLite implementation
//! - Pure formatting of canonical identifiers from allocated sequences
//! - An `IdentifierAllocator` combining the two for record-creation callers
//!
//! # Uniqueness
//!
//! Counter values are produced by a single atomic round trip against the
//! backing store. Application code never reads a counter and writes it
//! back, so concurrent allocators for the same counter name always receive
//! distinct, increasing values.

mod counter;
mod error;
mod format;
mod sqlite;

pub use counter::{AllocatedIdentifier, CounterStore, IdentifierAllocator};
pub use error::{AllocationError, CounterStoreError};
pub use format::{format_identifier, IdentifierScheme, TimeBucket};
pub use sqlite::SqliteCounterStore;
