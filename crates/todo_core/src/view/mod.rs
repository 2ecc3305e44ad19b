//! Read-only views derived from the item collection.
//!
//! # Responsibility
//! - Filter and search the collection for display.
//! - Produce the counts and placeholders the list screen shows.
//!
//! # Invariants
//! - Everything here is a pure function of its arguments.

pub mod projection;
