//! Domain model for the to-do list.
//!
//! # Responsibility
//! - Define the single persisted entity (`Item`) and its identity type.
//! - Keep creation-time validation next to the data it protects.
//!
//! # Invariants
//! - Every item is identified by an `ItemId` unique within its collection.
//! - A stored item never has a blank title.

pub mod item;
