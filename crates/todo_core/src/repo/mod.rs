//! Repository layer for the on-device key-value slots.
//!
//! # Responsibility
//! - Define the slot read/write contract the item store depends on.
//! - Isolate SQLite details from the store and codec layers.
//!
//! # Invariants
//! - A slot write replaces the whole value in a single statement.
//! - Keys are non-empty after trimming.

pub mod slot_repo;
