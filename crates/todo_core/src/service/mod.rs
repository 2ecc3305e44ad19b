//! Core use-case services.
//!
//! # Responsibility
//! - Own the persisted item collection and its mutation cycles.
//! - Keep FFI/CLI callers decoupled from slot and codec details.

pub mod codec;
pub mod item_store;
