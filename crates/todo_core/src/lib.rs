//! Core domain logic for the to-do list app.
//! This crate is the single source of truth for item invariants; the mobile
//! shell only renders what it returns.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;
pub mod voice;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::item::{Item, ItemId, ItemValidationError};
pub use repo::slot_repo::{
    MemorySlotRepository, RepoError, RepoResult, SlotRepository, SqliteSlotRepository,
};
pub use service::codec::{CodecError, CURRENT_FORMAT_VERSION};
pub use service::item_store::{ItemStore, StoreError, StoreResult, ITEMS_SLOT_KEY};
pub use view::projection::{empty_state, filter_label, project, EmptyState, FilterType, ItemCounts};
pub use voice::intake::{ingest_audio, ingest_transcript, IntakeError};
pub use voice::splitter::split_into_tasks;
pub use voice::transcribe::{
    AudioPayload, Transcriber, TranscriptionConfig, TranscriptionError, WhisperTranscriber,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
