//! Voice-to-items intake.
//!
//! # Responsibility
//! - Validate a transcript, split it into titles and bulk-insert them.
//!
//! # Invariants
//! - All titles from one transcript are persisted in one write or not at all.

use crate::model::item::Item;
use crate::repo::slot_repo::SlotRepository;
use crate::service::item_store::{ItemStore, StoreError};
use crate::voice::splitter::split_into_tasks;
use crate::voice::transcribe::{AudioPayload, Transcriber, TranscriptionError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Voice intake failure.
#[derive(Debug)]
pub enum IntakeError {
    Transcription(TranscriptionError),
    Store(StoreError),
}

impl Display for IntakeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transcription(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IntakeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transcription(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<TranscriptionError> for IntakeError {
    fn from(value: TranscriptionError) -> Self {
        Self::Transcription(value)
    }
}

impl From<StoreError> for IntakeError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Adds one item per task dictated in `transcript`.
///
/// A transcript that only contains separators adds nothing and is not an
/// error.
///
/// # Errors
/// - `TranscriptionError::NoSpeech` when `transcript` is blank.
/// - Store errors from the combined write.
pub fn ingest_transcript<R: SlotRepository>(
    store: &ItemStore<R>,
    transcript: &str,
) -> Result<Vec<Item>, IntakeError> {
    if transcript.trim().is_empty() {
        return Err(TranscriptionError::NoSpeech.into());
    }

    let tasks = split_into_tasks(transcript);
    let created = store.add_many(&tasks)?;
    info!(
        "event=voice_intake module=voice status=ok tasks={} created={}",
        tasks.len(),
        created.len()
    );
    Ok(created)
}

/// Transcribes `audio` once and ingests the resulting transcript.
pub fn ingest_audio<R: SlotRepository, T: Transcriber + ?Sized>(
    store: &ItemStore<R>,
    transcriber: &T,
    audio: &AudioPayload,
) -> Result<Vec<Item>, IntakeError> {
    let transcript = transcriber.transcribe(audio)?;
    ingest_transcript(store, &transcript)
}
