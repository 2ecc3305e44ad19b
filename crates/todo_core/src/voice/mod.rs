//! Voice-dictated task intake.
//!
//! # Responsibility
//! - Turn a transcript into task titles (`splitter`).
//! - Call the remote speech-to-text service (`transcribe`).
//! - Feed split titles into the item store in one write (`intake`).
//!
//! # Invariants
//! - Transcription is a single attempt bounded by a timeout.
//! - A transcript without non-whitespace text is an error, not an empty insert.

pub mod intake;
pub mod splitter;
pub mod transcribe;
