//! FFI use-case API for the mobile shell.
//!
//! # Responsibility
//! - Expose list/add/toggle/delete/voice flows to Dart via FRB.
//! - Turn every core error into a user-facing notification message.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Mutations are serialized process-wide; each call opens its own store.

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};
use todo_core::db::open_db;
use todo_core::{
    core_version as core_version_inner, empty_state, filter_label,
    ingest_transcript as ingest_transcript_inner,
    init_logging as init_logging_inner, ping as ping_inner, project, AudioPayload, FilterType,
    IntakeError, Item, ItemCounts, ItemStore, RepoError, SqliteSlotRepository, StoreError,
    Transcriber, TranscriptionConfig, TranscriptionError, WhisperTranscriber,
};

const ENTRY_DB_FILE_NAME: &str = "todo_items.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static WRITE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive);
///   empty selects the build default.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItemView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl From<&Item> for TodoItemView {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            description: item.description.clone(),
            completed: item.completed,
        }
    }
}

/// Projected list plus everything the list screen labels with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    pub ok: bool,
    pub items: Vec<TodoItemView>,
    /// Effective filter label after parsing (`All` on unknown input).
    pub applied_filter: String,
    /// `All (n)`, `Completed (n)`, `Uncompleted (n)`.
    pub filter_labels: Vec<String>,
    /// Placeholder text when `items` is empty.
    pub empty_message: Option<String>,
    pub message: String,
}

/// Result of a mutating call, shown to the user as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    pub ok: bool,
    /// Items created by this call (add flows only).
    pub created: Vec<TodoItemView>,
    pub message: String,
}

impl TodoActionResponse {
    fn success(message: impl Into<String>, created: Vec<TodoItemView>) -> Self {
        Self {
            ok: true,
            created,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            created: Vec::new(),
            message: message.into(),
        }
    }
}

/// Loads the collection and projects it for display.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Unknown `filter` values fall back to `All`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_list(filter: String, search_text: String) -> TodoListResponse {
    let filter = filter.parse::<FilterType>().unwrap_or_else(|err| {
        warn!("event=todo_list module=ffi status=fallback error={err}");
        FilterType::All
    });

    let items = match with_item_store(|store| store.load()) {
        Ok(items) => items,
        Err(err) => {
            return TodoListResponse {
                ok: false,
                items: Vec::new(),
                applied_filter: filter.label().to_string(),
                filter_labels: Vec::new(),
                empty_message: None,
                message: format!("Failed to load todos: {err}"),
            };
        }
    };

    let counts = ItemCounts::of(&items);
    let projected = project(&items, filter, &search_text);
    let empty_message =
        empty_state(&items, &projected, &search_text).map(|state| state.message().to_string());
    TodoListResponse {
        ok: true,
        items: projected.into_iter().map(TodoItemView::from).collect(),
        applied_filter: filter.label().to_string(),
        filter_labels: FilterType::ALL
            .iter()
            .map(|filter| filter_label(*filter, &counts))
            .collect(),
        empty_message,
        message: String::new(),
    }
}

/// Adds one typed item.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_add(title: String, description: String) -> TodoActionResponse {
    add_response(with_item_store_mut(|store| store.add_one(&title, &description)))
}

/// Flips completion of one item.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_toggle(id: String) -> TodoActionResponse {
    toggle_response(with_item_store_mut(|store| store.toggle_completed(&id)))
}

/// Deletes one item. The shell asks for confirmation before calling this.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_delete(id: String) -> TodoActionResponse {
    delete_response(with_item_store_mut(|store| store.delete(&id)))
}

/// Adds the tasks dictated in an already transcribed text.
#[flutter_rust_bridge::frb(sync)]
pub fn voice_ingest_transcript(transcript: String) -> TodoActionResponse {
    voice_response(with_item_store_mut(|store| {
        ingest_transcript_inner(store, &transcript)
    }))
}

/// Transcribes a finished recording and adds the dictated tasks.
///
/// # FFI contract
/// - Blocking network call bounded by the transcription timeout; call off
///   the UI thread.
#[flutter_rust_bridge::frb]
pub fn voice_ingest_recording(recording_path: String) -> TodoActionResponse {
    // Transcribe before taking the write lock; the request may take seconds.
    let transcript = AudioPayload::from_file(&recording_path).and_then(|audio| {
        WhisperTranscriber::new(TranscriptionConfig::from_env())?.transcribe(&audio)
    });
    match transcript {
        Ok(text) => voice_ingest_transcript(text),
        Err(err) => TodoActionResponse::failure(intake_failure_message(&err.into())),
    }
}

fn add_response(result: Result<Item, StoreError>) -> TodoActionResponse {
    match result {
        Ok(item) => {
            TodoActionResponse::success("Todo Added Successfully!", vec![TodoItemView::from(&item)])
        }
        Err(StoreError::Validation(_)) => TodoActionResponse::failure("Todo Title is Required"),
        Err(err) => TodoActionResponse::failure(format!("Failed to save todo: {err}")),
    }
}

fn toggle_response(result: Result<Vec<Item>, StoreError>) -> TodoActionResponse {
    match result {
        Ok(_) => TodoActionResponse::success("", Vec::new()),
        Err(StoreError::NotFound(_)) => TodoActionResponse::failure("Todo no longer exists"),
        Err(err) => TodoActionResponse::failure(format!("Failed to update todo: {err}")),
    }
}

fn delete_response(result: Result<Vec<Item>, StoreError>) -> TodoActionResponse {
    match result {
        Ok(_) => TodoActionResponse::success("Todo deleted successfully!", Vec::new()),
        Err(StoreError::NotFound(_)) => TodoActionResponse::failure("Todo no longer exists"),
        Err(err) => TodoActionResponse::failure(format!("Failed to delete todo: {err}")),
    }
}

fn voice_response(result: Result<Vec<Item>, IntakeError>) -> TodoActionResponse {
    match result {
        Ok(created) => TodoActionResponse::success(
            format!("{} task(s) added from voice", created.len()),
            created.iter().map(TodoItemView::from).collect(),
        ),
        Err(err) => TodoActionResponse::failure(intake_failure_message(&err)),
    }
}

fn intake_failure_message(err: &IntakeError) -> String {
    match err {
        IntakeError::Transcription(TranscriptionError::PermissionDenied) => {
            "Microphone permission denied".to_string()
        }
        IntakeError::Transcription(TranscriptionError::AudioUnavailable(_)) => {
            "Recording failed, try again".to_string()
        }
        IntakeError::Transcription(TranscriptionError::NoSpeech) => {
            "No speech detected — speak clearly and try again".to_string()
        }
        IntakeError::Transcription(TranscriptionError::Timeout) => {
            "Speech transcription timed out, try again".to_string()
        }
        IntakeError::Transcription(_) => "Speech transcription failed".to_string(),
        IntakeError::Store(err) => format!("Failed to save todo: {err}"),
    }
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TODO_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn with_item_store<T>(
    f: impl FnOnce(&ItemStore<SqliteSlotRepository<'_>>) -> Result<T, StoreError>,
) -> Result<T, String> {
    let conn = open_db(resolve_entry_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let repo =
        SqliteSlotRepository::try_new(&conn).map_err(|err| format!("repo init failed: {err}"))?;
    let store = ItemStore::new(repo);
    f(&store).map_err(|err| err.to_string())
}

/// Opens a store under the process-wide write lock.
fn with_item_store_mut<T, E: From<StoreError>>(
    f: impl FnOnce(&ItemStore<SqliteSlotRepository<'_>>) -> Result<T, E>,
) -> Result<T, E> {
    let _guard = WRITE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let conn = open_db(resolve_entry_db_path())
        .map_err(|err| StoreError::from(RepoError::from(err)))?;
    let store = ItemStore::new(SqliteSlotRepository::try_new(&conn).map_err(StoreError::from)?);
    f(&store)
}
