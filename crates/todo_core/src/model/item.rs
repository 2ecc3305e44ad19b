//! To-do item domain model.
//!
//! # Responsibility
//! - Define the record persisted inside the item collection.
//! - Generate time-based ids with a random suffix for bulk inserts.
//!
//! # Invariants
//! - `title` is trimmed and non-empty for items built through `Item::new`.
//! - `completed` starts as `false`.
//! - Ids are never reused within one collection (enforced by the store).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const ID_SUFFIX_LEN: usize = 8;

/// Stable identifier of one item.
///
/// Serialized as a bare string so the legacy persisted array stays readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Builds a fresh id of the form `<epoch_ms>-<8 hex chars>`.
    ///
    /// Two ids generated with the same `epoch_ms` differ by their random
    /// suffix, which is what keeps bulk inserts collision-free.
    pub fn generate(epoch_ms: i64) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("{epoch_ms}-{}", &random[..ID_SUFFIX_LEN]))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Validation failures for item construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "item title cannot be empty"),
        }
    }
}

impl Error for ItemValidationError {}

/// One to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// Free text, may be empty. Older payloads may omit it.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Item {
    /// Creates an uncompleted item with a freshly generated id.
    ///
    /// # Errors
    /// - Returns `ItemValidationError::EmptyTitle` when `title` is blank.
    pub fn new(
        title: impl AsRef<str>,
        description: impl Into<String>,
    ) -> Result<Self, ItemValidationError> {
        Self::with_id(ItemId::generate(now_epoch_ms()), title, description)
    }

    /// Creates an uncompleted item with a caller-provided id.
    ///
    /// The title is stored trimmed.
    pub fn with_id(
        id: ItemId,
        title: impl AsRef<str>,
        description: impl Into<String>,
    ) -> Result<Self, ItemValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(ItemValidationError::EmptyTitle);
        }

        Ok(Self {
            id,
            title: title.to_string(),
            description: description.into(),
            completed: false,
        })
    }

    /// Flips the completion flag.
    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Falls back to `0` if the system clock is set before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{Item, ItemId, ItemValidationError};

    #[test]
    fn generated_id_has_timestamp_prefix_and_hex_suffix() {
        let id = ItemId::generate(1_700_000_000_000);
        let (prefix, suffix) = id.as_str().split_once('-').expect("id has a separator");
        assert_eq!(prefix, "1700000000000");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn with_id_trims_title() {
        let item = Item::with_id(ItemId::from("a"), "  buy milk \n", "").unwrap();
        assert_eq!(item.title, "buy milk");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(
            Item::new(" \t ", "desc").unwrap_err(),
            ItemValidationError::EmptyTitle
        );
    }
}
