//! Item store: the persisted to-do collection and its mutations.
//!
//! # Responsibility
//! - Load the collection from its key-value slot.
//! - Apply add/toggle/delete as whole-collection read-modify-write cycles.
//!
//! # Invariants
//! - Every mutation writes the full collection exactly once, or not at all.
//! - Ids stay unique within the collection.
//! - Read-modify-write cycles on one store never interleave (`write_guard`).
//! - Mutations never overwrite a collection they could not decode.
//!
//! Concurrent writers through *different* store instances over the same
//! slot are not coordinated here; callers that build a store per request
//! must serialize mutations themselves.

use crate::model::item::{now_epoch_ms, Item, ItemId, ItemValidationError};
use crate::repo::slot_repo::{RepoError, SlotRepository};
use crate::service::codec::{decode_collection, encode_collection, CodecError};
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

/// Slot key holding the serialized item collection.
pub const ITEMS_SLOT_KEY: &str = "@todos";

pub type StoreResult<T> = Result<T, StoreError>;

/// Item store error.
#[derive(Debug)]
pub enum StoreError {
    Validation(ItemValidationError),
    NotFound(ItemId),
    /// Slot read/write failed.
    Repo(RepoError),
    /// Persisted collection could not be (de)serialized.
    Codec(CodecError),
}

impl StoreError {
    /// Whether this is a persistence failure rather than a caller mistake.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Repo(_) | Self::Codec(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::Repo(err) => write!(f, "storage error: {err}"),
            Self::Codec(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
            Self::Codec(err) => Some(err),
        }
    }
}

impl From<ItemValidationError> for StoreError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Durable to-do collection over a key-value slot.
pub struct ItemStore<R: SlotRepository> {
    repo: R,
    slot_key: String,
    write_guard: Mutex<()>,
}

impl<R: SlotRepository> ItemStore<R> {
    /// Creates a store over the default `@todos` slot.
    pub fn new(repo: R) -> Self {
        Self::with_slot_key(repo, ITEMS_SLOT_KEY)
    }

    pub fn with_slot_key(repo: R, slot_key: impl Into<String>) -> Self {
        Self {
            repo,
            slot_key: slot_key.into(),
            write_guard: Mutex::new(()),
        }
    }

    /// Loads the current collection for display.
    ///
    /// An absent slot is an empty collection. A payload that cannot be
    /// decoded is logged and also reads as empty, so a broken slot never
    /// blocks the list screen.
    ///
    /// # Errors
    /// - `StoreError::Repo` when the slot itself cannot be read.
    pub fn load(&self) -> StoreResult<Vec<Item>> {
        let Some(raw) = self.repo.read_slot(&self.slot_key)? else {
            return Ok(Vec::new());
        };

        match decode_collection(&raw) {
            Ok((items, _version)) => Ok(items),
            Err(err) => {
                warn!("event=items_load module=store status=degraded error={err}");
                Ok(Vec::new())
            }
        }
    }

    /// Appends one uncompleted item and persists the collection.
    ///
    /// # Errors
    /// - `StoreError::Validation` when `title` is blank; nothing is read or written.
    /// - Storage errors from the read or the write.
    pub fn add_one(&self, title: &str, description: &str) -> StoreResult<Item> {
        if title.trim().is_empty() {
            return Err(ItemValidationError::EmptyTitle.into());
        }

        self.mutate("item_add", |items| {
            let id = TakenIds::of(items).fresh(now_epoch_ms());
            let item = Item::with_id(id, title, description)?;
            items.push(item.clone());
            Ok(item)
        })
    }

    /// Appends one item per non-blank title with a single combined write.
    ///
    /// Blank titles are skipped. When nothing remains, no write happens and
    /// an empty list is returned.
    pub fn add_many<I, S>(&self, titles: I) -> StoreResult<Vec<Item>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let titles = titles
            .into_iter()
            .filter(|title| !title.as_ref().trim().is_empty())
            .collect::<Vec<_>>();
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        self.mutate("items_add_many", |items| {
            // One timestamp for the whole batch; the random suffix keeps ids apart.
            let epoch_ms = now_epoch_ms();
            let mut taken = TakenIds::of(items);
            let mut created = Vec::with_capacity(titles.len());
            for title in &titles {
                let id = taken.fresh(epoch_ms);
                let item = Item::with_id(id, title, String::new())?;
                items.push(item.clone());
                created.push(item);
            }
            Ok(created)
        })
    }

    /// Flips `completed` on the item with `id` and returns the new collection.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no item has `id`; nothing is written.
    pub fn toggle_completed(&self, id: &str) -> StoreResult<Vec<Item>> {
        self.mutate("item_toggle", |items| {
            let item = items
                .iter_mut()
                .find(|item| item.id.as_str() == id)
                .ok_or_else(|| StoreError::NotFound(ItemId::from(id)))?;
            item.toggle_completed();
            Ok(items.clone())
        })
    }

    /// Removes the item with `id` and returns the new collection.
    ///
    /// Confirmation is the caller's job; this deletes immediately.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no item has `id`; nothing is written.
    pub fn delete(&self, id: &str) -> StoreResult<Vec<Item>> {
        self.mutate("item_delete", |items| {
            let before = items.len();
            items.retain(|item| item.id.as_str() != id);
            if items.len() == before {
                return Err(StoreError::NotFound(ItemId::from(id)));
            }
            Ok(items.clone())
        })
    }

    /// Runs one guarded read-modify-write cycle.
    ///
    /// `apply` mutates the in-memory collection; its error aborts the cycle
    /// before anything is written.
    fn mutate<T>(
        &self,
        event: &'static str,
        apply: impl FnOnce(&mut Vec<Item>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let _guard = self
            .write_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut items = self.read_for_update()?;
        let before = items.len();
        let output = match apply(&mut items) {
            Ok(output) => output,
            Err(err) => {
                info!("event={event} module=store status=rejected error={err}");
                return Err(err);
            }
        };

        let raw = encode_collection(&items)?;
        if let Err(err) = self.repo.write_slot(&self.slot_key, &raw) {
            error!("event={event} module=store status=error error_code=slot_write_failed error={err}");
            return Err(err.into());
        }

        info!(
            "event={event} module=store status=ok count_before={before} count_after={}",
            items.len()
        );
        Ok(output)
    }

    fn read_for_update(&self) -> StoreResult<Vec<Item>> {
        let Some(raw) = self.repo.read_slot(&self.slot_key)? else {
            return Ok(Vec::new());
        };
        let (items, _version) = decode_collection(&raw).map_err(|err| {
            error!("event=items_read module=store status=error error_code=decode_failed error={err}");
            err
        })?;
        Ok(items)
    }
}

/// Ids already used in one collection, including ids handed out during
/// the current cycle.
struct TakenIds(HashSet<String>);

impl TakenIds {
    fn of(items: &[Item]) -> Self {
        Self(items.iter().map(|item| item.id.to_string()).collect())
    }

    fn fresh(&mut self, epoch_ms: i64) -> ItemId {
        loop {
            let id = ItemId::generate(epoch_ms);
            if self.0.insert(id.to_string()) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemStore, TakenIds};
    use crate::model::item::{Item, ItemId};
    use crate::repo::slot_repo::{MemorySlotRepository, SlotRepository};

    #[test]
    fn fresh_id_avoids_existing_ids() {
        let existing = (0..32)
            .map(|n| Item::with_id(ItemId::generate(7), format!("t{n}"), "").unwrap())
            .collect::<Vec<_>>();
        let mut taken = TakenIds::of(&existing);
        let id = taken.fresh(7);
        assert!(existing.iter().all(|item| item.id != id));
    }

    #[test]
    fn fresh_ids_within_one_cycle_never_repeat() {
        let mut taken = TakenIds::of(&[]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            assert!(seen.insert(taken.fresh(7)));
        }
        assert_eq!(taken.0.len(), 2_000);
    }

    #[test]
    fn rejected_mutation_does_not_write() {
        let repo = MemorySlotRepository::new();
        let store = ItemStore::new(&repo);

        assert!(store.toggle_completed("missing").is_err());
        assert_eq!(repo.read_slot("@todos").unwrap(), None);
    }

    #[test]
    fn custom_slot_key_is_isolated_from_default() {
        let repo = MemorySlotRepository::new();
        let work = ItemStore::with_slot_key(&repo, "@work");
        let home = ItemStore::new(&repo);

        work.add_one("ship release", "").unwrap();
        assert_eq!(work.load().unwrap().len(), 1);
        assert!(home.load().unwrap().is_empty());
    }
}
