//! Filter/search projection over the item collection.
//!
//! # Invariants
//! - Output order matches collection order.
//! - Search is a case-insensitive substring match on `title` only.
//! - Counts are computed over the full collection, never the projection.

use crate::model::item::Item;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Completion filter offered by the list screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterType {
    #[default]
    All,
    Completed,
    Uncompleted,
}

impl FilterType {
    pub const ALL: [FilterType; 3] = [Self::All, Self::Completed, Self::Uncompleted];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Completed => "Completed",
            Self::Uncompleted => "Uncompleted",
        }
    }

    pub fn matches(self, item: &Item) -> bool {
        match self {
            Self::All => true,
            Self::Completed => item.completed,
            Self::Uncompleted => !item.completed,
        }
    }
}

impl Display for FilterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "uncompleted" => Ok(Self::Uncompleted),
            other => Err(format!(
                "unsupported filter `{other}`; expected All|Completed|Uncompleted"
            )),
        }
    }
}

/// Applies the completion filter, then the title search.
///
/// Empty `search_text` matches every item. The search text is not trimmed.
pub fn project<'a>(items: &'a [Item], filter: FilterType, search_text: &str) -> Vec<&'a Item> {
    let needle = search_text.to_lowercase();
    items
        .iter()
        .filter(|item| filter.matches(item))
        .filter(|item| needle.is_empty() || item.title.to_lowercase().contains(&needle))
        .collect()
}

/// Totals shown next to each filter choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemCounts {
    pub total: usize,
    pub completed: usize,
    pub uncompleted: usize,
}

impl ItemCounts {
    pub fn of(items: &[Item]) -> Self {
        let completed = items.iter().filter(|item| item.completed).count();
        Self {
            total: items.len(),
            completed,
            uncompleted: items.len() - completed,
        }
    }

    pub fn for_filter(&self, filter: FilterType) -> usize {
        match filter {
            FilterType::All => self.total,
            FilterType::Completed => self.completed,
            FilterType::Uncompleted => self.uncompleted,
        }
    }
}

/// Dropdown label such as `Completed (3)`.
pub fn filter_label(filter: FilterType, counts: &ItemCounts) -> String {
    format!("{} ({})", filter.label(), counts.for_filter(filter))
}

/// Placeholder shown when the projection is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoItems,
    NoSearchResults,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            Self::NoItems => "No todos available",
            Self::NoSearchResults => "No result found",
        }
    }
}

/// Returns the placeholder for an empty projection, `None` otherwise.
pub fn empty_state(items: &[Item], projected: &[&Item], search_text: &str) -> Option<EmptyState> {
    if !projected.is_empty() {
        return None;
    }
    if !items.is_empty() && !search_text.is_empty() {
        return Some(EmptyState::NoSearchResults);
    }
    Some(EmptyState::NoItems)
}

#[cfg(test)]
mod tests {
    use super::{filter_label, FilterType, ItemCounts};
    use crate::model::item::{Item, ItemId};

    #[test]
    fn filter_parses_labels_case_insensitively() {
        assert_eq!(" completed ".parse::<FilterType>(), Ok(FilterType::Completed));
        assert_eq!("ALL".parse::<FilterType>(), Ok(FilterType::All));
        assert!("done".parse::<FilterType>().is_err());
    }

    #[test]
    fn labels_carry_full_collection_counts() {
        let mut done = Item::with_id(ItemId::from("1"), "done", "").unwrap();
        done.completed = true;
        let open = Item::with_id(ItemId::from("2"), "open", "").unwrap();
        let counts = ItemCounts::of(&[done, open]);

        let labels = FilterType::ALL
            .iter()
            .map(|filter| filter_label(*filter, &counts))
            .collect::<Vec<_>>();
        assert_eq!(labels, ["All (2)", "Completed (1)", "Uncompleted (1)"]);
    }
}
