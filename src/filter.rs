//! The filter engine: a pure mapping from (snapshot, query) to the view that
//! is written into the live list.
//!
//! Matching is case-insensitive substring containment against
//! [`Item::match_text`]. Matches keep their snapshot order; an empty query
//! reproduces the snapshot exactly. When nothing matches, the view is a single
//! disabled sentinel entry so the host list never renders empty.

use crate::item::Item;

/// A user query: the raw input plus its normalized needle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    raw: String,
    needle: String,
}

impl Query {
    /// Normalizes `raw` by trimming and lower-casing it.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let needle = raw.trim().to_lowercase();
        Self { raw, needle }
    }

    /// Text exactly as typed. This is what gets persisted.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Trimmed, lower-cased form used for matching.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Whether the query filters nothing.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }
}

/// Outcome category of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    /// The query is empty; the view is the whole snapshot.
    Unfiltered,
    /// Some entries matched.
    Filtered {
        /// Number of matching entries.
        matches: usize,
    },
    /// Nothing matched; the view is the sentinel entry.
    NoMatch,
}

/// Items to write into the live list, plus the value to select afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    /// Entries in render order.
    pub items: Vec<Item>,
    /// Value to select after writing. `None` leaves the choice to the host's
    /// default, typically the first enabled entry.
    pub selected: Option<String>,
    /// What kind of render this is.
    pub state: FilterState,
}

impl RenderedView {
    /// Whether this render is the "no match" sentinel.
    pub fn is_no_match(&self) -> bool {
        self.state == FilterState::NoMatch
    }
}

/// Whether `item` matches an already-normalized `needle`.
pub fn matches(item: &Item, needle: &str) -> bool {
    needle.is_empty() || item.match_text().to_lowercase().contains(needle)
}

/// The synthetic disabled entry shown when nothing matches.
pub fn sentinel(no_match_text: &str) -> Item {
    Item::new("", no_match_text).with_disabled(true)
}

/// Renders `snapshot` through `query`.
///
/// `previous_selected` is the value selected in the live list before the
/// write; it stays selected if the view still contains it.
///
/// # Examples
///
/// ```
/// use choice_filter::filter::{apply, Query};
/// use choice_filter::Item;
///
/// let snapshot = vec![
///     Item::labeled("gpt-4o"),
///     Item::labeled("gpt-3.5-turbo"),
///     Item::labeled("claude-3-opus"),
/// ];
/// let view = apply(&snapshot, &Query::new("GPT "), None, "No matching model found");
/// let labels: Vec<_> = view.items.iter().map(|i| i.text.as_str()).collect();
/// assert_eq!(labels, ["gpt-4o", "gpt-3.5-turbo"]);
/// ```
pub fn apply(
    snapshot: &[Item],
    query: &Query,
    previous_selected: Option<&str>,
    no_match_text: &str,
) -> RenderedView {
    let (items, state) = if query.is_empty() {
        (snapshot.to_vec(), FilterState::Unfiltered)
    } else {
        let hits: Vec<Item> = snapshot
            .iter()
            .filter(|item| matches(item, query.needle()))
            .cloned()
            .collect();
        if hits.is_empty() {
            (vec![sentinel(no_match_text)], FilterState::NoMatch)
        } else {
            let matches = hits.len();
            (hits, FilterState::Filtered { matches })
        }
    };

    let selected = previous_selected
        .filter(|value| !value.is_empty())
        .filter(|value| items.iter().any(|item| item.value == *value))
        .map(str::to_string);

    RenderedView {
        items,
        selected,
        state,
    }
}
