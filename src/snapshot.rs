//! The trusted copy of the host's full choice set.
//!
//! The live list is written both by the host and by the engine's own filtered
//! renders, so it cannot be read back as the source of truth. The snapshot
//! store keeps the last copy believed to be host-authored and only lets it be
//! replaced by a capture that:
//!
//! - does not look like a "loading" or "no results" placeholder, and
//! - is strictly longer than the current snapshot, unless the caller forces it
//!   because it independently knows a load just completed.

use crate::item::Item;
use tracing::debug;

/// Why a capture was or was not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The capture replaced the snapshot.
    Committed,
    /// The live items look like a transient placeholder.
    Placeholder,
    /// A non-forced capture was not longer than the current snapshot.
    NotGrown {
        /// Length of the rejected capture.
        observed: usize,
        /// Length of the kept snapshot.
        known: usize,
    },
}

impl CaptureOutcome {
    /// Whether the snapshot changed.
    pub fn committed(self) -> bool {
        self == CaptureOutcome::Committed
    }
}

/// Holds the last trusted copy of the choice list.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    items: Vec<Item>,
    markers: Vec<String>,
}

impl SnapshotStore {
    /// Creates an empty store using lower-cased placeholder `markers`.
    pub fn new(markers: Vec<String>) -> Self {
        Self {
            items: Vec::new(),
            markers,
        }
    }

    /// Offers a live capture; returns whether it was committed.
    pub fn capture(&mut self, live: &[Item], force: bool) -> bool {
        self.offer(live, force).committed()
    }

    /// Offers a live capture and reports the decision.
    pub fn offer(&mut self, live: &[Item], force: bool) -> CaptureOutcome {
        let outcome = if is_placeholder(live, &self.markers) {
            CaptureOutcome::Placeholder
        } else if force || live.len() > self.items.len() {
            self.items = live.to_vec();
            CaptureOutcome::Committed
        } else {
            CaptureOutcome::NotGrown {
                observed: live.len(),
                known: self.items.len(),
            }
        };
        debug!(?outcome, force, live = live.len(), "snapshot capture");
        outcome
    }

    /// The trusted items, in host order.
    pub fn get(&self) -> &[Item] {
        &self.items
    }

    /// Number of trusted items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forgets the snapshot, e.g. when the list element went away.
    pub fn reset(&mut self) {
        self.items.clear();
    }
}

/// Whether `items` look like a host placeholder rather than real content.
///
/// An empty list counts, as does a lone entry whose label contains one of the
/// `markers` (compared lower-cased) or that is a disabled entry with no value.
pub fn is_placeholder(items: &[Item], markers: &[String]) -> bool {
    match items {
        [] => true,
        [only] => {
            if only.disabled && only.value.is_empty() {
                return true;
            }
            let label = only.match_text().to_lowercase();
            markers.iter().any(|m| label.contains(m.as_str()))
        }
        _ => false,
    }
}
