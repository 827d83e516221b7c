//! Attachment bootstrapper.
//!
//! Finds the target list through the host, places (or reuses) the companion
//! search input, and wires the per-attachment subscriptions. Everything that
//! belongs to one attachment lives in an [`Attachment`]: when the target goes
//! away the whole value is dropped, which discards the snapshot and resets the
//! change watcher in one step.
//!
//! ```text
//! Unattached -> Searching -> Attached
//!                   ^           |
//!                   +-----------+  list or companion missing
//! ```

use crate::config::Config;
use crate::host::{CompanionInput, ElementId, HostDocument, ObserveTarget, SubscriptionId};
use crate::snapshot::SnapshotStore;
use crate::watcher::ChangeWatcher;
use tracing::{info, warn};

/// Bootstrapper state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    /// Nothing attempted yet.
    Unattached,
    /// Looking for the target list.
    Searching,
    /// Wired to a list and its companion input.
    Attached,
}

/// Result of one attachment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// The existing attachment is intact; nothing was touched.
    AlreadyAttached,
    /// A new attachment was made.
    Attached {
        /// Whether a companion input left in the document was reused.
        reused_input: bool,
    },
    /// The host has no target list right now.
    NotFound,
    /// The list was found but could not be wired; nothing was left behind.
    Failed,
}

/// Per-attachment context: the wired elements, their subscriptions, and the
/// state that must not outlive them.
#[derive(Debug, Clone)]
pub struct Attachment {
    list: ElementId,
    companion: ElementId,
    inserted_companion: bool,
    subscriptions: Vec<SubscriptionId>,
    pub(crate) snapshot: SnapshotStore,
    pub(crate) watcher: ChangeWatcher,
}

impl Attachment {
    /// The target list.
    pub fn list(&self) -> ElementId {
        self.list
    }

    /// The companion search input.
    pub fn companion(&self) -> ElementId {
        self.companion
    }

    /// Trusted snapshot of the list.
    pub fn snapshot(&self) -> &SnapshotStore {
        &self.snapshot
    }

    /// Change watcher of the list.
    pub fn watcher(&self) -> &ChangeWatcher {
        &self.watcher
    }
}

/// Drives discovery and (re)attachment.
#[derive(Debug, Clone)]
pub struct Bootstrapper {
    state: AttachState,
    attachment: Option<Attachment>,
    attachments: usize,
}

impl Default for Bootstrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Bootstrapper {
    /// Creates an unattached bootstrapper.
    pub fn new() -> Self {
        Self {
            state: AttachState::Unattached,
            attachment: None,
            attachments: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> AttachState {
        self.state
    }

    /// Current attachment, if attached.
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub(crate) fn attachment_mut(&mut self) -> Option<&mut Attachment> {
        self.attachment.as_mut()
    }

    /// How many attachments have been made so far.
    pub fn attachments(&self) -> usize {
        self.attachments
    }

    /// Whether the current attachment's list is still the host's target and
    /// both it and the companion input are still in the document.
    pub fn is_intact<D: HostDocument>(&self, host: &D) -> bool {
        self.state == AttachState::Attached
            && self.attachment.as_ref().is_some_and(|a| {
                host.locate_list() == Some(a.list) && host.contains(a.companion)
            })
    }

    /// Attempts to attach. Idempotent while the current attachment is intact.
    pub fn attach<D: HostDocument>(
        &mut self,
        host: &mut D,
        config: &Config,
        initial_query: &str,
    ) -> AttachOutcome {
        if self.is_intact(host) {
            return AttachOutcome::AlreadyAttached;
        }
        if self.attachment.is_some() {
            self.detach(host);
        }
        self.state = AttachState::Searching;

        let Some(list) = host.locate_list() else {
            return AttachOutcome::NotFound;
        };

        let (companion, reused_input) = match host.find_by_dom_id(&config.input_id) {
            Some(existing) => {
                if let Err(err) = host.set_input_value(existing, initial_query) {
                    warn!(error = %err, "could not restore query into existing input");
                }
                (existing, true)
            }
            None => {
                let input = CompanionInput {
                    dom_id: config.input_id.clone(),
                    placeholder: config.placeholder.clone(),
                    value: initial_query.to_string(),
                };
                match host.insert_companion(list, &input) {
                    Ok(id) => (id, false),
                    Err(err) => {
                        warn!(error = %err, "could not insert search input");
                        return AttachOutcome::Failed;
                    }
                }
            }
        };

        let mut subscriptions = Vec::new();
        for target in [ObserveTarget::List(list), ObserveTarget::Input(companion)] {
            match host.observe(target) {
                Ok(id) => subscriptions.push(id),
                Err(err) => {
                    warn!(?target, error = %err, "could not subscribe, attachment abandoned");
                    for id in subscriptions {
                        host.unobserve(id);
                    }
                    if !reused_input {
                        host.remove(companion);
                    }
                    return AttachOutcome::Failed;
                }
            }
        }
        if let Some(control) = host.locate_clear_control() {
            match host.observe(ObserveTarget::Activation(control)) {
                Ok(id) => subscriptions.push(id),
                Err(err) => warn!(error = %err, "clear control not observable"),
            }
        }

        self.attachment = Some(Attachment {
            list,
            companion,
            inserted_companion: !reused_input,
            subscriptions,
            snapshot: SnapshotStore::new(config.capture_markers()),
            watcher: ChangeWatcher::new(config.watch_debounce),
        });
        self.state = AttachState::Attached;
        self.attachments += 1;
        info!(%list, %companion, reused_input, "attached to choice list");
        AttachOutcome::Attached { reused_input }
    }

    /// Tears down the current attachment and goes back to searching.
    ///
    /// The detached context is handed back so the caller can still read its
    /// snapshot; dropping it discards the snapshot and watcher state.
    pub fn detach<D: HostDocument>(&mut self, host: &mut D) -> Option<Attachment> {
        let attachment = self.attachment.take()?;
        for id in &attachment.subscriptions {
            host.unobserve(*id);
        }
        if attachment.inserted_companion && host.contains(attachment.companion) {
            host.remove(attachment.companion);
        }
        self.state = AttachState::Searching;
        info!(list = %attachment.list, "detached from choice list");
        Some(attachment)
    }

    /// Returns to [`AttachState::Unattached`]. Call after [`detach`](Self::detach)
    /// when the filter is shut down.
    pub fn reset(&mut self) {
        self.attachment = None;
        self.state = AttachState::Unattached;
    }
}
