//! Controller state and the operations that touch the host.

use crate::availability::TargetWatcher;
use crate::bootstrap::{AttachOutcome, AttachState, Attachment, Bootstrapper};
use crate::config::Config;
use crate::debounce::DeadlineMsg;
use crate::error::Result;
use crate::filter::{self, Query};
use crate::host::HostDocument;
use crate::input::InputController;
use crate::selfwrite::SelfWriteWindow;
use crate::storage::{PersistedQuery, QueryStore};
use bubbletea_rs::Cmd;
use tracing::{debug, info, warn};

/// Searchable-choice-list controller.
///
/// `D` is the host document owning the list; `S` is where the query is
/// remembered between sessions.
#[derive(Debug)]
pub struct Model<D: HostDocument, S: QueryStore> {
    pub(super) config: Config,
    pub(super) host: Option<D>,
    pub(super) input: InputController<S>,
    pub(super) bootstrap: Bootstrapper,
    pub(super) target: TargetWatcher,
    pub(super) self_write: SelfWriteWindow,
}

impl<D: HostDocument, S: QueryStore> Model<D, S> {
    /// Creates a controller. Without a host document the controller is
    /// inert.
    pub fn new(config: Config, host: Option<D>, store: S) -> Self {
        if host.is_none() {
            warn!("no host document available, filter disabled");
        }
        let persisted = PersistedQuery::new(store, config.storage_key.clone());
        Self {
            input: InputController::new(persisted, config.input_debounce),
            bootstrap: Bootstrapper::new(),
            target: TargetWatcher::new(config.retry_interval, config.retry_attempts()),
            self_write: SelfWriteWindow::new(config.self_write_grace),
            host,
            config,
        }
    }

    /// Creates a controller from a fallible host lookup. A failed lookup is
    /// logged and treated like a missing host.
    pub fn resolve<F>(config: Config, store: S, resolve: F) -> Self
    where
        F: FnOnce() -> Result<D>,
    {
        let host = match resolve() {
            Ok(host) => Some(host),
            Err(err) => {
                warn!(error = %err, "could not resolve host document");
                None
            }
        };
        Self::new(config, host, store)
    }

    /// Starts the controller: subscribes to document changes and attaches
    /// right away if the list is already there, otherwise starts the bounded
    /// retry.
    pub fn start(&mut self) -> Option<Cmd> {
        let host = self.host.as_mut()?;
        self.target.subscribe(host);
        let (attached, cmd) = self.attach();
        if attached {
            cmd
        } else {
            debug!("choice list not present yet, searching");
            self.target.begin()
        }
    }

    /// Attaches to the host's list if possible.
    ///
    /// Returns whether the controller is attached afterwards, plus the
    /// command of the initial render on a fresh attachment. Calling it while
    /// attached changes nothing.
    pub fn attach(&mut self) -> (bool, Option<Cmd>) {
        let Some(host) = self.host.as_mut() else {
            return (false, None);
        };
        if self.bootstrap.is_intact(host) {
            return (true, None);
        }
        let initial = self.input.restore().raw().to_string();
        match self.bootstrap.attach(host, &self.config, &initial) {
            AttachOutcome::AlreadyAttached => (true, None),
            AttachOutcome::Attached { .. } => {
                self.target.stop();
                (true, self.resync(true))
            }
            AttachOutcome::NotFound | AttachOutcome::Failed => (false, None),
        }
    }

    /// Leaves the current attachment. If the list is still in the document
    /// its full contents are put back, after the list subscription is gone
    /// so the write is never observed as a host change.
    pub(super) fn detach(&mut self) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        let Some(old) = self.bootstrap.detach(host) else {
            return;
        };
        let list = old.list();
        let snapshot = old.snapshot();
        if !self.input.query().is_empty() && !snapshot.is_empty() && host.contains(list) {
            let selected = host.selected_value(list);
            if let Err(err) = host.replace_items(list, snapshot.get(), selected.as_deref()) {
                warn!(error = %err, "could not restore list before detaching");
            }
        }
    }

    /// Tears the controller down: document subscriptions and the bounded
    /// retry stop, the list gets its full contents back and an inserted
    /// search input is removed. Later messages are ignored until
    /// [`Model::start`] is called again.
    pub fn stop(&mut self) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        self.target.stop();
        self.target.unsubscribe(host);
        self.detach();
        self.bootstrap.reset();
        info!("filter stopped");
    }

    /// Captures the live list and re-applies the query if the capture was
    /// accepted.
    pub(super) fn resync(&mut self, force: bool) -> Option<Cmd> {
        let host = self.host.as_ref()?;
        let attachment = self.bootstrap.attachment_mut()?;
        let live = host.read_items(attachment.list());
        let committed = attachment.snapshot.capture(&live, force);
        if !committed || self.input.query().is_empty() {
            return None;
        }
        self.render()
    }

    /// Writes the filtered view of the snapshot into the live list.
    ///
    /// If nothing has been captured yet a non-forced capture is tried first;
    /// when that yields nothing either, the list is left untouched.
    pub(super) fn render(&mut self) -> Option<Cmd> {
        let host = self.host.as_mut()?;
        let attachment = self.bootstrap.attachment_mut()?;
        let list = attachment.list();
        if attachment.snapshot.is_empty() {
            let live = host.read_items(list);
            attachment.snapshot.capture(&live, false);
            if attachment.snapshot.is_empty() {
                debug!("no trusted snapshot yet, render deferred");
                return None;
            }
        }

        let previous = host.selected_value(list);
        let view = filter::apply(
            attachment.snapshot.get(),
            self.input.query(),
            previous.as_deref(),
            &self.config.no_match_text,
        );
        let release = self.self_write.hold();
        if let Err(err) = host.replace_items(list, &view.items, view.selected.as_deref()) {
            warn!(error = %err, "could not write filtered list");
        }
        debug!(
            query = self.input.query().raw(),
            state = ?view.state,
            shown = view.items.len(),
            "list rendered"
        );
        Some(release)
    }

    /// Resets the query and shows the full list again.
    pub(super) fn clear(&mut self) -> Option<Cmd> {
        self.input.clear();
        if let (Some(host), Some(attachment)) = (self.host.as_mut(), self.bootstrap.attachment())
        {
            if let Err(err) = host.set_input_value(attachment.companion(), "") {
                warn!(error = %err, "could not clear search input");
            }
        }
        info!("query cleared");
        self.render()
    }

    /// Whether the controller has no host document.
    pub fn is_inert(&self) -> bool {
        self.host.is_none()
    }

    /// Attachment state.
    pub fn state(&self) -> AttachState {
        self.bootstrap.state()
    }

    /// Current attachment, if any.
    pub fn attachment(&self) -> Option<&Attachment> {
        self.bootstrap.attachment()
    }

    /// Number of attachments made so far.
    pub fn attachments(&self) -> usize {
        self.bootstrap.attachments()
    }

    /// The latest typed query.
    pub fn query(&self) -> &Query {
        self.input.query()
    }

    /// Length of the trusted snapshot; zero when unattached.
    pub fn snapshot_len(&self) -> usize {
        self.bootstrap
            .attachment()
            .map_or(0, |a| a.snapshot().len())
    }

    /// Whether the self-write window is open.
    pub fn is_self_writing(&self) -> bool {
        self.self_write.is_active()
    }

    /// Number of engine writes to the live list.
    pub fn writes(&self) -> u64 {
        self.self_write.writes()
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The host document, if any.
    pub fn host(&self) -> Option<&D> {
        self.host.as_ref()
    }

    /// Pending render deadline of the input debounce.
    pub fn input_deadline(&self) -> Option<DeadlineMsg> {
        self.input.deadline_msg()
    }

    /// Pending settle deadline of the change watcher.
    pub fn settle_deadline(&self) -> Option<DeadlineMsg> {
        self.bootstrap
            .attachment()
            .and_then(|a| a.watcher().settle_msg())
    }

    /// Pending release deadline of the self-write window.
    pub fn release_deadline(&self) -> Option<DeadlineMsg> {
        self.self_write.release_msg()
    }

    /// Pending bounded-retry deadline.
    pub fn retry_deadline(&self) -> Option<DeadlineMsg> {
        self.target.retry_msg()
    }
}
