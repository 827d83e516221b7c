//! Debounced input controller.
//!
//! Every edit is persisted right away, so the remembered query never lags
//! behind what the user sees in the input. Only the re-render of the list
//! waits for typing to pause.

use crate::debounce::{DeadlineMsg, Debouncer};
use crate::filter::Query;
use crate::storage::{PersistedQuery, QueryStore};
use bubbletea_rs::{Cmd, Msg};
use std::time::Duration;

/// Owns the current query and its persisted copy.
#[derive(Debug)]
pub struct InputController<S: QueryStore> {
    query: Query,
    persisted: PersistedQuery<S>,
    debounce: Debouncer,
}

impl<S: QueryStore> InputController<S> {
    /// Creates a controller with an empty query.
    pub fn new(persisted: PersistedQuery<S>, debounce: Duration) -> Self {
        Self {
            query: Query::default(),
            persisted,
            debounce: Debouncer::new(debounce),
        }
    }

    /// Current query, including edits whose render is still pending.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The persisted query binding.
    pub fn persisted(&self) -> &PersistedQuery<S> {
        &self.persisted
    }

    /// Reloads the query from storage. Used at attachment time.
    pub fn restore(&mut self) -> &Query {
        self.query = Query::new(self.persisted.load());
        &self.query
    }

    /// Handles an edit: persists `raw` immediately and (re)starts the render
    /// debounce.
    pub fn on_input(&mut self, raw: &str) -> Cmd {
        self.persisted.save(raw);
        self.query = Query::new(raw);
        self.debounce.schedule()
    }

    /// Clears the query at once, without waiting for a debounce.
    pub fn clear(&mut self) {
        self.persisted.save("");
        self.query = Query::default();
        self.debounce.cancel();
    }

    /// Returns the query to render if `msg` is the current debounce deadline.
    pub fn fire(&mut self, msg: &Msg) -> Option<Query> {
        self.debounce.fire(msg).then(|| self.query.clone())
    }

    /// Pending render deadline, if typing has not settled yet.
    pub fn deadline_msg(&self) -> Option<DeadlineMsg> {
        self.debounce.deadline_msg()
    }
}
