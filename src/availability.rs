//! One channel for "the target may have appeared or disappeared".
//!
//! Two sources feed it: a bounded retry timer, the fast path while the host is
//! still rendering, and document-level structural subscriptions, which have no
//! horizon and catch late or repeated re-renders. Both come out of
//! [`TargetWatcher::on_msg`] as a [`Trigger`], so the bootstrapper handles a
//! single kind of event regardless of its origin.

use crate::debounce::{DeadlineMsg, Debouncer};
use crate::error::Error;
use crate::host::{DocumentMutatedMsg, HostDocument, ObserveTarget, Scope, SubscriptionId};
use bubbletea_rs::{Cmd, Msg};
use std::time::Duration;
use tracing::{debug, warn};

/// What prompted an availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A bounded retry attempt came due.
    Retry {
        /// 1-based attempt number.
        attempt: u32,
    },
    /// A document changed structurally.
    Structural(Scope),
}

/// Feeds availability triggers from the retry timer and document observers.
#[derive(Debug, Clone)]
pub struct TargetWatcher {
    retry: Debouncer,
    attempts: u32,
    max_attempts: u32,
    subscriptions: Vec<(Scope, SubscriptionId)>,
    refused: Vec<Scope>,
}

impl TargetWatcher {
    /// Creates a watcher retrying every `interval`, at most `max_attempts`
    /// times per search.
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            retry: Debouncer::new(interval),
            attempts: 0,
            max_attempts,
            subscriptions: Vec::new(),
            refused: Vec::new(),
        }
    }

    /// Subscribes to structural changes of the own document and, where
    /// permitted, the parent document. Calling it again is a no-op for scopes
    /// already subscribed or already refused.
    pub fn subscribe<D: HostDocument>(&mut self, host: &mut D) {
        for scope in [Scope::Own, Scope::Parent] {
            if self.refused.contains(&scope)
                || self.subscriptions.iter().any(|(s, _)| *s == scope)
            {
                continue;
            }
            match host.observe(ObserveTarget::Document(scope)) {
                Ok(id) => self.subscriptions.push((scope, id)),
                Err(Error::AccessDenied(scope)) => {
                    debug!(%scope, "document not observable, staying within own context");
                    self.refused.push(scope);
                }
                Err(err) => {
                    warn!(%scope, error = %err, "could not observe document");
                    self.refused.push(scope);
                }
            }
        }
    }

    /// Scopes currently observed.
    pub fn scopes(&self) -> Vec<Scope> {
        self.subscriptions.iter().map(|(s, _)| *s).collect()
    }

    /// Starts a fresh bounded search. Returns `None` when retries are
    /// disabled.
    pub fn begin(&mut self) -> Option<Cmd> {
        self.attempts = 0;
        if self.max_attempts == 0 {
            return None;
        }
        Some(self.retry.schedule())
    }

    /// Schedules the next attempt if the horizon allows it.
    pub fn reschedule(&mut self) -> Option<Cmd> {
        if self.attempts >= self.max_attempts {
            debug!(attempts = self.attempts, "bounded retry exhausted");
            return None;
        }
        Some(self.retry.schedule())
    }

    /// Stops the bounded retry.
    pub fn stop(&mut self) {
        self.retry.cancel();
    }

    /// Whether a retry attempt is pending.
    pub fn retrying(&self) -> bool {
        self.retry.pending()
    }

    /// Attempts made in the current search.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Turns `msg` into a trigger if it is one of ours.
    pub fn on_msg(&mut self, msg: &Msg) -> Option<Trigger> {
        if self.retry.fire(msg) {
            self.attempts += 1;
            return Some(Trigger::Retry {
                attempt: self.attempts,
            });
        }
        msg.downcast_ref::<DocumentMutatedMsg>()
            .map(|m| Trigger::Structural(m.scope))
    }

    /// Pending retry deadline, if any.
    pub fn retry_msg(&self) -> Option<DeadlineMsg> {
        self.retry.deadline_msg()
    }

    /// Drops every document subscription.
    pub fn unsubscribe<D: HostDocument>(&mut self, host: &mut D) {
        for (_, id) in self.subscriptions.drain(..) {
            host.unobserve(id);
        }
    }
}
