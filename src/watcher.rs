//! Change watcher for the live choice list.
//!
//! Structural notifications are coalesced into one trailing-edge decision.
//! Per attachment the watcher walks
//!
//! ```text
//! Idle -> ObservedChange -> (self-write?  Idle
//!                            count grew?  Resyncing -> Idle
//!                            otherwise    Idle)
//! ```
//!
//! Only strict growth is treated as a host refresh. Equal or smaller counts
//! are selection churn or the engine's own shrinking filter write racing with
//! the observation.

use crate::debounce::{DeadlineMsg, Debouncer};
use bubbletea_rs::{Cmd, Msg};
use std::time::Duration;
use tracing::debug;

/// Where the watcher is in its per-attachment cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Nothing pending.
    Idle,
    /// A notification arrived; the settle deadline is pending.
    ObservedChange,
    /// A host refresh was confirmed and is being re-synchronized.
    Resyncing,
}

/// Decision taken when a batch of changes settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The engine itself was writing; nothing to do.
    SelfWrite,
    /// The list did not grow; treated as noise.
    Noise {
        /// Live item count.
        observed: usize,
        /// Snapshot length.
        known: usize,
    },
    /// The host refreshed the list; force a capture and re-apply the query.
    Grew {
        /// Live item count.
        observed: usize,
        /// Snapshot length.
        known: usize,
    },
}

/// Watches one live list for host-originated refreshes.
#[derive(Debug, Clone)]
pub struct ChangeWatcher {
    state: WatchState,
    settle: Debouncer,
    ignored_self_writes: usize,
    resyncs: usize,
}

impl ChangeWatcher {
    /// Creates an idle watcher that settles after `debounce`.
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: WatchState::Idle,
            settle: Debouncer::new(debounce),
            ignored_self_writes: 0,
            resyncs: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Number of settled batches dismissed as self-writes.
    pub fn ignored_self_writes(&self) -> usize {
        self.ignored_self_writes
    }

    /// Number of confirmed host refreshes.
    pub fn resyncs(&self) -> usize {
        self.resyncs
    }

    /// Records a structural notification and (re)starts the settle timer.
    ///
    /// Nothing is decided here; whether the batch was self-inflicted is
    /// only asked once it settles.
    pub fn observe(&mut self) -> Cmd {
        self.state = WatchState::ObservedChange;
        self.settle.schedule()
    }

    /// Whether `msg` is this watcher's current settle deadline.
    pub fn fire(&mut self, msg: &Msg) -> bool {
        self.settle.fire(msg)
    }

    /// Decides what the settled batch means. The self-write window is
    /// checked before anything else.
    pub fn decide(&mut self, self_write_active: bool, observed: usize, known: usize) -> Verdict {
        let verdict = if self_write_active {
            self.ignored_self_writes += 1;
            Verdict::SelfWrite
        } else if observed > known {
            Verdict::Grew { observed, known }
        } else {
            Verdict::Noise { observed, known }
        };
        self.state = match verdict {
            Verdict::Grew { .. } => {
                self.resyncs += 1;
                WatchState::Resyncing
            }
            _ => WatchState::Idle,
        };
        debug!(?verdict, "list change settled");
        verdict
    }

    /// Marks the resync triggered by [`Verdict::Grew`] as done.
    pub fn finish_resync(&mut self) {
        if self.state == WatchState::Resyncing {
            self.state = WatchState::Idle;
        }
    }

    /// Drops any pending decision, e.g. on detachment.
    pub fn reset(&mut self) {
        self.settle.cancel();
        self.state = WatchState::Idle;
    }

    /// Pending settle deadline, if any.
    pub fn settle_msg(&self) -> Option<DeadlineMsg> {
        self.settle.deadline_msg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watcher() -> ChangeWatcher {
        ChangeWatcher::new(Duration::from_millis(300))
    }

    #[test]
    fn test_notification_inside_window_still_settles() {
        let mut w = watcher();
        let _ = w.observe();
        assert_eq!(w.state(), WatchState::ObservedChange);
        let settle = w.settle_msg().expect("settle pending");
        assert!(w.fire(&(Box::new(settle) as Msg)));
        // The window closed before the batch settled: growth is still seen.
        assert!(matches!(w.decide(false, 5, 3), Verdict::Grew { .. }));
        assert_eq!(w.ignored_self_writes(), 0);
    }

    #[test]
    fn test_growth_triggers_resync() {
        let mut w = watcher();
        let _ = w.observe();
        assert_eq!(w.state(), WatchState::ObservedChange);

        let settle = w.settle_msg().expect("settle pending");
        assert!(w.fire(&(Box::new(settle) as Msg)));
        assert_eq!(
            w.decide(false, 40, 0),
            Verdict::Grew {
                observed: 40,
                known: 0
            }
        );
        assert_eq!(w.state(), WatchState::Resyncing);
        w.finish_resync();
        assert_eq!(w.state(), WatchState::Idle);
        assert_eq!(w.resyncs(), 1);
    }

    #[test]
    fn test_shrink_and_equal_are_noise() {
        let mut w = watcher();
        assert!(matches!(w.decide(false, 3, 40), Verdict::Noise { .. }));
        assert!(matches!(w.decide(false, 40, 40), Verdict::Noise { .. }));
        assert_eq!(w.state(), WatchState::Idle);
        assert_eq!(w.resyncs(), 0);
    }

    #[test]
    fn test_self_write_checked_first() {
        let mut w = watcher();
        let _ = w.observe();
        assert_eq!(w.decide(true, 100, 1), Verdict::SelfWrite);
        assert_eq!(w.state(), WatchState::Idle);
        assert_eq!(w.ignored_self_writes(), 1);
        assert_eq!(w.resyncs(), 0);
    }

    #[test]
    fn test_burst_coalesces_to_latest_deadline() {
        let mut w = watcher();
        let _ = w.observe();
        let first = w.settle_msg().expect("pending");
        let _ = w.observe();
        let _ = w.observe();
        assert!(!w.fire(&(Box::new(first) as Msg)));
        let last = w.settle_msg().expect("pending");
        assert!(w.fire(&(Box::new(last) as Msg)));
    }

    #[test]
    fn test_reset() {
        let mut w = watcher();
        let _ = w.observe();
        w.reset();
        assert_eq!(w.state(), WatchState::Idle);
        assert!(w.settle_msg().is_none());
    }
}
