//! Reentrancy guard for the engine's own writes.
//!
//! Writing a rendered view into the live list produces exactly the same
//! structural notifications as a host rewrite. The window is opened before
//! every engine write and closed by a trailing deadline, so the change watcher
//! can tell the two apart by asking [`SelfWriteWindow::is_active`] instead of
//! guessing from timing.

use crate::debounce::Debouncer;
use bubbletea_rs::{Cmd, Msg};
use std::time::Duration;

/// Open while the engine is writing to the live list, plus a grace period.
#[derive(Debug, Clone)]
pub struct SelfWriteWindow {
    active: bool,
    release: Debouncer,
    writes: u64,
}

impl SelfWriteWindow {
    /// Creates a closed window with the given trailing `grace`.
    pub fn new(grace: Duration) -> Self {
        Self {
            active: false,
            release: Debouncer::new(grace),
            writes: 0,
        }
    }

    /// Opens (or extends) the window. The returned command closes it after
    /// the grace period unless another write extends it first.
    pub fn hold(&mut self) -> Cmd {
        self.active = true;
        self.writes += 1;
        self.release.schedule()
    }

    /// Handles the release deadline; returns `true` if `msg` was consumed.
    pub fn update(&mut self, msg: &Msg) -> bool {
        if self.release.fire(msg) {
            self.active = false;
            return true;
        }
        false
    }

    /// Whether a change observed now is self-inflicted.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of engine writes performed under this window.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Pending release deadline, if the window is open.
    pub fn release_msg(&self) -> Option<crate::debounce::DeadlineMsg> {
        self.release.deadline_msg()
    }
}
