//! Trailing-edge timers built on `bubbletea_rs::tick`.
//!
//! A [`Debouncer`] never cancels a command that is already in flight. Instead,
//! every `schedule` bumps an internal tag and the tick carries the tag it was
//! created with. When the [`DeadlineMsg`] comes back, only the one matching the
//! current tag fires; everything older is stale and dropped. This gives
//! "each new trigger cancels and reschedules" semantics with no overlap
//! between timers of the same kind.
//!
//! ```rust
//! use choice_filter::debounce::Debouncer;
//! use std::time::Duration;
//!
//! let mut debouncer = Debouncer::new(Duration::from_millis(150));
//! let _first = debouncer.schedule();
//! let stale = debouncer.deadline_msg().unwrap();
//! let _second = debouncer.schedule();
//!
//! assert!(!debouncer.fire(&(Box::new(stale) as bubbletea_rs::Msg)));
//! let current = debouncer.deadline_msg().unwrap();
//! assert!(debouncer.fire(&(Box::new(current) as bubbletea_rs::Msg)));
//! ```

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::trace;

// Used to ensure deadline messages are only accepted by the timer that sent them.
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Sent when a scheduled debounce period elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineMsg {
    /// Identifier of the debouncer that scheduled this deadline.
    pub id: i64,
    tag: i64,
}

/// A restartable trailing-edge timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Quiet period between the last `schedule` and the deadline.
    pub delay: Duration,
    id: i64,
    tag: i64,
    pending: bool,
}

impl Debouncer {
    /// Creates an idle debouncer with a unique id.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            id: next_id(),
            tag: 0,
            pending: false,
        }
    }

    /// Unique identifier of this debouncer.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Whether a deadline is outstanding.
    pub fn pending(&self) -> bool {
        self.pending
    }

    /// (Re)starts the timer. Any previously scheduled deadline becomes stale.
    pub fn schedule(&mut self) -> Cmd {
        self.tag += 1;
        self.pending = true;
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.delay, move |_| Box::new(DeadlineMsg { id, tag }) as Msg)
    }

    /// Invalidates the outstanding deadline, if any.
    pub fn cancel(&mut self) {
        self.tag += 1;
        self.pending = false;
    }

    /// Consumes `msg` if it is this debouncer's current deadline.
    ///
    /// Returns `true` exactly once per `schedule`, and only for the most
    /// recent one.
    pub fn fire(&mut self, msg: &Msg) -> bool {
        let Some(deadline) = msg.downcast_ref::<DeadlineMsg>() else {
            return false;
        };
        if deadline.id != self.id {
            return false;
        }
        if !self.pending || deadline.tag != self.tag {
            trace!(id = self.id, tag = deadline.tag, current = self.tag, "stale deadline");
            return false;
        }
        self.pending = false;
        true
    }

    /// The message the outstanding deadline will deliver, if one is pending.
    ///
    /// Lets a caller drive the component synchronously, e.g. in tests or when
    /// an embedding runtime owns its own clock.
    pub fn deadline_msg(&self) -> Option<DeadlineMsg> {
        self.pending.then(|| DeadlineMsg {
            id: self.id,
            tag: self.tag,
        })
    }
}
