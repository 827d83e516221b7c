#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/choice-filter/")]

//! # choice-filter
//!
//! A type-to-filter search box for a choice list owned by someone else.
//!
//! The host renders a single-selection list (typically a model picker) and
//! rewrites it whenever it likes: after a remote fetch, after a settings
//! change, or when it re-renders the whole form. This crate places a
//! companion search input next to that list, narrows the list to the entries
//! whose label contains the query, and keeps doing so correctly while the
//! host keeps rewriting the list underneath it.
//!
//! ## Overview
//!
//! - **Trusted snapshot**: the full option set is captured from the live list
//!   only when it is known to be host-authored, never from a filtered view
//!   the crate wrote itself, a loading placeholder or the no-match sentinel.
//! - **Self-write window**: the crate's own writes are recognised and never
//!   mistaken for a host refresh, so filtering cannot feed back into itself.
//! - **Debounced input**: every keystroke is persisted immediately; the list
//!   is re-rendered once typing pauses.
//! - **Robust attachment**: a bounded retry plus document-level structural
//!   subscriptions find the list however late it appears, and re-attach
//!   after the host re-renders it.
//!
//! ## Integration with bubbletea-rs
//!
//! The controller is an ordinary bubbletea-rs model. Host notifications and
//! timer deadlines are messages; every handler returns at most one command.
//!
//! ```rust
//! use choice_filter::prelude::*;
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//!
//! struct App {
//!     filter: FilterModel<MemoryDocument, MemoryStore>,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let doc = MemoryDocument::new().with_list(vec![Item::labeled("gpt-4o")]);
//!         let mut filter = FilterModel::new(Config::default(), Some(doc), MemoryStore::new());
//!         let cmd = filter.start();
//!         (Self { filter }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         self.filter.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.filter.view()
//!     }
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Role |
//! |--------|------|
//! | [`filter`] | Pure matching and rendering of a query against the snapshot |
//! | [`snapshot`] | Trusted snapshot with monotonic growth |
//! | [`watcher`] | Debounced detection of host refreshes |
//! | [`selfwrite`] | Guard window around the crate's own writes |
//! | [`input`] | Debounced, persisted query |
//! | [`availability`] | Bounded retry and structural triggers for discovery |
//! | [`bootstrap`] | Attachment state machine |
//! | [`controller`] | The model tying everything together |
//! | [`host`] | Boundary to the document owning the list |
//! | [`storage`] | Key/value persistence of the query |

pub mod availability;
pub mod bootstrap;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod host;
pub mod input;
pub mod item;
pub mod logging;
pub mod selfwrite;
pub mod snapshot;
pub mod storage;
pub mod watcher;

pub use bootstrap::{AttachOutcome, AttachState};
pub use config::{Config, DEFAULT_PLACEHOLDER_MARKERS};
pub use controller::Model as FilterModel;
pub use error::{Error, Result};
pub use filter::{apply, FilterState, Query, RenderedView};
pub use host::memory::MemoryDocument;
pub use host::{
    ClearRequestedMsg, DocumentMutatedMsg, ElementId, HostDocument, InputMsg, ListMutatedMsg,
    Scope,
};
pub use item::Item;
pub use storage::{FileStore, MemoryStore, QueryStore};

/// Prelude module for convenient imports.
///
/// ```rust
/// use choice_filter::prelude::*;
///
/// let config = Config::default();
/// let _model: FilterModel<MemoryDocument, MemoryStore> =
///     FilterModel::new(config, None, MemoryStore::new());
/// ```
pub mod prelude {
    pub use crate::bootstrap::AttachState;
    pub use crate::config::Config;
    pub use crate::controller::Model as FilterModel;
    pub use crate::error::{Error, Result};
    pub use crate::host::memory::MemoryDocument;
    pub use crate::host::{HostDocument, Scope};
    pub use crate::item::Item;
    pub use crate::storage::{FileStore, MemoryStore, QueryStore};
}
