//! The filter controller.
//!
//! [`Model`] ties the pieces together: it finds the host's choice list, keeps
//! the trusted snapshot current as the host refreshes the list, and rewrites
//! the list whenever the debounced query changes. It follows the Elm
//! architecture used throughout the crate: host notifications and timer
//! deadlines arrive as messages, and every handler returns at most one
//! command for the runtime to schedule.
//!
//! # Basic Usage
//!
//! ```rust
//! use choice_filter::controller::Model;
//! use choice_filter::host::memory::MemoryDocument;
//! use choice_filter::storage::MemoryStore;
//! use choice_filter::{Config, Item};
//!
//! let doc = MemoryDocument::new().with_list(vec![
//!     Item::labeled("gpt-4o"),
//!     Item::labeled("claude-3-opus"),
//! ]);
//! let mut model = Model::new(Config::default(), Some(doc.clone()), MemoryStore::new());
//! let _ = model.start();
//!
//! doc.type_text("claude");
//! for msg in doc.drain() {
//!     let _ = model.update(msg);
//! }
//! // The render waits for the input debounce; deliver its deadline directly.
//! let due = model.input_deadline().unwrap();
//! let _ = model.update(Box::new(due));
//! assert_eq!(doc.labels(), ["claude-3-opus"]);
//! ```
//!
//! # Hosting without a document
//!
//! A controller created without a host document stays inert: every
//! operation is a no-op and nothing is ever written.

pub mod model;
mod update;
mod view;

#[cfg(test)]
mod tests;

pub use model::Model;
