//! The boundary to the document that owns the choice list.
//!
//! The filter never touches a concrete DOM. Everything it needs from the host
//! goes through [`HostDocument`]: finding the list, reading and replacing its
//! entries, inserting the companion search input and subscribing to
//! structural changes. Notifications flow back as ordinary messages
//! ([`ListMutatedMsg`], [`DocumentMutatedMsg`], [`InputMsg`],
//! [`ClearRequestedMsg`]) delivered to the controller's `update`.
//!
//! [`memory::MemoryDocument`] is a complete in-memory implementation for
//! tests and headless embedding.

pub mod memory;

use crate::error::Result;
use crate::item::Item;
use std::fmt;

/// Opaque handle to an element of the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to an active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Which browsing context a document-level subscription watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The context the filter runs in.
    Own,
    /// The embedding parent context, which may refuse access.
    Parent,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scope::Own => "own",
            Scope::Parent => "parent",
        })
    }
}

/// What a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserveTarget {
    /// Structural changes beneath a list element. Delivers [`ListMutatedMsg`].
    List(ElementId),
    /// Structural changes anywhere in a document. Delivers
    /// [`DocumentMutatedMsg`].
    Document(Scope),
    /// Activations of a host control. Delivers [`ClearRequestedMsg`].
    Activation(ElementId),
    /// Edits of the companion input. Delivers [`InputMsg`].
    Input(ElementId),
}

/// The search input inserted next to the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionInput {
    /// Element id, used to find the input again after a host re-render.
    pub dom_id: String,
    /// Placeholder text.
    pub placeholder: String,
    /// Initial value.
    pub value: String,
}

/// Everything the filter needs from the document that owns the list.
pub trait HostDocument: Send {
    /// Finds the target choice list, if it is currently in the document.
    fn locate_list(&self) -> Option<ElementId>;

    /// Whether `element` is still attached to the document.
    fn contains(&self, element: ElementId) -> bool;

    /// Reads the list's entries in order.
    fn read_items(&self, list: ElementId) -> Vec<Item>;

    /// Value currently selected in the list, if any.
    fn selected_value(&self, list: ElementId) -> Option<String>;

    /// Replaces the list's entries, then selects `selected` when it is given
    /// and present.
    fn replace_items(&mut self, list: ElementId, items: &[Item], selected: Option<&str>)
        -> Result<()>;

    /// Finds an existing element by its element id attribute.
    fn find_by_dom_id(&self, dom_id: &str) -> Option<ElementId>;

    /// Inserts `input` as a sibling just before `list`.
    fn insert_companion(&mut self, list: ElementId, input: &CompanionInput) -> Result<ElementId>;

    /// Removes an element the filter inserted earlier.
    fn remove(&mut self, element: ElementId);

    /// Sets the companion input's value without emitting an input event.
    fn set_input_value(&mut self, input: ElementId, value: &str) -> Result<()>;

    /// Finds the host's "clear configuration" control, if it has one.
    fn locate_clear_control(&self) -> Option<ElementId> {
        None
    }

    /// Starts delivering notifications for `target`.
    fn observe(&mut self, target: ObserveTarget) -> Result<SubscriptionId>;

    /// Stops a subscription. Unknown ids are ignored.
    fn unobserve(&mut self, subscription: SubscriptionId);
}

/// Something changed beneath an observed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMutatedMsg {
    /// The list that changed.
    pub list: ElementId,
}

/// Something changed somewhere in an observed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMutatedMsg {
    /// Which document changed.
    pub scope: Scope,
}

/// The user edited the companion input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMsg {
    /// The input element.
    pub input: ElementId,
    /// Its full new value, untrimmed.
    pub value: String,
}

/// The host's clear control was activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearRequestedMsg;
