//! In-memory host document.
//!
//! [`MemoryDocument`] models the one thing the filter cares about in a real
//! page: a single-selection list that some other code rewrites whenever it
//! likes, a companion input beside it, and mutation observers that report
//! structural changes. Notifications are queued rather than delivered, so a
//! test (or an embedding event loop) decides when they reach the controller
//! by calling [`MemoryDocument::drain`].
//!
//! The handle is cheaply cloneable; clones share the same document, which is
//! how a test keeps playing "the host" after handing a clone to the
//! controller.
//!
//! ```
//! use choice_filter::host::memory::MemoryDocument;
//! use choice_filter::host::HostDocument;
//! use choice_filter::Item;
//!
//! let doc = MemoryDocument::new().with_list(vec![Item::new("", "Loading...")]);
//! let list = doc.locate_list().unwrap();
//! doc.host_replace(vec![Item::labeled("gpt-4o"), Item::labeled("o1")]);
//! assert_eq!(doc.read_items(list).len(), 2);
//! assert_eq!(doc.selected_value(list).as_deref(), Some("gpt-4o"));
//! ```

use super::{
    ClearRequestedMsg, CompanionInput, DocumentMutatedMsg, ElementId, HostDocument, InputMsg,
    ListMutatedMsg, ObserveTarget, Scope, SubscriptionId,
};
use crate::error::{Error, Result};
use crate::item::Item;
use bubbletea_rs::Msg;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct ListNode {
    id: ElementId,
    items: Vec<Item>,
    selected: Option<String>,
}

#[derive(Debug, Clone)]
struct InputNode {
    id: ElementId,
    dom_id: String,
    placeholder: String,
    value: String,
}

#[derive(Default)]
struct Inner {
    next_element: u64,
    next_subscription: u64,
    list: Option<ListNode>,
    inputs: Vec<InputNode>,
    clear_control: Option<ElementId>,
    subscriptions: HashMap<SubscriptionId, ObserveTarget>,
    deny_parent: bool,
    pending: VecDeque<Msg>,
    engine_writes: usize,
}

impl Inner {
    fn allocate(&mut self) -> ElementId {
        self.next_element += 1;
        ElementId(self.next_element)
    }

    fn observed(&self, target: ObserveTarget) -> bool {
        self.subscriptions.values().any(|t| *t == target)
    }

    fn notify_document(&mut self) {
        if self.observed(ObserveTarget::Document(Scope::Own)) {
            self.pending
                .push_back(Box::new(DocumentMutatedMsg { scope: Scope::Own }) as Msg);
        }
    }

    fn notify_list(&mut self, list: ElementId) {
        if self.observed(ObserveTarget::List(list)) {
            self.pending.push_back(Box::new(ListMutatedMsg { list }) as Msg);
        }
        self.notify_document();
    }
}

/// Browser-like selection after a rewrite: the preferred value if present,
/// else the first entry flagged selected, else the first enabled entry.
fn settle_selection(items: &[Item], preferred: Option<&str>) -> Option<String> {
    preferred
        .and_then(|value| items.iter().find(|i| i.value == value && !i.disabled))
        .or_else(|| items.iter().find(|i| i.selected))
        .or_else(|| items.iter().find(|i| !i.disabled))
        .map(|i| i.value.clone())
}

/// Shared in-memory document holding at most one target list.
#[derive(Clone, Default)]
pub struct MemoryDocument {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MemoryDocument")
            .field("list", &inner.list)
            .field("inputs", &inner.inputs)
            .field("subscriptions", &inner.subscriptions.len())
            .field("pending", &inner.pending.len())
            .finish()
    }
}

impl MemoryDocument {
    /// Creates a document with no target list.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds the target list with `items`, without emitting notifications.
    pub fn with_list(self, items: Vec<Item>) -> Self {
        {
            let mut inner = self.lock();
            let id = inner.allocate();
            let selected = settle_selection(&items, None);
            inner.list = Some(ListNode { id, items, selected });
        }
        self
    }

    /// Adds a "clear configuration" control.
    pub fn with_clear_control(self) -> Self {
        {
            let mut inner = self.lock();
            let id = inner.allocate();
            inner.clear_control = Some(id);
        }
        self
    }

    /// Makes observation of the parent context fail with access denied.
    pub fn with_parent_denied(self) -> Self {
        self.lock().deny_parent = true;
        self
    }

    /// The host rewrites the list, as after a remote fetch completes.
    pub fn host_replace(&self, items: Vec<Item>) {
        let mut inner = self.lock();
        let Some(list) = inner.list.as_mut() else {
            return;
        };
        list.selected = settle_selection(&items, None);
        list.items = items;
        let id = list.id;
        inner.notify_list(id);
    }

    /// The host re-renders its form: the old list (and anything next to it)
    /// goes away and a fresh list element appears.
    pub fn host_rerender(&self, items: Vec<Item>) -> ElementId {
        let mut inner = self.lock();
        inner.inputs.clear();
        let id = inner.allocate();
        let selected = settle_selection(&items, None);
        inner.list = Some(ListNode { id, items, selected });
        inner.notify_document();
        id
    }

    /// The list element is removed from the document.
    pub fn remove_list(&self) {
        let mut inner = self.lock();
        inner.list = None;
        inner.inputs.clear();
        inner.notify_document();
    }

    /// A list element appears, e.g. when the settings panel is opened.
    pub fn insert_list(&self, items: Vec<Item>) -> ElementId {
        self.host_rerender(items)
    }

    /// The companion input is removed while the list stays.
    pub fn remove_companion(&self) {
        let mut inner = self.lock();
        inner.inputs.clear();
        inner.notify_document();
    }

    /// The user types into the companion input, replacing its whole value.
    pub fn type_text(&self, value: &str) {
        let mut inner = self.lock();
        let Some(input) = inner.inputs.first_mut() else {
            return;
        };
        input.value = value.to_string();
        let id = input.id;
        if inner.observed(ObserveTarget::Input(id)) {
            inner.pending.push_back(Box::new(InputMsg {
                input: id,
                value: value.to_string(),
            }) as Msg);
        }
    }

    /// The user picks `value` in the list.
    pub fn choose(&self, value: &str) {
        let mut inner = self.lock();
        if let Some(list) = inner.list.as_mut() {
            if list.items.iter().any(|i| i.value == value && !i.disabled) {
                list.selected = Some(value.to_string());
            }
        }
    }

    /// The user activates the clear control.
    pub fn click_clear(&self) {
        let mut inner = self.lock();
        let Some(id) = inner.clear_control else {
            return;
        };
        if inner.observed(ObserveTarget::Activation(id)) {
            inner.pending.push_back(Box::new(ClearRequestedMsg) as Msg);
        }
    }

    /// Takes every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Msg> {
        self.lock().pending.drain(..).collect()
    }

    /// Current target list id.
    pub fn list_id(&self) -> Option<ElementId> {
        self.lock().list.as_ref().map(|l| l.id)
    }

    /// Current list entries.
    pub fn items(&self) -> Vec<Item> {
        self.lock()
            .list
            .as_ref()
            .map(|l| l.items.clone())
            .unwrap_or_default()
    }

    /// Labels of the current list entries.
    pub fn labels(&self) -> Vec<String> {
        self.items().iter().map(|i| i.match_text().to_string()).collect()
    }

    /// Currently selected value.
    pub fn selected(&self) -> Option<String> {
        self.lock().list.as_ref().and_then(|l| l.selected.clone())
    }

    /// Number of companion inputs in the document.
    pub fn companion_count(&self) -> usize {
        self.lock().inputs.len()
    }

    /// Value of the first companion input.
    pub fn companion_value(&self) -> Option<String> {
        self.lock().inputs.first().map(|i| i.value.clone())
    }

    /// Placeholder of the first companion input.
    pub fn companion_placeholder(&self) -> Option<String> {
        self.lock().inputs.first().map(|i| i.placeholder.clone())
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.lock().subscriptions.len()
    }

    /// Number of subscriptions for `target`.
    pub fn subscriptions_for(&self, target: ObserveTarget) -> usize {
        self.lock()
            .subscriptions
            .values()
            .filter(|t| **t == target)
            .count()
    }

    /// Number of list rewrites performed through [`HostDocument::replace_items`].
    pub fn engine_writes(&self) -> usize {
        self.lock().engine_writes
    }
}

impl HostDocument for MemoryDocument {
    fn locate_list(&self) -> Option<ElementId> {
        self.list_id()
    }

    fn contains(&self, element: ElementId) -> bool {
        let inner = self.lock();
        inner.list.as_ref().is_some_and(|l| l.id == element)
            || inner.inputs.iter().any(|i| i.id == element)
            || inner.clear_control == Some(element)
    }

    fn read_items(&self, list: ElementId) -> Vec<Item> {
        let inner = self.lock();
        match inner.list.as_ref() {
            Some(node) if node.id == list => node.items.clone(),
            _ => Vec::new(),
        }
    }

    fn selected_value(&self, list: ElementId) -> Option<String> {
        let inner = self.lock();
        inner
            .list
            .as_ref()
            .filter(|node| node.id == list)
            .and_then(|node| node.selected.clone())
    }

    fn replace_items(
        &mut self,
        list: ElementId,
        items: &[Item],
        selected: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.lock();
        let node = match inner.list.as_mut() {
            Some(node) if node.id == list => node,
            _ => return Err(Error::ElementMissing(list)),
        };
        node.items = items.to_vec();
        node.selected = settle_selection(items, selected);
        inner.engine_writes += 1;
        inner.notify_list(list);
        Ok(())
    }

    fn find_by_dom_id(&self, dom_id: &str) -> Option<ElementId> {
        self.lock()
            .inputs
            .iter()
            .find(|i| i.dom_id == dom_id)
            .map(|i| i.id)
    }

    fn insert_companion(&mut self, list: ElementId, input: &CompanionInput) -> Result<ElementId> {
        let mut inner = self.lock();
        if !inner.list.as_ref().is_some_and(|l| l.id == list) {
            return Err(Error::ElementMissing(list));
        }
        let id = inner.allocate();
        inner.inputs.push(InputNode {
            id,
            dom_id: input.dom_id.clone(),
            placeholder: input.placeholder.clone(),
            value: input.value.clone(),
        });
        inner.notify_document();
        Ok(id)
    }

    fn remove(&mut self, element: ElementId) {
        let mut inner = self.lock();
        let before = inner.inputs.len();
        inner.inputs.retain(|i| i.id != element);
        if inner.inputs.len() != before {
            inner.notify_document();
        }
    }

    fn set_input_value(&mut self, input: ElementId, value: &str) -> Result<()> {
        let mut inner = self.lock();
        let node = inner
            .inputs
            .iter_mut()
            .find(|i| i.id == input)
            .ok_or(Error::ElementMissing(input))?;
        node.value = value.to_string();
        Ok(())
    }

    fn locate_clear_control(&self) -> Option<ElementId> {
        self.lock().clear_control
    }

    fn observe(&mut self, target: ObserveTarget) -> Result<SubscriptionId> {
        let mut inner = self.lock();
        if target == ObserveTarget::Document(Scope::Parent) && inner.deny_parent {
            return Err(Error::AccessDenied(Scope::Parent));
        }
        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.subscriptions.insert(id, target);
        Ok(id)
    }

    fn unobserve(&mut self, subscription: SubscriptionId) {
        self.lock().subscriptions.remove(&subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> Vec<Item> {
        vec![Item::labeled("gpt-4o"), Item::labeled("o1")]
    }

    #[test]
    fn test_notifications_require_subscription() {
        let mut doc = MemoryDocument::new().with_list(vec![]);
        doc.host_replace(models());
        assert!(doc.drain().is_empty());

        let list = doc.locate_list().expect("list");
        doc.observe(ObserveTarget::List(list)).expect("observe");
        doc.host_replace(models());
        let msgs = doc.drain();
        assert_eq!(msgs.len(), 1);
        assert_eq!(
            msgs[0].downcast_ref::<ListMutatedMsg>(),
            Some(&ListMutatedMsg { list })
        );
    }

    #[test]
    fn test_replace_items_keeps_preferred_selection() {
        let mut doc = MemoryDocument::new().with_list(models());
        let list = doc.locate_list().expect("list");
        doc.replace_items(list, &models(), Some("o1")).expect("write");
        assert_eq!(doc.selected().as_deref(), Some("o1"));
        doc.replace_items(list, &models(), Some("missing")).expect("write");
        assert_eq!(doc.selected().as_deref(), Some("gpt-4o"));
        assert_eq!(doc.engine_writes(), 2);
    }

    #[test]
    fn test_replace_on_detached_list_fails() {
        let mut doc = MemoryDocument::new().with_list(models());
        let list = doc.locate_list().expect("list");
        doc.remove_list();
        assert!(matches!(
            doc.replace_items(list, &models(), None),
            Err(Error::ElementMissing(id)) if id == list
        ));
    }

    #[test]
    fn test_parent_access_denied() {
        let mut doc = MemoryDocument::new().with_parent_denied();
        assert!(matches!(
            doc.observe(ObserveTarget::Document(Scope::Parent)),
            Err(Error::AccessDenied(Scope::Parent))
        ));
        assert!(doc.observe(ObserveTarget::Document(Scope::Own)).is_ok());
    }

    #[test]
    fn test_rerender_drops_companion() {
        let mut doc = MemoryDocument::new().with_list(models());
        let list = doc.locate_list().expect("list");
        let input = CompanionInput {
            dom_id: "search".to_string(),
            placeholder: "search models".to_string(),
            value: String::new(),
        };
        doc.insert_companion(list, &input).expect("insert");
        assert_eq!(doc.companion_count(), 1);
        let fresh = doc.host_rerender(models());
        assert_ne!(fresh, list);
        assert_eq!(doc.companion_count(), 0);
        assert!(!doc.contains(list));
    }
}
