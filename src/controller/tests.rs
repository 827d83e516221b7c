//! Scenario tests for the controller, driven through the in-memory host.

use super::*;
use crate::bootstrap::AttachState;
use crate::config::Config;
use crate::error::Error;
use crate::host::memory::MemoryDocument;
use crate::host::{ClearRequestedMsg, HostDocument, ListMutatedMsg, ObserveTarget, Scope};
use crate::item::Item;
use crate::storage::MemoryStore;
use crate::watcher::WatchState;
use bubbletea_rs::{Model as BubbleTeaModel, Msg};
use std::time::Duration;

type TestModel = Model<MemoryDocument, MemoryStore>;

fn models() -> Vec<Item> {
    vec![
        Item::labeled("gpt-4o"),
        Item::labeled("gpt-3.5-turbo"),
        Item::labeled("claude-3-opus"),
    ]
}

fn loading() -> Vec<Item> {
    vec![Item::new("", "Loading models...").with_disabled(true)]
}

fn started(doc: &MemoryDocument, store: MemoryStore) -> TestModel {
    let mut model = Model::new(Config::default(), Some(doc.clone()), store);
    let _ = model.start();
    pump(&mut model, doc);
    settle(&mut model, doc);
    model
}

/// Delivers queued host notifications until the document goes quiet.
fn pump(model: &mut TestModel, doc: &MemoryDocument) {
    loop {
        let msgs = doc.drain();
        if msgs.is_empty() {
            break;
        }
        for msg in msgs {
            let _ = model.update(msg);
        }
    }
}

fn deliver(model: &mut TestModel, due: Option<crate::debounce::DeadlineMsg>) -> bool {
    match due {
        Some(due) => {
            let _ = model.update(Box::new(due) as Msg);
            true
        }
        None => false,
    }
}

fn release(model: &mut TestModel) {
    let due = model.release_deadline();
    deliver(model, due);
}

/// Types `text`, lets the debounce elapse and everything settle.
fn search(model: &mut TestModel, doc: &MemoryDocument, text: &str) {
    doc.type_text(text);
    pump(model, doc);
    let due = model.input_deadline();
    assert!(deliver(model, due), "input debounce should be pending");
    pump(model, doc);
    settle(model, doc);
}

/// Lets pending list-change decisions settle, including the one caused by a
/// resync's own write. The grace period is shorter than the settle debounce,
/// so the self-write window closes first.
fn settle(model: &mut TestModel, doc: &MemoryDocument) -> bool {
    let mut fired = false;
    loop {
        release(model);
        let due = model.settle_deadline();
        if !deliver(model, due) {
            break;
        }
        fired = true;
        pump(model, doc);
    }
    release(model);
    fired
}

#[test]
fn test_attaches_on_start() {
    let doc = MemoryDocument::new().with_list(models());
    let model = started(&doc, MemoryStore::new());
    assert_eq!(model.state(), AttachState::Attached);
    assert_eq!(model.snapshot_len(), 3);
    assert_eq!(doc.companion_count(), 1);
    assert_eq!(doc.companion_placeholder().as_deref(), Some("search models"));
    assert_eq!(doc.engine_writes(), 0);
}

#[test]
fn test_typing_filters_case_insensitively() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());

    search(&mut model, &doc, "  GPT ");
    assert_eq!(doc.labels(), ["gpt-4o", "gpt-3.5-turbo"]);

    search(&mut model, &doc, "");
    assert_eq!(doc.labels(), ["gpt-4o", "gpt-3.5-turbo", "claude-3-opus"]);
}

#[test]
fn test_no_match_shows_sentinel() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());

    search(&mut model, &doc, "llama");
    let items = doc.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "No matching model found");
    assert!(items[0].disabled);
    assert_eq!(doc.selected(), None);

    // The sentinel never leaks into the snapshot.
    assert_eq!(model.snapshot_len(), 3);
    search(&mut model, &doc, "claude");
    assert_eq!(doc.labels(), ["claude-3-opus"]);
}

#[test]
fn test_only_the_last_keystroke_renders() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());

    doc.type_text("c");
    pump(&mut model, &doc);
    let stale = model.input_deadline();
    doc.type_text("cl");
    doc.type_text("gpt");
    pump(&mut model, &doc);

    deliver(&mut model, stale);
    assert_eq!(doc.engine_writes(), 0);

    let due = model.input_deadline();
    deliver(&mut model, due);
    assert_eq!(doc.engine_writes(), 1);
    assert_eq!(doc.labels(), ["gpt-4o", "gpt-3.5-turbo"]);
}

#[test]
fn test_query_is_persisted_on_every_edit() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());

    doc.type_text("tur");
    pump(&mut model, &doc);
    assert_eq!(model.input.persisted().load(), "tur");
    assert_eq!(model.query().raw(), "tur");
}

#[test]
fn test_engine_writes_do_not_trigger_resync() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());

    doc.type_text("gpt");
    pump(&mut model, &doc);
    let due = model.input_deadline();
    deliver(&mut model, due);
    assert!(model.is_self_writing());

    // The write's own notification is recorded like any other.
    pump(&mut model, &doc);
    let watcher = model.attachment().expect("attached").watcher();
    assert_eq!(watcher.state(), WatchState::ObservedChange);

    // Settling while the window is still open dismisses the batch.
    let due = model.settle_deadline();
    assert!(deliver(&mut model, due));
    let watcher = model.attachment().expect("attached").watcher();
    assert_eq!(watcher.ignored_self_writes(), 1);
    assert_eq!(watcher.resyncs(), 0);
    assert_eq!(watcher.state(), WatchState::Idle);
    assert_eq!(doc.engine_writes(), 1);
}

#[test]
fn test_late_self_write_notification_is_noise() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());

    doc.type_text("claude");
    pump(&mut model, &doc);
    let due = model.input_deadline();
    deliver(&mut model, due);
    // Window closes before the notification is delivered.
    release(&mut model);
    pump(&mut model, &doc);

    assert!(settle(&mut model, &doc));
    assert_eq!(doc.engine_writes(), 1);
    assert_eq!(model.snapshot_len(), 3);
    assert_eq!(doc.labels(), ["claude-3-opus"]);
    assert_eq!(model.attachment().expect("attached").watcher().resyncs(), 0);
}

#[test]
fn test_host_refresh_reapplies_query() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());
    search(&mut model, &doc, "gpt");

    let mut refreshed = models();
    refreshed.push(Item::labeled("gpt-4.1"));
    refreshed.push(Item::labeled("o1-mini"));
    doc.host_replace(refreshed);
    pump(&mut model, &doc);
    assert!(settle(&mut model, &doc));

    assert_eq!(model.snapshot_len(), 5);
    assert_eq!(doc.labels(), ["gpt-4o", "gpt-3.5-turbo", "gpt-4.1"]);
    let watcher = model.attachment().expect("attached").watcher();
    assert_eq!(watcher.resyncs(), 1);
    assert_eq!(watcher.state(), WatchState::Idle);
}

#[test]
fn test_host_refresh_without_query_leaves_list_alone() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());

    let mut refreshed = models();
    refreshed.push(Item::labeled("o1"));
    doc.host_replace(refreshed);
    pump(&mut model, &doc);
    assert!(settle(&mut model, &doc));

    assert_eq!(model.snapshot_len(), 4);
    assert_eq!(doc.engine_writes(), 0);
}

#[test]
fn test_shrinking_host_refresh_is_ignored() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());

    doc.host_replace(vec![Item::labeled("gpt-4o")]);
    pump(&mut model, &doc);
    assert!(settle(&mut model, &doc));
    assert_eq!(model.snapshot_len(), 3);
}

#[test]
fn test_persisted_query_waits_for_real_options() {
    let doc = MemoryDocument::new().with_list(loading());
    let store = MemoryStore::with_value(&Config::default().storage_key, "turbo");
    let mut model = started(&doc, store);

    assert_eq!(model.state(), AttachState::Attached);
    assert_eq!(doc.companion_value().as_deref(), Some("turbo"));
    assert_eq!(model.snapshot_len(), 0);
    assert_eq!(doc.engine_writes(), 0);
    assert_eq!(doc.labels(), ["Loading models..."]);

    doc.host_replace(models());
    pump(&mut model, &doc);
    assert!(settle(&mut model, &doc));

    assert_eq!(model.snapshot_len(), 3);
    assert_eq!(doc.labels(), ["gpt-3.5-turbo"]);
}

#[test]
fn test_typing_before_options_load_writes_nothing() {
    let doc = MemoryDocument::new().with_list(loading());
    let mut model = started(&doc, MemoryStore::new());

    doc.type_text("gpt");
    pump(&mut model, &doc);
    let due = model.input_deadline();
    deliver(&mut model, due);
    assert_eq!(doc.engine_writes(), 0);
    assert_eq!(doc.labels(), ["Loading models..."]);
}

#[test]
fn test_restored_query_applies_on_attach() {
    let doc = MemoryDocument::new().with_list(models());
    let store = MemoryStore::with_value(&Config::default().storage_key, "claude");
    let model = started(&doc, store);

    assert_eq!(model.query().raw(), "claude");
    assert_eq!(doc.labels(), ["claude-3-opus"]);
    assert_eq!(model.snapshot_len(), 3);
}

#[test]
fn test_selection_survives_when_still_visible() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());
    doc.choose("gpt-3.5-turbo");

    search(&mut model, &doc, "gpt");
    assert_eq!(doc.selected().as_deref(), Some("gpt-3.5-turbo"));

    search(&mut model, &doc, "claude");
    assert_eq!(doc.selected().as_deref(), Some("claude-3-opus"));
}

#[test]
fn test_attach_is_idempotent() {
    let doc = MemoryDocument::new().with_list(models()).with_clear_control();
    let mut model = started(&doc, MemoryStore::new());
    let subscriptions = doc.subscription_count();

    for _ in 0..3 {
        let (attached, cmd) = model.attach();
        assert!(attached);
        assert!(cmd.is_none());
    }
    assert_eq!(doc.companion_count(), 1);
    assert_eq!(doc.subscription_count(), subscriptions);
    assert_eq!(model.attachments(), 1);
}

#[test]
fn test_reattaches_after_host_rerender() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());
    search(&mut model, &doc, "gpt");
    let old = doc.list_id().expect("list");

    let fresh = doc.host_rerender(vec![
        Item::labeled("gpt-4o"),
        Item::labeled("claude-3-haiku"),
    ]);
    pump(&mut model, &doc);

    assert_eq!(model.state(), AttachState::Attached);
    assert_eq!(model.attachments(), 2);
    assert_eq!(model.attachment().map(|a| a.list()), Some(fresh));
    assert_eq!(doc.companion_count(), 1);
    assert_eq!(doc.companion_value().as_deref(), Some("gpt"));
    assert_eq!(doc.subscriptions_for(ObserveTarget::List(old)), 0);
    assert_eq!(doc.subscriptions_for(ObserveTarget::List(fresh)), 1);
    assert_eq!(model.snapshot_len(), 2);
    assert_eq!(doc.labels(), ["gpt-4o"]);
}

#[test]
fn test_companion_removal_restores_before_reattach() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());
    search(&mut model, &doc, "claude");

    doc.remove_companion();
    pump(&mut model, &doc);

    assert_eq!(model.attachments(), 2);
    assert_eq!(doc.companion_count(), 1);
    assert_eq!(model.snapshot_len(), 3);
    assert_eq!(doc.labels(), ["claude-3-opus"]);
}

#[test]
fn test_waits_for_list_to_appear() {
    let doc = MemoryDocument::new();
    let mut model = Model::new(Config::default(), Some(doc.clone()), MemoryStore::new());
    assert!(model.start().is_some());
    assert_eq!(model.state(), AttachState::Searching);

    let due = model.retry_deadline();
    assert!(deliver(&mut model, due));
    assert_eq!(model.state(), AttachState::Searching);
    assert!(model.retry_deadline().is_some());

    doc.insert_list(models());
    let due = model.retry_deadline();
    deliver(&mut model, due);
    assert_eq!(model.state(), AttachState::Attached);
    assert!(model.retry_deadline().is_none());
    assert_eq!(doc.companion_count(), 1);
}

#[test]
fn test_structural_change_attaches_after_retries_run_out() {
    let doc = MemoryDocument::new();
    let config = Config::default().with_retry(Duration::from_millis(500), Duration::from_secs(1));
    let mut model = Model::new(config, Some(doc.clone()), MemoryStore::new());
    let _ = model.start();

    while let Some(due) = model.retry_deadline() {
        let _ = model.update(Box::new(due) as Msg);
    }
    assert_eq!(model.target.attempts(), 2);
    assert_eq!(model.state(), AttachState::Searching);

    doc.insert_list(models());
    pump(&mut model, &doc);
    assert_eq!(model.state(), AttachState::Attached);
    assert_eq!(model.snapshot_len(), 3);
}

#[test]
fn test_clear_control_resets_query() {
    let doc = MemoryDocument::new().with_list(models()).with_clear_control();
    let mut model = started(&doc, MemoryStore::new());
    search(&mut model, &doc, "claude");

    doc.click_clear();
    pump(&mut model, &doc);

    assert!(model.query().is_empty());
    assert_eq!(model.input.persisted().load(), "");
    assert_eq!(doc.companion_value().as_deref(), Some(""));
    assert_eq!(doc.labels(), ["gpt-4o", "gpt-3.5-turbo", "claude-3-opus"]);
}

#[test]
fn test_clear_is_ignored_while_unattached() {
    let doc = MemoryDocument::new();
    let mut model = Model::new(Config::default(), Some(doc.clone()), MemoryStore::new());
    assert!(model.update(Box::new(ClearRequestedMsg) as Msg).is_none());
    assert_eq!(doc.engine_writes(), 0);
}

#[test]
fn test_denied_parent_is_tolerated() {
    let doc = MemoryDocument::new()
        .with_list(models())
        .with_parent_denied();
    let mut model = started(&doc, MemoryStore::new());
    assert_eq!(model.state(), AttachState::Attached);
    assert_eq!(doc.subscriptions_for(ObserveTarget::Document(Scope::Own)), 1);
    assert_eq!(doc.subscriptions_for(ObserveTarget::Document(Scope::Parent)), 0);

    search(&mut model, &doc, "opus");
    assert_eq!(doc.labels(), ["claude-3-opus"]);
}

#[test]
fn test_without_host_everything_is_a_no_op() {
    let mut model: TestModel = Model::new(Config::default(), None, MemoryStore::new());
    assert!(model.is_inert());
    assert!(model.start().is_none());
    let (attached, cmd) = model.attach();
    assert!(!attached);
    assert!(cmd.is_none());
    assert!(model.update(Box::new(ClearRequestedMsg) as Msg).is_none());
    assert_eq!(model.state(), AttachState::Unattached);
    assert!(model.view().contains("inactive"));
}

#[test]
fn test_failed_resolution_is_inert() {
    let model: TestModel =
        Model::resolve(Config::default(), MemoryStore::new(), || Err(Error::HostUnavailable));
    assert!(model.is_inert());
}

#[test]
fn test_view_marks_selection() {
    let doc = MemoryDocument::new().with_list(models());
    let model = started(&doc, MemoryStore::new());
    let view = model.view();
    assert!(view.starts_with("[search models]\n"));
    assert!(view.contains("> gpt-4o\n"));
    assert!(view.contains("  claude-3-opus\n"));
}

#[test]
fn test_init_searches_default_document() {
    let (model, cmd) = <TestModel as BubbleTeaModel>::init();
    assert!(cmd.is_some());
    assert_eq!(model.state(), AttachState::Searching);
    assert!(model.host().is_some_and(|doc| doc.locate_list().is_none()));
}

#[tokio::test]
async fn test_debounce_command_drives_render() {
    let doc = MemoryDocument::new().with_list(models());
    let config = Config::default().with_input_debounce(Duration::from_millis(10));
    let mut model = Model::new(config, Some(doc.clone()), MemoryStore::new());
    let _ = model.start();
    pump(&mut model, &doc);

    doc.type_text("opus");
    let msg = doc.drain().pop().expect("input event");
    let cmd = model.update(msg).expect("debounce scheduled");
    let due = cmd.await.expect("deadline message");
    assert!(model.update(due).is_some());
    assert_eq!(doc.labels(), ["claude-3-opus"]);
}

#[test]
fn test_repeated_renders_never_resync() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());
    for query in ["g", "gp", "gpt", "gpt-4", "claude"] {
        search(&mut model, &doc, query);
    }
    let watcher = model.attachment().expect("attached").watcher();
    assert_eq!(watcher.resyncs(), 0);
    assert_eq!(doc.engine_writes(), 5);
    assert_eq!(model.snapshot_len(), 3);
}

#[test]
fn test_selection_restored_after_clearing_query() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());
    doc.choose("claude-3-opus");

    search(&mut model, &doc, "claude");
    search(&mut model, &doc, "");
    assert_eq!(doc.items(), models());
    assert_eq!(doc.selected().as_deref(), Some("claude-3-opus"));
}

#[test]
fn test_placeholder_grows_into_full_list() {
    let doc = MemoryDocument::new().with_list(loading());
    let store = MemoryStore::with_value(&Config::default().storage_key, "model-1");
    let mut model = started(&doc, store);

    let full: Vec<Item> = (0..40).map(|i| Item::labeled(format!("model-{i}"))).collect();
    doc.host_replace(full);
    pump(&mut model, &doc);
    assert!(settle(&mut model, &doc));

    assert_eq!(model.snapshot_len(), 40);
    // model-1 and model-10 through model-19.
    assert_eq!(doc.items().len(), 11);
    assert_eq!(doc.labels()[0], "model-1");
}

#[test]
fn test_query_survives_restart() {
    use crate::storage::FileStore;

    let dir = std::env::temp_dir().join(format!(
        "choice-filter-restart-{}-{:?}",
        std::process::id(),
        std::thread::current().id()
    ));
    {
        let doc = MemoryDocument::new().with_list(models());
        let mut model = Model::new(Config::default(), Some(doc.clone()), FileStore::new(&dir));
        let _ = model.start();
        doc.type_text("opus");
        for msg in doc.drain() {
            let _ = model.update(msg);
        }
    }

    let doc = MemoryDocument::new().with_list(models());
    let mut model = Model::new(Config::default(), Some(doc.clone()), FileStore::new(&dir));
    let _ = model.start();
    assert_eq!(doc.companion_value().as_deref(), Some("opus"));
    assert_eq!(doc.labels(), ["claude-3-opus"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_host_refresh_inside_self_write_window_is_kept() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());

    doc.type_text("gpt");
    pump(&mut model, &doc);
    let due = model.input_deadline();
    deliver(&mut model, due);
    assert!(model.is_self_writing());

    let mut refreshed = models();
    refreshed.push(Item::labeled("gpt-4.1"));
    refreshed.push(Item::labeled("o1-mini"));
    doc.host_replace(refreshed);
    pump(&mut model, &doc);
    assert!(settle(&mut model, &doc));

    assert_eq!(model.snapshot_len(), 5);
    assert_eq!(doc.labels(), ["gpt-4o", "gpt-3.5-turbo", "gpt-4.1"]);
    assert!(model.settle_deadline().is_none());
    assert_eq!(model.attachment().expect("attached").watcher().resyncs(), 1);
}

#[test]
fn test_restore_on_detach_is_not_observed() {
    let doc = MemoryDocument::new().with_list(models());
    let mut model = started(&doc, MemoryStore::new());
    search(&mut model, &doc, "claude");

    doc.remove_companion();
    for msg in doc.drain() {
        let _ = model.update(msg);
    }
    assert_eq!(model.attachments(), 2);

    // Only the new attachment's own render reaches its list subscription.
    let list_changes = doc
        .drain()
        .iter()
        .filter(|msg| msg.downcast_ref::<ListMutatedMsg>().is_some())
        .count();
    assert_eq!(list_changes, 1);
}

#[test]
fn test_stop_tears_everything_down() {
    let doc = MemoryDocument::new().with_list(models()).with_clear_control();
    let mut model = started(&doc, MemoryStore::new());
    search(&mut model, &doc, "claude");

    model.stop();
    assert_eq!(model.state(), AttachState::Unattached);
    assert!(model.attachment().is_none());
    assert!(model.retry_deadline().is_none());
    assert_eq!(doc.subscription_count(), 0);
    assert_eq!(doc.companion_count(), 0);
    assert_eq!(doc.labels(), ["gpt-4o", "gpt-3.5-turbo", "claude-3-opus"]);

    doc.host_rerender(models());
    pump(&mut model, &doc);
    assert_eq!(model.state(), AttachState::Unattached);
    assert_eq!(doc.companion_count(), 0);

    let _ = model.start();
    pump(&mut model, &doc);
    assert_eq!(model.state(), AttachState::Attached);
    assert_eq!(doc.companion_value().as_deref(), Some("claude"));
    assert_eq!(doc.labels(), ["claude-3-opus"]);
}
