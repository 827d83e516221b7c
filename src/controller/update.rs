//! Message routing for the controller.

use super::model::Model;
use crate::availability::Trigger;
use crate::bootstrap::AttachState;
use crate::config::Config;
use crate::host::{ClearRequestedMsg, ElementId, HostDocument, InputMsg, ListMutatedMsg};
use crate::storage::QueryStore;
use crate::watcher::Verdict;
use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
use tracing::{debug, info};

impl<D: HostDocument, S: QueryStore> Model<D, S> {
    /// Handles one message and returns the follow-up command, if any.
    ///
    /// Deadlines are checked before host notifications, and the self-write
    /// release comes first of all so a change observed in the same turn sees
    /// the window already closed.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if self.host.is_none() {
            return None;
        }
        if self.self_write.update(&msg) {
            return None;
        }
        if let Some(trigger) = self.target.on_msg(&msg) {
            return self.on_trigger(trigger);
        }
        if let Some(mutated) = msg.downcast_ref::<ListMutatedMsg>() {
            return self.on_list_mutated(mutated.list);
        }
        if self
            .bootstrap
            .attachment_mut()
            .is_some_and(|a| a.watcher.fire(&msg))
        {
            return self.on_settled();
        }
        if let Some(input) = msg.downcast_ref::<InputMsg>() {
            return self.on_input(input);
        }
        if self.input.fire(&msg).is_some() {
            return self.render();
        }
        if msg.downcast_ref::<ClearRequestedMsg>().is_some() {
            if self.state() != AttachState::Attached {
                return None;
            }
            return self.clear();
        }
        None
    }

    fn on_trigger(&mut self, trigger: Trigger) -> Option<Cmd> {
        if self.state() == AttachState::Unattached {
            return None;
        }
        let host = self.host.as_ref()?;
        if self.bootstrap.is_intact(host) {
            return None;
        }
        if self.state() == AttachState::Attached {
            info!(?trigger, "choice list went away, searching again");
            self.detach();
            let (attached, cmd) = self.attach();
            return if attached { cmd } else { self.target.begin() };
        }

        let (attached, cmd) = self.attach();
        if attached {
            return cmd;
        }
        match trigger {
            Trigger::Retry { attempt } => {
                debug!(attempt, "choice list still missing");
                self.target.reschedule()
            }
            Trigger::Structural(_) => None,
        }
    }

    fn on_list_mutated(&mut self, list: ElementId) -> Option<Cmd> {
        let attachment = self.bootstrap.attachment_mut()?;
        if attachment.list() != list {
            return None;
        }
        Some(attachment.watcher.observe())
    }

    fn on_settled(&mut self) -> Option<Cmd> {
        let writing = self.self_write.is_active();
        let host = self.host.as_ref()?;
        let attachment = self.bootstrap.attachment_mut()?;
        let live = host.read_items(attachment.list());
        let known = attachment.snapshot.len();
        let verdict = attachment.watcher.decide(writing, live.len(), known);
        let Verdict::Grew { observed, known } = verdict else {
            return None;
        };

        info!(observed, known, "host refreshed the list, resynchronizing");
        let committed = attachment.snapshot.capture(&live, true);
        let cmd = if committed && !self.input.query().is_empty() {
            self.render()
        } else {
            None
        };
        if let Some(attachment) = self.bootstrap.attachment_mut() {
            attachment.watcher.finish_resync();
        }
        cmd
    }

    fn on_input(&mut self, msg: &InputMsg) -> Option<Cmd> {
        let attachment = self.bootstrap.attachment()?;
        if attachment.companion() != msg.input {
            return None;
        }
        Some(self.input.on_input(&msg.value))
    }
}

impl<D, S> BubbleTeaModel for Model<D, S>
where
    D: HostDocument + Default + 'static,
    S: QueryStore + Default + 'static,
{
    fn init() -> (Self, Option<Cmd>) {
        let mut model = Model::new(Config::default(), Some(D::default()), S::default());
        let cmd = model.start();
        (model, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}
