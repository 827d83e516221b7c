//! Plain-text rendering of the controller, for terminals and logs.

use super::model::Model;
use crate::bootstrap::AttachState;
use crate::host::HostDocument;
use crate::storage::QueryStore;
use std::fmt::Write;

impl<D: HostDocument, S: QueryStore> Model<D, S> {
    /// Renders the search input followed by the entries the live list
    /// currently shows. The selected entry is marked with `>`, disabled
    /// entries are wrapped in parentheses.
    pub fn view(&self) -> String {
        let mut out = String::new();
        let query = self.input.query();
        if query.raw().is_empty() {
            let _ = writeln!(out, "[{}]", self.config.placeholder);
        } else {
            let _ = writeln!(out, "/ {}", query.raw());
        }

        let (Some(host), Some(attachment)) = (self.host.as_ref(), self.bootstrap.attachment())
        else {
            let status = match self.state() {
                AttachState::Unattached => "inactive",
                AttachState::Searching | AttachState::Attached => "waiting for list...",
            };
            out.push_str(status);
            return out;
        };

        let list = attachment.list();
        let selected = host.selected_value(list);
        for item in host.read_items(list) {
            let marker = if !item.value.is_empty() && selected.as_deref() == Some(item.value.as_str())
            {
                ">"
            } else {
                " "
            };
            if item.disabled {
                let _ = writeln!(out, "{marker} ({item})");
            } else {
                let _ = writeln!(out, "{marker} {item}");
            }
        }
        out
    }
}
