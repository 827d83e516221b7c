//! Choice list entries as the filter engine understands them.

use std::fmt::Display;

/// One entry of a host-owned choice list.
///
/// Only [`Item::match_text`] takes part in matching; `selected` and `disabled`
/// are carried through unchanged so that an unfiltered render reproduces the
/// host's list exactly.
///
/// # Examples
///
/// ```
/// use choice_filter::Item;
///
/// let item = Item::new("gpt-4o", "GPT-4o");
/// assert_eq!(item.match_text(), "GPT-4o");
///
/// let bare = Item::new("claude-3-opus", "");
/// assert_eq!(bare.match_text(), "claude-3-opus");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Item {
    /// Submitted value of the entry.
    pub value: String,
    /// Visible label.
    pub text: String,
    /// Whether the host marked this entry as selected.
    pub selected: bool,
    /// Whether the entry can be chosen.
    pub disabled: bool,
}

impl Item {
    /// Creates an enabled, unselected entry.
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            selected: false,
            disabled: false,
        }
    }

    /// Creates an entry whose value and label are the same string.
    pub fn labeled(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), text)
    }

    /// Marks the entry as selected.
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Marks the entry as disabled.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Text a query is matched against: the label, or the value when the
    /// label is empty.
    pub fn match_text(&self) -> &str {
        if self.text.is_empty() {
            &self.value
        } else {
            &self.text
        }
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.match_text())
    }
}
