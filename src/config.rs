//! Tunables for a filter attachment.
//!
//! Every field has a working default; embedders override the few they care
//! about with the consuming `with_*` builders.
//!
//! ```
//! use choice_filter::Config;
//! use std::time::Duration;
//!
//! let config = Config::default()
//!     .with_storage_key("my_model_search")
//!     .with_input_debounce(Duration::from_millis(200));
//! assert_eq!(config.storage_key, "my_model_search");
//! ```

use once_cell::sync::Lazy;
use std::time::Duration;

/// Labels hosts show while a list is loading or empty. Matched
/// case-insensitively as substrings of a lone entry's text.
pub static DEFAULT_PLACEHOLDER_MARKERS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "loading",
        "not loaded",
        "no models",
        "no model",
        "no results",
        "no match",
        "please load",
        "fetch models",
        "加载",
        "未找到",
        "暂无",
        "请先",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
});

const DEFAULT_STORAGE_KEY: &str = "choice_filter_query";
const DEFAULT_INPUT_ID: &str = "choice-filter-search";
const DEFAULT_PLACEHOLDER: &str = "search models";
const DEFAULT_NO_MATCH_TEXT: &str = "No matching model found";

/// Configuration shared by every component of one filter model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Key under which the raw query is persisted.
    pub storage_key: String,
    /// Element id of the companion search input. Used to find an input left
    /// behind by an earlier attachment instead of inserting a second one.
    pub input_id: String,
    /// Placeholder shown in the empty search input.
    pub placeholder: String,
    /// Label of the disabled sentinel entry rendered when nothing matches.
    pub no_match_text: String,
    /// Lone-entry labels treated as "not loaded yet" by the snapshot store.
    pub placeholder_markers: Vec<String>,
    /// Quiet period after the last keystroke before the view is re-rendered.
    pub input_debounce: Duration,
    /// Quiet period after the last list mutation before the watcher decides.
    pub watch_debounce: Duration,
    /// How long the self-write window stays open after an engine write.
    pub self_write_grace: Duration,
    /// Interval of the bounded discovery retry.
    pub retry_interval: Duration,
    /// Total span covered by the bounded discovery retry.
    pub retry_horizon: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            input_id: DEFAULT_INPUT_ID.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            no_match_text: DEFAULT_NO_MATCH_TEXT.to_string(),
            placeholder_markers: DEFAULT_PLACEHOLDER_MARKERS.clone(),
            input_debounce: Duration::from_millis(150),
            watch_debounce: Duration::from_millis(300),
            self_write_grace: Duration::from_millis(100),
            retry_interval: Duration::from_millis(500),
            retry_horizon: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Sets the persisted-query key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets the companion input's element id.
    pub fn with_input_id(mut self, id: impl Into<String>) -> Self {
        self.input_id = id.into();
        self
    }

    /// Sets the search input placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the localized "no match" sentinel label.
    pub fn with_no_match_text(mut self, text: impl Into<String>) -> Self {
        self.no_match_text = text.into();
        self
    }

    /// Replaces the placeholder markers.
    pub fn with_placeholder_markers<I, T>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.placeholder_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the keystroke debounce.
    pub fn with_input_debounce(mut self, delay: Duration) -> Self {
        self.input_debounce = delay;
        self
    }

    /// Sets the list-mutation debounce.
    pub fn with_watch_debounce(mut self, delay: Duration) -> Self {
        self.watch_debounce = delay;
        self
    }

    /// Sets the self-write grace period.
    pub fn with_self_write_grace(mut self, grace: Duration) -> Self {
        self.self_write_grace = grace;
        self
    }

    /// Sets the bounded retry schedule.
    pub fn with_retry(mut self, interval: Duration, horizon: Duration) -> Self {
        self.retry_interval = interval;
        self.retry_horizon = horizon;
        self
    }

    /// Number of bounded retry attempts implied by the interval and horizon.
    pub fn retry_attempts(&self) -> u32 {
        if self.retry_interval.is_zero() {
            return 0;
        }
        (self.retry_horizon.as_nanos() / self.retry_interval.as_nanos()).min(u32::MAX as u128)
            as u32
    }

    /// Lower-cased markers, including the sentinel label so the engine never
    /// mistakes its own "no match" render for host content.
    pub fn capture_markers(&self) -> Vec<String> {
        let mut markers: Vec<String> = self
            .placeholder_markers
            .iter()
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        let sentinel = self.no_match_text.trim().to_lowercase();
        if !sentinel.is_empty() && !markers.contains(&sentinel) {
            markers.push(sentinel);
        }
        markers
    }
}
