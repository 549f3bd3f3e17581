//! Runtime configuration.
//!
//! Every field has a default matching the live site, so an empty JSON object
//! is a valid configuration.

use crate::errors::PageError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for a [`PageRuntime`](crate::runtime::PageRuntime).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Clock widget settings.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Search suggestion settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Notification banner settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Reading progress bar settings.
    #[serde(default)]
    pub progress: ProgressConfig,
    /// Form submission settings.
    #[serde(default)]
    pub forms: FormConfig,
    /// Share window settings.
    #[serde(default)]
    pub share: ShareConfig,
    /// User-facing messages.
    #[serde(default)]
    pub messages: Messages,
}

impl PageConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, PageError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PageError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks values that would make the runtime misbehave.
    pub fn validate(&self) -> Result<(), PageError> {
        if self.clock.tick_ms == 0 {
            return Err(PageError::config("clock.tick_ms must be positive"));
        }
        if self.clock.utc_offset_minutes.abs() > 18 * 60 {
            return Err(PageError::config(format!(
                "clock.utc_offset_minutes out of range: {}",
                self.clock.utc_offset_minutes
            )));
        }
        if self.notifications.ttl_ms == 0 {
            return Err(PageError::config("notifications.ttl_ms must be positive"));
        }
        if self.search.min_query_chars == 0 {
            return Err(PageError::config("search.min_query_chars must be positive"));
        }
        Ok(())
    }
}

/// Clock widget settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Id of the element receiving the time.
    #[serde(default = "default_clock_element")]
    pub element_id: String,
    /// Offset of the displayed zone from UTC.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    /// Refresh period.
    #[serde(default = "default_tick")]
    pub tick_ms: u64,
}

fn default_clock_element() -> String {
    "tashkent-time".to_string()
}

fn default_utc_offset() -> i32 {
    5 * 60
}

fn default_tick() -> u64 {
    1000
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            element_id: default_clock_element(),
            utc_offset_minutes: default_utc_offset(),
            tick_ms: default_tick(),
        }
    }
}

impl ClockConfig {
    /// Tick period as a Duration.
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Search suggestion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before suggestions are fetched.
    #[serde(default = "default_search_debounce")]
    pub debounce_ms: u64,
    /// Shortest trimmed query, in characters, that fetches suggestions.
    #[serde(default = "default_min_query")]
    pub min_query_chars: usize,
}

fn default_search_debounce() -> u64 {
    300
}

fn default_min_query() -> usize {
    2
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_search_debounce(),
            min_query_chars: default_min_query(),
        }
    }
}

impl SearchConfig {
    /// Debounce window as a Duration.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Notification banner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a banner stays before it is removed automatically.
    #[serde(default = "default_ttl")]
    pub ttl_ms: u64,
}

fn default_ttl() -> u64 {
    3000
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { ttl_ms: default_ttl() }
    }
}

impl NotificationConfig {
    /// Banner lifetime as a Duration.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Reading progress bar settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Debounce window for scroll events.
    #[serde(default = "default_progress_debounce")]
    pub debounce_ms: u64,
}

fn default_progress_debounce() -> u64 {
    10
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_progress_debounce(),
        }
    }
}

impl ProgressConfig {
    /// Debounce window as a Duration.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Form submission settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Delay before a submit control is re-enabled.
    #[serde(default = "default_restore")]
    pub restore_after_ms: u64,
    /// Label shown while submitting.
    #[serde(default = "default_loading_label")]
    pub loading_label: String,
}

fn default_restore() -> u64 {
    5000
}

fn default_loading_label() -> String {
    "Yuklanmoqda...".to_string()
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            restore_after_ms: default_restore(),
            loading_label: default_loading_label(),
        }
    }
}

impl FormConfig {
    /// Restore delay as a Duration.
    #[must_use]
    pub fn restore_after(&self) -> Duration {
        Duration::from_millis(self.restore_after_ms)
    }
}

/// Share window settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Popup width in pixels.
    #[serde(default = "default_popup_width")]
    pub popup_width: u32,
    /// Popup height in pixels.
    #[serde(default = "default_popup_height")]
    pub popup_height: u32,
}

fn default_popup_width() -> u32 {
    600
}

fn default_popup_height() -> u32 {
    400
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            popup_width: default_popup_width(),
            popup_height: default_popup_height(),
        }
    }
}

impl ShareConfig {
    /// The `window.open` feature string.
    #[must_use]
    pub fn window_features(&self) -> String {
        format!("width={},height={}", self.popup_width, self.popup_height)
    }
}

/// User-facing messages (Uzbek by default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    /// Shown after a successful copy.
    #[serde(default = "default_copy_success")]
    pub copy_success: String,
    /// Shown when copying failed.
    #[serde(default = "default_copy_failure")]
    pub copy_failure: String,
}

fn default_copy_success() -> String {
    "Matn nusxa olindi!".to_string()
}

fn default_copy_failure() -> String {
    "Nusxa olishda xatolik!".to_string()
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            copy_success: default_copy_success(),
            copy_failure: default_copy_failure(),
        }
    }
}
