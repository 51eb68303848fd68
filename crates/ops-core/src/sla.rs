//! SLA thresholds.

use serde::{Deserialize, Serialize};

/// Default hours a destination may sit in `queued` before it is stale.
pub const DEFAULT_QUEUED_MAX_HOURS: u32 = 4;

/// Default hours a sent destination may go without an offer.
pub const DEFAULT_SENT_NO_REPLY_MAX_HOURS: u32 = 48;

/// Tunable staleness thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaConfig {
    /// Hours a destination may stay queued.
    pub queued_max_hours: u32,
    /// Hours a sent/submitted/viewed destination may wait for an offer.
    pub sent_no_reply_max_hours: u32,
    /// Whether an `error` destination always needs action.
    pub error_always_needs_action: bool,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            queued_max_hours: DEFAULT_QUEUED_MAX_HOURS,
            sent_no_reply_max_hours: DEFAULT_SENT_NO_REPLY_MAX_HOURS,
            error_always_needs_action: true,
        }
    }
}

/// An [`SlaConfig`] together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedSlaConfig {
    #[serde(flatten)]
    pub config: SlaConfig,
    /// `true` when the settings store was missing, empty or unreadable.
    pub using_fallback: bool,
}

impl LoadedSlaConfig {
    /// The hard-coded defaults, flagged as a fallback.
    pub fn fallback() -> Self {
        Self {
            config: SlaConfig::default(),
            using_fallback: true,
        }
    }

    /// A configuration read from the settings store.
    pub fn stored(config: SlaConfig) -> Self {
        Self {
            config,
            using_fallback: false,
        }
    }
}
