//! Destination lifecycle statuses and the needs-action reason taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of one provider's copy of a quote.
///
/// The evaluator treats a status as a snapshot, never as a transition log.
/// Statuses this build does not know about are kept, trimmed and lowercased,
/// in [`DestinationStatus::Unknown`] so newer writers never break older readers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DestinationStatus {
    /// Waiting to be dispatched.
    Queued,
    /// Dispatched to the provider.
    Sent,
    /// Submitted through the provider's own portal.
    Submitted,
    /// Opened by the provider.
    Viewed,
    /// The provider answered with a price.
    Quoted,
    /// The provider declined.
    Declined,
    /// Dispatch failed.
    Error,
    /// A status introduced after this build.
    Unknown(String),
}

impl DestinationStatus {
    /// Parse a stored status string. Matching is case-insensitive.
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "queued" => Self::Queued,
            "sent" => Self::Sent,
            "submitted" => Self::Submitted,
            "viewed" => Self::Viewed,
            "quoted" => Self::Quoted,
            "declined" => Self::Declined,
            "error" => Self::Error,
            _ => Self::Unknown(normalized),
        }
    }

    /// The stored string for this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Submitted => "submitted",
            Self::Viewed => "viewed",
            Self::Quoted => "quoted",
            Self::Declined => "declined",
            Self::Error => "error",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether the provider has been contacted and a reply is expected.
    pub fn awaits_reply(&self) -> bool {
        matches!(self, Self::Sent | Self::Submitted | Self::Viewed)
    }

    /// Whether the provider has closed the loop on this destination.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Quoted | Self::Declined)
    }
}

impl fmt::Display for DestinationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DestinationStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for DestinationStatus {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<DestinationStatus> for String {
    fn from(status: DestinationStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Why a destination needs staff attention.
///
/// The serialized names are a stable, additive contract with API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedsActionReason {
    /// Still queued past the queued threshold.
    QueuedStale,
    /// Sent but no offer came back within the reply threshold.
    NoReply,
    /// Dispatch failed.
    Error,
}

impl NeedsActionReason {
    /// The stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueuedStale => "queued_stale",
            Self::NoReply => "no_reply",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for NeedsActionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
