//! Error types for ops inbox collaborators.

use thiserror::Error;

/// Errors reported by a notification transport.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The transport refused or failed to deliver.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Nothing to send to (e.g., the quote has no contact address).
    #[error("no recipient: {0}")]
    NoRecipient(String),
}
