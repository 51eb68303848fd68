//! Typed payloads for the append-only ops event log.
//!
//! Rows in the log carry an `event_type` string and a JSON object payload.
//! Each known event type has exactly one payload shape; payloads are
//! validated when an event is written and again when it is read back.
//! Readers only look at the fields named here, so extra fields written by
//! newer code are ignored. Event types this build does not know about are
//! carried through as [`OpsEventKind::Other`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A customer asked to be introduced to a provider.
pub const CUSTOMER_INTRO_REQUESTED: &str = "customer_intro_requested";
/// Staff handled a customer intro request.
pub const CUSTOMER_INTRO_HANDLED: &str = "customer_intro_handled";
/// Marker written after a change-request notification went out.
pub const CHANGE_REQUEST_NOTIFIED: &str = "change_request_notified";
/// The customer was shown a price estimate.
pub const ESTIMATE_SHOWN: &str = "estimate_shown";

const KNOWN_EVENT_TYPES: &[&str] = &[
    CUSTOMER_INTRO_REQUESTED,
    CUSTOMER_INTRO_HANDLED,
    CHANGE_REQUEST_NOTIFIED,
    ESTIMATE_SHOWN,
];

/// Errors raised while validating an event payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Payload is not valid JSON for its event type.
    #[error("invalid {event_type} payload: {source}")]
    Malformed {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// Payload is valid JSON but not an object.
    #[error("{event_type} payload must be a JSON object")]
    NotAnObject { event_type: String },

    /// A known event type was given an untyped payload.
    #[error("{event_type} must be written with its typed payload")]
    ReservedType { event_type: String },

    /// A required identifier is empty.
    #[error("{event_type} payload has an empty {field}")]
    EmptyField {
        event_type: String,
        field: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ProviderPayload {
    provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChangeRequestPayload {
    change_request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct EstimateShownPayload {
    session_key: String,
}

/// The body of an ops event, keyed by its `event_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum OpsEventKind {
    CustomerIntroRequested {
        provider_id: String,
        note: Option<String>,
    },
    CustomerIntroHandled {
        provider_id: String,
    },
    ChangeRequestNotified {
        change_request_id: String,
    },
    EstimateShown {
        session_key: String,
    },
    /// An event type this build does not interpret.
    Other { event_type: String, payload: Value },
}

impl OpsEventKind {
    /// The `event_type` column value for this event.
    pub fn event_type(&self) -> &str {
        match self {
            Self::CustomerIntroRequested { .. } => CUSTOMER_INTRO_REQUESTED,
            Self::CustomerIntroHandled { .. } => CUSTOMER_INTRO_HANDLED,
            Self::ChangeRequestNotified { .. } => CHANGE_REQUEST_NOTIFIED,
            Self::EstimateShown { .. } => ESTIMATE_SHOWN,
            Self::Other { event_type, .. } => event_type,
        }
    }

    /// Validate and serialize the payload column.
    pub fn to_payload(&self) -> Result<String, PayloadError> {
        self.validate()?;
        let encoded = match self {
            Self::CustomerIntroRequested { provider_id, note } => {
                serde_json::to_string(&ProviderPayload {
                    provider_id: provider_id.clone(),
                    note: note.clone(),
                })
            }
            Self::CustomerIntroHandled { provider_id } => serde_json::to_string(&ProviderPayload {
                provider_id: provider_id.clone(),
                note: None,
            }),
            Self::ChangeRequestNotified { change_request_id } => {
                serde_json::to_string(&ChangeRequestPayload {
                    change_request_id: change_request_id.clone(),
                })
            }
            Self::EstimateShown { session_key } => serde_json::to_string(&EstimateShownPayload {
                session_key: session_key.clone(),
            }),
            Self::Other { payload, .. } => serde_json::to_string(payload),
        };
        encoded.map_err(|source| PayloadError::Malformed {
            event_type: self.event_type().to_string(),
            source,
        })
    }

    /// Parse and validate a stored `(event_type, payload)` pair.
    pub fn from_parts(event_type: &str, payload: &str) -> Result<Self, PayloadError> {
        let kind = match event_type {
            CUSTOMER_INTRO_REQUESTED => {
                let p: ProviderPayload = parse(event_type, payload)?;
                Self::CustomerIntroRequested {
                    provider_id: p.provider_id,
                    note: p.note,
                }
            }
            CUSTOMER_INTRO_HANDLED => {
                let p: ProviderPayload = parse(event_type, payload)?;
                Self::CustomerIntroHandled {
                    provider_id: p.provider_id,
                }
            }
            CHANGE_REQUEST_NOTIFIED => {
                let p: ChangeRequestPayload = parse(event_type, payload)?;
                Self::ChangeRequestNotified {
                    change_request_id: p.change_request_id,
                }
            }
            ESTIMATE_SHOWN => {
                let p: EstimateShownPayload = parse(event_type, payload)?;
                Self::EstimateShown {
                    session_key: p.session_key,
                }
            }
            other => Self::Other {
                event_type: other.to_string(),
                payload: parse(event_type, payload)?,
            },
        };
        kind.validate()?;
        Ok(kind)
    }

    fn validate(&self) -> Result<(), PayloadError> {
        let (field, value) = match self {
            Self::CustomerIntroRequested { provider_id, .. }
            | Self::CustomerIntroHandled { provider_id } => ("provider_id", provider_id),
            Self::ChangeRequestNotified { change_request_id } => {
                ("change_request_id", change_request_id)
            }
            Self::EstimateShown { session_key } => ("session_key", session_key),
            Self::Other {
                event_type,
                payload,
            } => {
                if KNOWN_EVENT_TYPES.contains(&event_type.as_str()) {
                    return Err(PayloadError::ReservedType {
                        event_type: event_type.clone(),
                    });
                }
                if !payload.is_object() {
                    return Err(PayloadError::NotAnObject {
                        event_type: event_type.clone(),
                    });
                }
                return Ok(());
            }
        };

        if value.trim().is_empty() {
            return Err(PayloadError::EmptyField {
                event_type: self.event_type().to_string(),
                field,
            });
        }
        Ok(())
    }
}

fn parse<T: for<'de> Deserialize<'de>>(event_type: &str, payload: &str) -> Result<T, PayloadError> {
    serde_json::from_str(payload).map_err(|source| PayloadError::Malformed {
        event_type: event_type.to_string(),
        source,
    })
}

/// One decoded row of the ops event log.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEvent {
    pub id: i64,
    pub quote_id: Option<String>,
    pub destination_id: Option<String>,
    pub kind: OpsEventKind,
    pub created_at: DateTime<Utc>,
}
