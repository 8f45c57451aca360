//! Error types for the calbridge ecosystem.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures surfaced by a calendar provider adapter.
///
/// Adapters never retry; whether to try again is the caller's decision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport failure, timeout, server-side error or an unreadable response.
    /// Transient: the client may safely resend the command.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The provider understood the request and declined it (expired credential,
    /// unknown event id, invalid payload...).
    #[error("Provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ProviderError {
    pub fn timed_out(limit: Duration) -> Self {
        ProviderError::Unavailable(format!("request timed out after {limit:?}"))
    }
}

/// Result type alias for provider adapter calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors produced while handling a session command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Unknown command type: {0}")]
    UnknownCommand(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Webhook registration failed: {0}")]
    WebhookRegistrationFailed(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Wire-level classification of a failure, sent to clients alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ProviderUnavailable,
    ProviderRejected,
    Unauthenticated,
    UnknownCommand,
    InvalidCommand,
    WebhookRegistrationFailed,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Unauthenticated => ErrorKind::Unauthenticated,
            BridgeError::UnknownCommand(_) => ErrorKind::UnknownCommand,
            BridgeError::InvalidCommand(_) => ErrorKind::InvalidCommand,
            BridgeError::WebhookRegistrationFailed(_) => ErrorKind::WebhookRegistrationFailed,
            BridgeError::Provider(ProviderError::Unavailable(_)) => ErrorKind::ProviderUnavailable,
            BridgeError::Provider(ProviderError::Rejected { .. }) => ErrorKind::ProviderRejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_provider_failure() {
        let rejected = BridgeError::from(ProviderError::Rejected {
            status: 401,
            message: "Invalid Credentials".into(),
        });
        assert_eq!(rejected.kind(), ErrorKind::ProviderRejected);
        assert_eq!(
            rejected.to_string(),
            "Provider rejected the request (401): Invalid Credentials"
        );

        let timeout = BridgeError::from(ProviderError::timed_out(Duration::from_secs(10)));
        assert_eq!(timeout.kind(), ErrorKind::ProviderUnavailable);
        assert_eq!(
            timeout.to_string(),
            "Provider unavailable: request timed out after 10s"
        );

        let short = ProviderError::timed_out(Duration::from_millis(20));
        assert_eq!(
            short.to_string(),
            "Provider unavailable: request timed out after 20ms"
        );
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(
            serde_json::to_value(ErrorKind::ProviderUnavailable).unwrap(),
            "provider_unavailable"
        );
        assert_eq!(
            serde_json::to_value(BridgeError::Unauthenticated.kind()).unwrap(),
            "unauthenticated"
        );
    }
}
