//! The seam between the bridge and an external calendar service.
//!
//! Implementations are plain request/response adapters: they keep no
//! state, cache nothing and never retry. The credential is owned by the
//! caller and passed into every call.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderResult;
use crate::event::{CalendarEvent, EventDraft};
use crate::window::SyncWindow;

/// How long a change-notification channel stays registered. Channels are
/// not renewed; a new one is registered on the next authentication.
pub const WEBHOOK_TTL_DAYS: i64 = 7;

/// OAuth access token for the provider. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Parameters for a new change-notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRequest {
    pub id: String,
    pub address: String,
    pub expiration: DateTime<Utc>,
}

impl ChannelRequest {
    /// A fresh channel id expiring `WEBHOOK_TTL_DAYS` after `now`.
    pub fn new(address: &str, now: DateTime<Utc>) -> Self {
        ChannelRequest {
            id: uuid::Uuid::new_v4().to_string(),
            address: address.to_string(),
            expiration: now + Duration::days(WEBHOOK_TTL_DAYS),
        }
    }
}

/// A registered change-notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookChannel {
    pub id: String,
    /// Provider-side id of the watched resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub address: String,
    pub expiration: DateTime<Utc>,
}

impl WebhookChannel {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }
}

/// A calendar provider, always operating on the credential owner's primary calendar.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Check that the provider accepts this credential.
    async fn verify(&self, token: &AccessToken) -> ProviderResult<()>;

    /// List events in the window, ordered by start time.
    async fn list_events(
        &self,
        token: &AccessToken,
        window: &SyncWindow,
    ) -> ProviderResult<Vec<CalendarEvent>>;

    async fn create_event(
        &self,
        token: &AccessToken,
        draft: &EventDraft,
    ) -> ProviderResult<CalendarEvent>;

    async fn update_event(
        &self,
        token: &AccessToken,
        event_id: &str,
        draft: &EventDraft,
    ) -> ProviderResult<CalendarEvent>;

    async fn delete_event(&self, token: &AccessToken, event_id: &str) -> ProviderResult<()>;

    async fn register_webhook(
        &self,
        token: &AccessToken,
        request: &ChannelRequest,
    ) -> ProviderResult<WebhookChannel>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("ya29.secret");
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
        assert_eq!(token.secret(), "ya29.secret");
        assert!(AccessToken::new("  ").is_empty());
    }

    #[test]
    fn test_channel_request_expires_in_seven_days() {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        let a = ChannelRequest::new("https://example.com/webhook/google-calendar", now);
        let b = ChannelRequest::new("https://example.com/webhook/google-calendar", now);

        assert_eq!(a.expiration, Utc.with_ymd_and_hms(2025, 1, 17, 9, 0, 0).unwrap());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_channel_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        let channel = WebhookChannel {
            id: "c1".into(),
            resource_id: None,
            address: "https://example.com/hook".into(),
            expiration: now,
        };
        assert!(channel.is_expired(now));
        assert!(!channel.is_expired(now - Duration::seconds(1)));
    }
}
