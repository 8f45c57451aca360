//! The process-wide bridge state.
//!
//! One `Bridge` is built at startup and shared (as [`AppState`]) with every
//! connection and the webhook route. It owns the provider adapter, the
//! single credential all sessions act under, the current webhook channel
//! and the session registry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use calbridge_core::{
    AccessToken, BridgeError, BridgeResult, BroadcastMessage, CalendarEvent, CalendarProvider,
    ChannelRequest, EventDraft, ProviderError, ProviderResult, SyncWindow, WebhookChannel,
};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{RwLock, mpsc};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::registry::SessionRegistry;
use crate::session::Session;

/// Shared application state
pub type AppState = Arc<Bridge>;

/// Knobs the bridge takes from configuration.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Public URL the provider should call on changes; `None` skips registration
    pub webhook_address: Option<String>,
    /// Zone applied to drafts whose date-times carry no offset or zone
    pub time_zone: String,
    /// Upper bound on every provider call
    pub provider_timeout: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        BridgeSettings {
            webhook_address: None,
            time_zone: "UTC".to_string(),
            provider_timeout: Duration::from_secs(10),
        }
    }
}

/// Snapshot served by `GET /status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStatus {
    pub sessions: usize,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_channel: Option<WebhookChannel>,
}

pub struct Bridge {
    provider: Arc<dyn CalendarProvider>,
    registry: SessionRegistry,
    // Single-tenant: the most recent successful `auth` wins for every session.
    credential: RwLock<Option<AccessToken>>,
    channel: RwLock<Option<WebhookChannel>>,
    settings: BridgeSettings,
}

impl Bridge {
    pub fn new(provider: Arc<dyn CalendarProvider>, settings: BridgeSettings) -> Self {
        Bridge {
            provider,
            registry: SessionRegistry::new(),
            credential: RwLock::new(None),
            channel: RwLock::new(None),
            settings,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Register a new session and greet it.
    pub async fn on_connect(&self) -> (Arc<Session>, mpsc::Receiver<BroadcastMessage>) {
        let (session, rx) = Session::new();
        // Fresh queue with the receiver still in hand, so this can't fail
        let _ = session.deliver(BroadcastMessage::connected());
        self.registry.add(session.clone()).await;

        info!(session_id = %session.id(), "session connected");
        (session, rx)
    }

    pub async fn on_disconnect(&self, session: &Session) {
        session.begin_close();
        self.registry.remove(session.id()).await;
        session.mark_closed();

        info!(session_id = %session.id(), "session disconnected");
    }

    /// Verify the token with the provider and make it the shared credential.
    pub async fn authenticate(&self, token: AccessToken) -> BridgeResult<()> {
        if token.is_empty() {
            return Err(BridgeError::InvalidCommand("accessToken is empty".into()));
        }

        self.bounded("verify", self.provider.verify(&token)).await?;
        *self.credential.write().await = Some(token);

        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credential.read().await.is_some()
    }

    /// Register a change-notification channel for the primary calendar.
    ///
    /// Returns `Ok(None)` when no webhook address is configured. The channel
    /// is never renewed; it lapses after its expiration.
    pub async fn register_webhook(&self) -> BridgeResult<Option<WebhookChannel>> {
        let Some(address) = self.settings.webhook_address.as_deref() else {
            debug!("no webhook address configured; skipping channel registration");
            return Ok(None);
        };

        let token = self.credential().await?;
        let request = ChannelRequest::new(address, Utc::now());

        let channel = self
            .bounded("register_webhook", self.provider.register_webhook(&token, &request))
            .await
            .map_err(|e| BridgeError::WebhookRegistrationFailed(e.to_string()))?;

        let previous = self.channel.write().await.replace(channel.clone());
        info!(
            channel_id = %channel.id,
            expiration = %channel.expiration,
            superseded = previous.as_ref().map(|c| c.id.as_str()),
            "webhook channel registered"
        );

        Ok(Some(channel))
    }

    /// Fetch the forward window of events, ordered by start time.
    pub async fn resync(&self) -> BridgeResult<Vec<CalendarEvent>> {
        let token = self.credential().await?;
        let window = SyncWindow::default();

        let mut events = self
            .bounded("list_events", self.provider.list_events(&token, &window))
            .await?;

        // Stable, so same-start events keep the provider's order
        events.sort_by_key(CalendarEvent::start_key);
        events.truncate(window.max_results as usize);

        Ok(events)
    }

    pub async fn create_event(&self, draft: EventDraft) -> BridgeResult<CalendarEvent> {
        let token = self.credential().await?;
        let draft = draft.with_default_time_zone(&self.settings.time_zone);

        self.bounded("create_event", self.provider.create_event(&token, &draft))
            .await
    }

    pub async fn update_event(&self, event_id: &str, draft: EventDraft) -> BridgeResult<CalendarEvent> {
        let token = self.credential().await?;
        let draft = draft.with_default_time_zone(&self.settings.time_zone);

        self.bounded(
            "update_event",
            self.provider.update_event(&token, event_id, &draft),
        )
        .await
    }

    pub async fn delete_event(&self, event_id: &str) -> BridgeResult<()> {
        let token = self.credential().await?;

        self.bounded("delete_event", self.provider.delete_event(&token, event_id))
            .await
    }

    /// React to a provider change notification: resync, and if that works
    /// tell every session to pull fresh state. Failures are logged only.
    pub async fn on_external_change(&self) {
        match self.resync().await {
            Ok(events) => {
                debug!(count = events.len(), "resynced after external change");
                self.registry
                    .broadcast(&BroadcastMessage::external_change())
                    .await;
            }
            Err(e) => warn!(error = %e, "resync after external change failed"),
        }
    }

    pub async fn status(&self) -> BridgeStatus {
        BridgeStatus {
            sessions: self.registry.len().await,
            authenticated: self.is_authenticated().await,
            webhook_channel: self.channel.read().await.clone(),
        }
    }

    async fn credential(&self) -> BridgeResult<AccessToken> {
        self.credential
            .read()
            .await
            .clone()
            .ok_or(BridgeError::Unauthenticated)
    }

    /// Run a provider call under the configured timeout.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = ProviderResult<T>>,
    ) -> BridgeResult<T> {
        let limit = self.settings.provider_timeout;

        let result = match timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::timed_out(limit)),
        };

        result.map_err(|e| {
            warn!(operation, error = %e, "provider call failed");
            BridgeError::Provider(e)
        })
    }
}
