//! calbridge-provider-google - Google Calendar adapter for calbridge
//!
//! Talks to the Calendar v3 REST API on behalf of whichever access token
//! the caller passes in. Every call targets the token owner's primary
//! calendar and round-trips to Google; nothing is cached or retried here.

mod client;
mod commands;
mod google_event;

use async_trait::async_trait;
use calbridge_core::{
    AccessToken, CalendarEvent, CalendarProvider, ChannelRequest, EventDraft, ProviderResult,
    SyncWindow, WebhookChannel,
};

pub use client::{DEFAULT_API_BASE, PRIMARY_CALENDAR_ID};

/// Google Calendar implementation of [`CalendarProvider`].
#[derive(Debug, Clone)]
pub struct GoogleCalendar {
    client: client::ApiClient,
}

impl GoogleCalendar {
    /// Adapter against a Calendar API root (normally [`DEFAULT_API_BASE`]).
    pub fn new(api_base: &str) -> Result<Self, String> {
        Ok(GoogleCalendar {
            client: client::ApiClient::new(api_base)?,
        })
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    async fn verify(&self, token: &AccessToken) -> ProviderResult<()> {
        commands::verify::handle(&self.client, token).await
    }

    async fn list_events(
        &self,
        token: &AccessToken,
        window: &SyncWindow,
    ) -> ProviderResult<Vec<CalendarEvent>> {
        commands::list_events::handle(&self.client, token, window).await
    }

    async fn create_event(
        &self,
        token: &AccessToken,
        draft: &EventDraft,
    ) -> ProviderResult<CalendarEvent> {
        commands::create_event::handle(&self.client, token, draft).await
    }

    async fn update_event(
        &self,
        token: &AccessToken,
        event_id: &str,
        draft: &EventDraft,
    ) -> ProviderResult<CalendarEvent> {
        commands::update_event::handle(&self.client, token, event_id, draft).await
    }

    async fn delete_event(&self, token: &AccessToken, event_id: &str) -> ProviderResult<()> {
        commands::delete_event::handle(&self.client, token, event_id).await
    }

    async fn register_webhook(
        &self,
        token: &AccessToken,
        request: &ChannelRequest,
    ) -> ProviderResult<WebhookChannel> {
        commands::watch::handle(&self.client, token, request).await
    }
}
