//! In-memory calendar provider for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use calbridge_core::{
    AccessToken, CalendarEvent, CalendarProvider, ChannelRequest, DraftTime, EventDraft,
    EventTime, ProviderError, ProviderResult, SyncWindow, WebhookChannel,
};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::bridge::BridgeSettings;

pub fn settings() -> BridgeSettings {
    BridgeSettings {
        webhook_address: Some("https://bridge.example.com/webhook/google-calendar".into()),
        time_zone: "Europe/Berlin".into(),
        provider_timeout: Duration::from_secs(1),
    }
}

pub fn draft(title: &str) -> EventDraft {
    serde_json::from_value(serde_json::json!({
        "title": title,
        "startDateTime": "2025-01-10T09:00:00",
        "endDateTime": "2025-01-10T09:30:00"
    }))
    .unwrap()
}

fn draft_time(time: &DraftTime) -> DateTime<FixedOffset> {
    match time {
        DraftTime::Zoned(dt) => *dt,
        DraftTime::Floating(dt) => dt.and_utc().fixed_offset(),
    }
}

fn event_from_draft(id: String, draft: &EventDraft) -> CalendarEvent {
    CalendarEvent {
        id,
        title: draft.title.clone(),
        description: draft.description.clone(),
        location: draft.location.clone(),
        start: EventTime::Timed {
            date_time: draft_time(&draft.start_date_time),
            time_zone: draft.time_zone.clone(),
        },
        end: EventTime::Timed {
            date_time: draft_time(&draft.end_date_time),
            time_zone: draft.time_zone.clone(),
        },
        html_link: None,
        status: None,
        updated: None,
    }
}

/// A provider backed by a `Vec`, accepting exactly one token.
pub struct FakeProvider {
    valid_token: String,
    events: Mutex<Vec<CalendarEvent>>,
    drafts: Mutex<Vec<EventDraft>>,
    failure: Mutex<Option<ProviderError>>,
    delay: Mutex<Option<Duration>>,
    webhook_delay: Mutex<Option<Duration>>,
    webhooks_fail: AtomicBool,
    next_id: AtomicUsize,
    mutations: AtomicUsize,
}

impl FakeProvider {
    pub fn new(valid_token: &str) -> Self {
        FakeProvider {
            valid_token: valid_token.to_string(),
            events: Mutex::new(Vec::new()),
            drafts: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            delay: Mutex::new(None),
            webhook_delay: Mutex::new(None),
            webhooks_fail: AtomicBool::new(false),
            next_id: AtomicUsize::new(1),
            mutations: AtomicUsize::new(0),
        }
    }

    /// Add an event starting `day` days into January 2025, unsorted on purpose.
    pub fn seed(&self, id: &str, day: u32) {
        let start = Utc
            .with_ymd_and_hms(2025, 1, day, 9, 0, 0)
            .unwrap()
            .fixed_offset();
        self.events.lock().unwrap().push(CalendarEvent {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            location: None,
            start: EventTime::Timed {
                date_time: start,
                time_zone: None,
            },
            end: EventTime::Timed {
                date_time: start + chrono::Duration::hours(1),
                time_zone: None,
            },
            html_link: None,
            status: None,
            updated: None,
        });
    }

    /// Make every call after this one fail with `error`.
    pub fn fail_with(&self, error: ProviderError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn fail_webhooks(&self) {
        self.webhooks_fail.store(true, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Slow down only `register_webhook`.
    pub fn set_webhook_delay(&self, delay: Duration) {
        *self.webhook_delay.lock().unwrap() = Some(delay);
    }

    pub fn received_drafts(&self) -> Vec<EventDraft> {
        self.drafts.lock().unwrap().clone()
    }

    /// Number of create/update/delete calls that reached the provider.
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    async fn enter(&self, token: &AccessToken) -> ProviderResult<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        if token.secret() != self.valid_token {
            return Err(ProviderError::Rejected {
                status: 401,
                message: "Invalid Credentials".into(),
            });
        }

        Ok(())
    }

    fn not_found(event_id: &str) -> ProviderError {
        ProviderError::Rejected {
            status: 404,
            message: format!("Event {event_id} not found"),
        }
    }
}

#[async_trait]
impl CalendarProvider for FakeProvider {
    async fn verify(&self, token: &AccessToken) -> ProviderResult<()> {
        self.enter(token).await
    }

    async fn list_events(
        &self,
        token: &AccessToken,
        _window: &SyncWindow,
    ) -> ProviderResult<Vec<CalendarEvent>> {
        self.enter(token).await?;
        Ok(self.events.lock().unwrap().clone())
    }

    async fn create_event(
        &self,
        token: &AccessToken,
        draft: &EventDraft,
    ) -> ProviderResult<CalendarEvent> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.enter(token).await?;

        let id = format!("evt-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let event = event_from_draft(id, draft);
        self.drafts.lock().unwrap().push(draft.clone());
        self.events.lock().unwrap().push(event.clone());

        Ok(event)
    }

    async fn update_event(
        &self,
        token: &AccessToken,
        event_id: &str,
        draft: &EventDraft,
    ) -> ProviderResult<CalendarEvent> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.enter(token).await?;

        let mut events = self.events.lock().unwrap();
        let slot = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| Self::not_found(event_id))?;

        *slot = event_from_draft(event_id.to_string(), draft);
        self.drafts.lock().unwrap().push(draft.clone());

        Ok(slot.clone())
    }

    async fn delete_event(&self, token: &AccessToken, event_id: &str) -> ProviderResult<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.enter(token).await?;

        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id != event_id);

        if events.len() == before {
            return Err(Self::not_found(event_id));
        }

        Ok(())
    }

    async fn register_webhook(
        &self,
        token: &AccessToken,
        request: &ChannelRequest,
    ) -> ProviderResult<WebhookChannel> {
        self.enter(token).await?;

        let delay = *self.webhook_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.webhooks_fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Rejected {
                status: 400,
                message: "Unauthorized WebHook callback channel".into(),
            });
        }

        Ok(WebhookChannel {
            id: request.id.clone(),
            resource_id: Some("res-1".into()),
            address: request.address.clone(),
            expiration: request.expiration,
        })
    }
}
