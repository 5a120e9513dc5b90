// --- File: crates/consultify_gcal/src/service.rs ---
//! Google Calendar implementation of the calendar service abstraction.

use crate::auth::{create_calendar_hub, Credential, HubType};
use consultify_common::services::{
    BoxFuture, CalendarCreateError, CalendarEvent, CalendarQueryError, CalendarService,
    CreatedEvent, EventQuery, NewEvent,
};
use consultify_common::{internal_error, ConsultifyError};
use google_calendar3::api::{
    ConferenceData, ConferenceSolutionKey, CreateConferenceRequest, Event, EventAttendee,
    EventDateTime,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Google Calendar implementation of the calendar service.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
    timeout: Duration,
}

impl GoogleCalendarService {
    pub fn new(calendar_hub: Arc<HubType>, timeout: Duration) -> Self {
        Self {
            calendar_hub,
            timeout,
        }
    }
}

impl CalendarService for GoogleCalendarService {
    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        query: &'a EventQuery,
    ) -> BoxFuture<'a, Vec<CalendarEvent>, CalendarQueryError> {
        Box::pin(async move {
            let mut events = Vec::new();
            let mut page_token: Option<String> = None;

            loop {
                let mut call = self
                    .calendar_hub
                    .events()
                    .list(calendar_id)
                    .time_min(query.time_min)
                    .single_events(query.single_events);
                if query.order_by_start_time {
                    call = call.order_by("startTime");
                }
                if let Some(time_max) = query.time_max {
                    call = call.time_max(time_max);
                }
                if let Some(max_results) = query.max_results {
                    call = call.max_results(max_results);
                }
                if let Some(token) = page_token.as_deref() {
                    call = call.page_token(token);
                }

                let (_, page) = tokio::time::timeout(self.timeout, call.doit())
                    .await
                    .map_err(|_| {
                        warn!("Event listing on {} timed out", calendar_id);
                        CalendarQueryError::Timeout(self.timeout)
                    })?
                    .map_err(|e| {
                        error!("Event listing on {} failed: {}", calendar_id, e);
                        CalendarQueryError::Api(e.to_string())
                    })?;

                for item in page.items.unwrap_or_default() {
                    events.push(event_from_google(item)?);
                }

                // An explicit limit means the caller only wants the first page.
                match page.next_page_token {
                    Some(token) if query.max_results.is_none() => page_token = Some(token),
                    _ => break,
                }
            }

            debug!("Listed {} event(s) on {}", events.len(), calendar_id);
            Ok(events)
        })
    }

    fn create_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: NewEvent,
        conference_data_version: i32,
    ) -> BoxFuture<'a, CreatedEvent, CalendarCreateError> {
        Box::pin(async move {
            let request = event_to_google(event);
            let call = self
                .calendar_hub
                .events()
                .insert(request, calendar_id)
                .conference_data_version(conference_data_version);

            let (_, created) = tokio::time::timeout(self.timeout, call.doit())
                .await
                .map_err(|_| CalendarCreateError::Timeout(self.timeout))?
                .map_err(|e| CalendarCreateError::Api(e.to_string()))?;

            let created = created_from_google(created);
            info!(
                "Created event {:?} on {} (conference status: {:?})",
                created.id, calendar_id, created.conference_status
            );
            Ok(created)
        })
    }
}

/// Converts a listed Google event. Timed events keep their span, all-day events
/// are flagged, anything else is malformed.
pub fn event_from_google(event: Event) -> Result<CalendarEvent, CalendarQueryError> {
    let id = event.id.clone().unwrap_or_else(|| "<no id>".to_string());
    let start = event.start.as_ref();
    let end = event.end.as_ref();

    let (start, end, all_day) = match (start, end) {
        (Some(start), Some(end)) => match (start.date_time, end.date_time) {
            (Some(start), Some(end)) => (Some(start), Some(end), false),
            _ if start.date.is_some() || end.date.is_some() => (None, None, true),
            _ => {
                return Err(CalendarQueryError::MalformedEvent(format!(
                    "event {} has neither a start instant nor a date",
                    id
                )))
            }
        },
        _ => {
            return Err(CalendarQueryError::MalformedEvent(format!(
                "event {} is missing its start or end",
                id
            )))
        }
    };

    let conferencing = event.conference_data.is_some() || event.hangout_link.is_some();
    let attendees = event
        .attendees
        .unwrap_or_default()
        .into_iter()
        .filter_map(|attendee| attendee.email)
        .collect();

    Ok(CalendarEvent {
        id: event.id,
        summary: event.summary,
        start,
        end,
        all_day,
        attendees,
        conferencing,
    })
}

/// Builds the Google event body for an insert call.
pub fn event_to_google(event: NewEvent) -> Event {
    let attendees = if event.attendees.is_empty() {
        None
    } else {
        Some(
            event
                .attendees
                .into_iter()
                .map(|email| EventAttendee {
                    email: Some(email),
                    ..Default::default()
                })
                .collect(),
        )
    };

    let conference_data = event.conference.map(|conference| ConferenceData {
        create_request: Some(CreateConferenceRequest {
            conference_solution_key: Some(ConferenceSolutionKey {
                type_: Some(conference.solution_type),
                ..Default::default()
            }),
            request_id: Some(conference.request_id),
            ..Default::default()
        }),
        ..Default::default()
    });

    Event {
        summary: Some(event.summary),
        description: event.description,
        color_id: event.color_id,
        start: Some(EventDateTime {
            date_time: Some(event.start),
            time_zone: Some(event.time_zone.clone()),
            ..Default::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(event.end),
            time_zone: Some(event.time_zone),
            ..Default::default()
        }),
        attendees,
        conference_data,
        ..Default::default()
    }
}

/// Extracts id, links and conference status from the insert response.
pub fn created_from_google(event: Event) -> CreatedEvent {
    let conference_status = event
        .conference_data
        .as_ref()
        .and_then(|data| data.create_request.as_ref())
        .and_then(|request| request.status.as_ref())
        .and_then(|status| status.status_code.clone());

    let video_entry_point = event
        .conference_data
        .as_ref()
        .and_then(|data| data.entry_points.as_ref())
        .and_then(|points| {
            points
                .iter()
                .find(|point| point.entry_point_type.as_deref() == Some("video"))
                .and_then(|point| point.uri.clone())
        });

    CreatedEvent {
        id: event.id,
        html_link: event.html_link,
        meet_link: event.hangout_link.or(video_entry_point),
        conference_status,
    }
}

/// Opens a calendar service for an authorized credential.
///
/// The handlers receive their calendar through this seam so a test can hand
/// out an in-memory calendar instead of Google.
pub trait CalendarConnector: Send + Sync {
    fn connect(&self, credential: &Credential) -> Result<Arc<dyn CalendarService>, ConsultifyError>;
}

/// Connects to Google Calendar, one hub per credential.
pub struct GoogleCalendarConnector {
    timeout: Duration,
}

impl GoogleCalendarConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CalendarConnector for GoogleCalendarConnector {
    fn connect(&self, credential: &Credential) -> Result<Arc<dyn CalendarService>, ConsultifyError> {
        let hub = create_calendar_hub(credential)
            .map_err(|e| internal_error(format!("Failed to create calendar hub: {}", e)))?;
        Ok(Arc::new(GoogleCalendarService::new(
            Arc::new(hub),
            self.timeout,
        )))
    }
}

// Mock implementation for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory calendar answering queries the way Google does: an event
    /// matches when it ends after `time_min` and starts before `time_max`.
    #[derive(Default)]
    pub struct MockCalendarService {
        events: Mutex<Vec<CalendarEvent>>,
        created: Mutex<Vec<NewEvent>>,
        list_calls: AtomicUsize,
        list_error: Option<CalendarQueryError>,
        create_error: Option<CalendarCreateError>,
        conference_status: Option<String>,
    }

    impl MockCalendarService {
        pub fn new() -> Self {
            Self {
                conference_status: Some("success".to_string()),
                ..Default::default()
            }
        }

        pub fn with_events(events: Vec<CalendarEvent>) -> Self {
            let service = Self::new();
            if let Ok(mut stored) = service.events.lock() {
                *stored = events;
            }
            service
        }

        pub fn failing_list(mut self, err: CalendarQueryError) -> Self {
            self.list_error = Some(err);
            self
        }

        pub fn failing_create(mut self, err: CalendarCreateError) -> Self {
            self.create_error = Some(err);
            self
        }

        pub fn conference_status(mut self, status: Option<&str>) -> Self {
            self.conference_status = status.map(str::to_string);
            self
        }

        pub fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        pub fn created(&self) -> Vec<NewEvent> {
            self.created.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    /// Hands out the same mock calendar for every credential and remembers
    /// the access tokens it was asked to connect with.
    pub struct MockConnector {
        pub service: Arc<MockCalendarService>,
        pub tokens: Mutex<Vec<String>>,
    }

    impl MockConnector {
        pub fn new(service: MockCalendarService) -> Self {
            Self {
                service: Arc::new(service),
                tokens: Mutex::new(Vec::new()),
            }
        }

        pub fn tokens(&self) -> Vec<String> {
            self.tokens.lock().unwrap().clone()
        }
    }

    impl CalendarConnector for MockConnector {
        fn connect(
            &self,
            credential: &Credential,
        ) -> Result<Arc<dyn CalendarService>, ConsultifyError> {
            self.tokens
                .lock()
                .unwrap()
                .push(credential.access_token().to_string());
            Ok(self.service.clone())
        }
    }

    impl CalendarService for MockCalendarService {
        fn list_events<'a>(
            &'a self,
            _calendar_id: &'a str,
            query: &'a EventQuery,
        ) -> BoxFuture<'a, Vec<CalendarEvent>, CalendarQueryError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let result = match &self.list_error {
                Some(err) => Err(err.clone()),
                None => {
                    let events = self.events.lock().unwrap();
                    let mut matching: Vec<CalendarEvent> = events
                        .iter()
                        .filter(|event| match event.span() {
                            Some((start, end)) => {
                                end > query.time_min
                                    && query.time_max.map_or(true, |max| start < max)
                            }
                            None => event.all_day,
                        })
                        .cloned()
                        .collect();
                    matching.sort_by_key(|event| event.start);
                    if let Some(limit) = query.max_results {
                        matching.truncate(limit.max(0) as usize);
                    }
                    Ok(matching)
                }
            };
            Box::pin(async move { result })
        }

        fn create_event<'a>(
            &'a self,
            _calendar_id: &'a str,
            event: NewEvent,
            _conference_data_version: i32,
        ) -> BoxFuture<'a, CreatedEvent, CalendarCreateError> {
            self.created.lock().unwrap().push(event);
            let result = match &self.create_error {
                Some(err) => Err(err.clone()),
                None => {
                    let n = self.created.lock().unwrap().len();
                    Ok(CreatedEvent {
                        id: Some(format!("mock-event-{}", n)),
                        html_link: Some(format!("https://calendar.example/event/{}", n)),
                        meet_link: self
                            .conference_status
                            .as_deref()
                            .filter(|status| *status == "success")
                            .map(|_| "https://meet.google.com/abc-defg-hij".to_string()),
                        conference_status: self.conference_status.clone(),
                    })
                }
            };
            Box::pin(async move { result })
        }
    }
}
