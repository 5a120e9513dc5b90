//! Service abstractions for external services.
//!
//! The calendar backend is reached through the [`CalendarService`] trait so
//! the scheduling logic can run against Google Calendar in production and an
//! in-memory double in tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Listing events failed. The conflict state of the slot is unknown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarQueryError {
    #[error("Calendar query failed: {0}")]
    Api(String),
    #[error("Calendar query timed out after {0:?}")]
    Timeout(Duration),
    #[error("Calendar returned a malformed event: {0}")]
    MalformedEvent(String),
}

/// Creating an event failed on the transport or service side.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarCreateError {
    #[error("Event creation failed: {0}")]
    Api(String),
    #[error("Event creation timed out after {0:?}")]
    Timeout(Duration),
}

/// A trait for calendar service operations.
///
/// Listing and creating are the only calendar operations exposed.
pub trait CalendarService: Send + Sync {
    /// List events of `calendar_id` matching `query`, following pagination.
    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        query: &'a EventQuery,
    ) -> BoxFuture<'a, Vec<CalendarEvent>, CalendarQueryError>;

    /// Insert `event` into `calendar_id`.
    ///
    /// `conference_data_version` must be 1 for the conferencing request in
    /// `event` to be honoured.
    fn create_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: NewEvent,
        conference_data_version: i32,
    ) -> BoxFuture<'a, CreatedEvent, CalendarCreateError>;
}

/// Parameters of an events listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Lower bound (exclusive) on an event's end time.
    pub time_min: DateTime<Utc>,
    /// Upper bound (exclusive) on an event's start time.
    pub time_max: Option<DateTime<Utc>>,
    pub max_results: Option<i32>,
    pub order_by_start_time: bool,
    /// Expand recurring events into instances.
    pub single_events: bool,
}

impl EventQuery {
    /// Events still running at or starting after `time_min`, ordered by start.
    pub fn upcoming(time_min: DateTime<Utc>) -> Self {
        Self {
            time_min,
            time_max: None,
            max_results: None,
            order_by_start_time: true,
            single_events: true,
        }
    }

    pub fn until(mut self, time_max: DateTime<Utc>) -> Self {
        self.time_max = Some(time_max);
        self
    }

    pub fn limit(mut self, max_results: i32) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

/// An event as read back from the calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    /// Absent for all-day events.
    pub start: Option<DateTime<Utc>>,
    /// Absent for all-day events.
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub attendees: Vec<String>,
    pub conferencing: bool,
}

impl CalendarEvent {
    /// The explicit `[start, end]` span, if the event has one.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

/// The body of an event to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub summary: String,
    pub description: Option<String>,
    pub color_id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// IANA zone attached to start and end, e.g. "Asia/Singapore".
    pub time_zone: String,
    pub attendees: Vec<String>,
    pub conference: Option<ConferenceRequest>,
}

/// A request to attach an auto-generated video meeting to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConferenceRequest {
    /// Conference solution, "hangoutsMeet" for Google Meet.
    pub solution_type: String,
    /// Must be unique per creation request.
    pub request_id: String,
}

/// What the calendar returned for a created event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: Option<String>,
    pub html_link: Option<String>,
    pub meet_link: Option<String>,
    /// `conferenceData.createRequest.status.statusCode`, e.g. "success" or "pending".
    pub conference_status: Option<String>,
}
