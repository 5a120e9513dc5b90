// --- File: crates/consultify_gcal/src/logic.rs ---
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use consultify_common::services::{
    CalendarCreateError, CalendarEvent, CalendarQueryError, CalendarService, ConferenceRequest,
    CreatedEvent, EventQuery, NewEvent,
};
use consultify_common::{config_error, ConsultifyError};
use consultify_config::{CalendarConfig, MeetingConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Conference solution requested for every booking.
pub const CONFERENCE_SOLUTION: &str = "hangoutsMeet";
/// Version the insert call must declare for conference data to be honoured.
pub const CONFERENCE_DATA_VERSION: i32 = 1;
/// Status code reported once the video meeting has been provisioned.
pub const CONFERENCE_READY: &str = "success";

// --- Scheduling Errors ---
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("Booking conflict: the start time falls inside an existing event")]
    Conflict,
    #[error("Calendar service error: {0}")]
    ServiceError(#[from] CalendarCreateError),
    #[error("Could not determine whether the slot is free: {0}")]
    UnknownConflictState(#[from] CalendarQueryError),
    #[error("Invalid meeting slot: {0}")]
    InvalidSlot(String),
}

impl SchedulingError {
    /// Short machine-readable reason used in responses.
    pub fn reason(&self) -> &'static str {
        match self {
            SchedulingError::Conflict => "conflict",
            SchedulingError::ServiceError(_) => "service_error",
            SchedulingError::UnknownConflictState(_) => "unknown_conflict_state",
            SchedulingError::InvalidSlot(_) => "invalid_slot",
        }
    }
}

// --- Request / Settings ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRequest {
    /// RFC 3339 start of the meeting.
    pub start: DateTime<Utc>,
    /// RFC 3339 end of the meeting, strictly after `start`.
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replaces the configured attendee list when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
}

impl MeetingRequest {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            summary: None,
            description: None,
            attendees: None,
        }
    }

    /// The slot configured for the login flow, if any.
    pub fn from_config(meeting: &MeetingConfig) -> Result<Option<Self>, ConsultifyError> {
        let Some(start) = meeting.default_start.as_deref() else {
            return Ok(None);
        };
        let start = parse_instant(start)?;
        let end = match meeting.default_end.as_deref() {
            Some(end) => parse_instant(end)?,
            None => start + Duration::minutes(meeting.default_duration_minutes),
        };
        Ok(Some(Self::new(start, end)))
    }

    /// Rejects slots whose end is not strictly after their start.
    pub fn validate(&self) -> Result<(), SchedulingError> {
        if self.end <= self.start {
            return Err(SchedulingError::InvalidSlot(format!(
                "end {} is not after start {}",
                self.end.to_rfc3339(),
                self.start.to_rfc3339()
            )));
        }
        Ok(())
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, ConsultifyError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| config_error(format!("Invalid meeting time '{}': {}", value, e)))
}

/// Fixed attributes stamped on every booked event.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingSettings {
    pub summary: String,
    pub description: Option<String>,
    pub color_id: Option<String>,
    pub attendees: Vec<String>,
    pub time_zone: Tz,
}

impl MeetingSettings {
    pub fn from_config(
        meeting: &MeetingConfig,
        calendar: &CalendarConfig,
    ) -> Result<Self, ConsultifyError> {
        let time_zone: Tz = calendar.time_zone.parse().map_err(|e| {
            config_error(format!("Invalid time zone '{}': {}", calendar.time_zone, e))
        })?;

        Ok(Self {
            summary: meeting.summary.clone(),
            description: Some(meeting.description.clone()).filter(|d| !d.is_empty()),
            color_id: meeting.color_id.clone(),
            attendees: meeting.attendees.clone(),
            time_zone,
        })
    }

    fn event_for(&self, request: &MeetingRequest) -> NewEvent {
        NewEvent {
            summary: request
                .summary
                .clone()
                .unwrap_or_else(|| self.summary.clone()),
            description: request
                .description
                .clone()
                .or_else(|| self.description.clone()),
            color_id: self.color_id.clone(),
            start: request.start,
            end: request.end,
            time_zone: self.time_zone.name().to_string(),
            attendees: request
                .attendees
                .clone()
                .unwrap_or_else(|| self.attendees.clone()),
            conference: Some(ConferenceRequest {
                solution_type: CONFERENCE_SOLUTION.to_string(),
                request_id: Uuid::new_v4().to_string(),
            }),
        }
    }
}

// --- Outcomes ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conferencing {
    /// The video meeting is provisioned.
    Ready { meet_link: Option<String> },
    /// The event exists but its conference is not (yet) usable.
    Missing { status_code: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingOutcome {
    Created {
        event: CreatedEvent,
        conferencing: Conferencing,
    },
    NotCreated(SchedulingError),
}

impl MeetingOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, MeetingOutcome::Created { .. })
    }
}

/// Every way a scheduling attempt can end.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    CreatedFully,
    CreatedWithoutConferencing,
    AbortedByConflict,
    FailedByServiceError,
    FailedByUnknownConflictState,
    RejectedInvalidSlot,
}

impl MeetingStatus {
    pub fn from_result(result: &Result<MeetingOutcome, SchedulingError>) -> Self {
        match result {
            Ok(MeetingOutcome::Created {
                conferencing: Conferencing::Ready { .. },
                ..
            }) => MeetingStatus::CreatedFully,
            Ok(MeetingOutcome::Created {
                conferencing: Conferencing::Missing { .. },
                ..
            }) => MeetingStatus::CreatedWithoutConferencing,
            Ok(MeetingOutcome::NotCreated(err)) | Err(err) => match err {
                SchedulingError::Conflict => MeetingStatus::AbortedByConflict,
                SchedulingError::ServiceError(_) => MeetingStatus::FailedByServiceError,
                SchedulingError::UnknownConflictState(_) => {
                    MeetingStatus::FailedByUnknownConflictState
                }
                SchedulingError::InvalidSlot(_) => MeetingStatus::RejectedInvalidSlot,
            },
        }
    }

    pub fn created(&self) -> bool {
        matches!(
            self,
            MeetingStatus::CreatedFully | MeetingStatus::CreatedWithoutConferencing
        )
    }
}

/// Response body of the booking endpoints.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingResponse {
    pub status: MeetingStatus,
    pub created: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meet_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conference_status: Option<String>,
}

impl From<&Result<MeetingOutcome, SchedulingError>> for MeetingResponse {
    fn from(result: &Result<MeetingOutcome, SchedulingError>) -> Self {
        let status = MeetingStatus::from_result(result);
        match result {
            Ok(MeetingOutcome::Created {
                event,
                conferencing,
            }) => {
                let message = match conferencing {
                    Conferencing::Ready { .. } => "Meeting booked with a Google Meet link",
                    Conferencing::Missing { .. } => {
                        "Meeting booked but the Google Meet link is not ready"
                    }
                };
                MeetingResponse {
                    status,
                    created: status.created(),
                    message: message.to_string(),
                    reason: None,
                    event_id: event.id.clone(),
                    html_link: event.html_link.clone(),
                    meet_link: event.meet_link.clone(),
                    conference_status: event.conference_status.clone(),
                }
            }
            Ok(MeetingOutcome::NotCreated(err)) | Err(err) => MeetingResponse {
                status,
                created: status.created(),
                message: err.to_string(),
                reason: Some(err.reason().to_string()),
                event_id: None,
                html_link: None,
                meet_link: None,
                conference_status: None,
            },
        }
    }
}

// --- Conflict Detection ---

/// The first timed event whose closed span `[start, end]` contains `candidate`.
///
/// All-day events carry no instant span and never match.
pub fn find_conflict(events: &[CalendarEvent], candidate: DateTime<Utc>) -> Option<&CalendarEvent> {
    events.iter().find(|event| match event.span() {
        Some((start, end)) => start <= candidate && candidate <= end,
        None => {
            warn!(
                "Skipping event {:?} without explicit start/end in conflict check",
                event.id
            );
            false
        }
    })
}

/// Whether `candidate` falls inside any existing event of `calendar_id`.
///
/// The query window is widened by a second on both sides because the calendar
/// treats its bounds as exclusive, which would hide an event ending exactly at
/// `candidate`.
pub async fn has_conflict(
    service: &dyn CalendarService,
    calendar_id: &str,
    candidate: DateTime<Utc>,
) -> Result<bool, CalendarQueryError> {
    let query = EventQuery::upcoming(candidate - Duration::seconds(1))
        .until(candidate + Duration::seconds(1));
    debug!(
        "Checking {} for events between {} and {:?}",
        calendar_id,
        query.time_min.to_rfc3339(),
        query.time_max.map(|t| t.to_rfc3339())
    );
    let events = service.list_events(calendar_id, &query).await?;

    match find_conflict(&events, candidate) {
        Some(event) => {
            info!(
                "Slot at {} overlaps event {:?} ({:?})",
                candidate.to_rfc3339(),
                event.id,
                event.summary
            );
            Ok(true)
        }
        None => {
            info!(
                "No conflict at {} among {} event(s)",
                candidate.to_rfc3339(),
                events.len()
            );
            Ok(false)
        }
    }
}

// --- Scheduling ---

/// Books a meeting unless its start time collides with an existing event.
///
/// Returns `Err` only when the slot is invalid or the conflict state could not
/// be established; in both cases no event is created. Every other ending is
/// reported through [`MeetingOutcome`].
pub async fn schedule_meeting(
    service: &dyn CalendarService,
    calendar_id: &str,
    request: &MeetingRequest,
    settings: &MeetingSettings,
) -> Result<MeetingOutcome, SchedulingError> {
    request.validate()?;

    let conflict = has_conflict(service, calendar_id, request.start)
        .await
        .map_err(|e| {
            error!("Conflict check failed, refusing to book: {}", e);
            SchedulingError::UnknownConflictState(e)
        })?;
    if conflict {
        info!("Not booking {}: slot is taken", request.start.to_rfc3339());
        return Ok(MeetingOutcome::NotCreated(SchedulingError::Conflict));
    }

    let event = settings.event_for(request);
    match service
        .create_event(calendar_id, event, CONFERENCE_DATA_VERSION)
        .await
    {
        Ok(created) => {
            let conferencing = match created.conference_status.as_deref() {
                Some(CONFERENCE_READY) => Conferencing::Ready {
                    meet_link: created.meet_link.clone(),
                },
                other => {
                    warn!(
                        "Event {:?} created but conference status is {:?}",
                        created.id, other
                    );
                    Conferencing::Missing {
                        status_code: other.map(str::to_string),
                    }
                }
            };
            Ok(MeetingOutcome::Created {
                event: created,
                conferencing,
            })
        }
        Err(e) => {
            error!("Failed to create event on {}: {}", calendar_id, e);
            Ok(MeetingOutcome::NotCreated(SchedulingError::ServiceError(e)))
        }
    }
}
