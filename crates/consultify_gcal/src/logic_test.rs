#[cfg(test)]
mod tests {
    use crate::logic::{
        find_conflict, has_conflict, schedule_meeting, Conferencing, MeetingOutcome,
        MeetingRequest, MeetingResponse, MeetingSettings, MeetingStatus, SchedulingError,
        CONFERENCE_SOLUTION,
    };
    use crate::service::mock::MockCalendarService;
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::Tz;
    use consultify_common::services::{CalendarCreateError, CalendarEvent, CalendarQueryError};
    use consultify_config::{CalendarConfig, MeetingConfig};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 12, hour, minute, 0).unwrap()
    }

    fn event(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            id: Some(id.to_string()),
            summary: Some(format!("busy {}", id)),
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    fn all_day(id: &str) -> CalendarEvent {
        CalendarEvent {
            id: Some(id.to_string()),
            all_day: true,
            ..Default::default()
        }
    }

    fn settings() -> MeetingSettings {
        MeetingSettings {
            summary: "30 minute Consultancy Call".to_string(),
            description: Some("Consultancy Call".to_string()),
            color_id: Some("6".to_string()),
            attendees: vec!["guest@example.com".to_string()],
            time_zone: Tz::Asia__Singapore,
        }
    }

    fn slot() -> MeetingRequest {
        MeetingRequest::new(at(14, 0), at(14, 30))
    }

    // --- find_conflict ---

    #[test]
    fn test_candidate_inside_event_conflicts() {
        let events = vec![event("e1", at(13, 45), at(14, 15))];
        assert_eq!(
            find_conflict(&events, at(14, 0)).and_then(|e| e.id.as_deref()),
            Some("e1")
        );
    }

    #[test]
    fn test_event_bounds_are_inclusive() {
        let ends_at_candidate = vec![event("e1", at(13, 30), at(14, 0))];
        assert!(find_conflict(&ends_at_candidate, at(14, 0)).is_some());

        let starts_at_candidate = vec![event("e2", at(14, 0), at(14, 30))];
        assert!(find_conflict(&starts_at_candidate, at(14, 0)).is_some());
    }

    #[test]
    fn test_event_after_candidate_does_not_conflict() {
        let events = vec![event("later", at(14, 10), at(15, 0))];
        assert!(find_conflict(&events, at(14, 0)).is_none());
    }

    #[test]
    fn test_all_day_events_are_skipped() {
        let events = vec![all_day("holiday")];
        assert!(find_conflict(&events, at(14, 0)).is_none());
    }

    #[test]
    fn test_any_event_in_the_window_is_inspected() {
        // The first event does not contain the candidate, the second one does.
        let events = vec![
            event("short", at(13, 50), at(13, 55)),
            event("long", at(9, 0), at(17, 0)),
        ];
        assert_eq!(
            find_conflict(&events, at(14, 0)).and_then(|e| e.id.as_deref()),
            Some("long")
        );
    }

    // --- has_conflict ---

    #[tokio::test]
    async fn test_has_conflict_sees_event_ending_at_candidate() {
        let service = MockCalendarService::with_events(vec![event("e1", at(13, 30), at(14, 0))]);
        let result = has_conflict(&service, "primary", at(14, 0)).await;
        assert_eq!(result, Ok(true));
    }

    #[tokio::test]
    async fn test_has_conflict_on_empty_calendar() {
        let service = MockCalendarService::new();
        assert_eq!(has_conflict(&service, "primary", at(14, 0)).await, Ok(false));
        assert_eq!(service.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_has_conflict_propagates_query_errors() {
        let service = MockCalendarService::new()
            .failing_list(CalendarQueryError::Api("503 backend error".to_string()));
        let result = has_conflict(&service, "primary", at(14, 0)).await;
        assert!(matches!(result, Err(CalendarQueryError::Api(_))));
    }

    // --- schedule_meeting ---

    #[tokio::test]
    async fn test_free_slot_is_booked_with_meet() {
        let service = MockCalendarService::new();
        let result = schedule_meeting(&service, "primary", &slot(), &settings()).await;

        match &result {
            Ok(MeetingOutcome::Created {
                event,
                conferencing: Conferencing::Ready { meet_link },
            }) => {
                assert!(event.id.is_some());
                assert!(meet_link.is_some());
            }
            other => panic!("expected a fully created meeting, got {:?}", other),
        }
        assert_eq!(MeetingStatus::from_result(&result), MeetingStatus::CreatedFully);

        let created = service.created();
        assert_eq!(created.len(), 1);
        let body = &created[0];
        assert_eq!(body.start, at(14, 0));
        assert_eq!(body.end, at(14, 30));
        assert_eq!(body.time_zone, "Asia/Singapore");
        assert_eq!(body.summary, "30 minute Consultancy Call");
        assert_eq!(body.color_id.as_deref(), Some("6"));
        assert_eq!(body.attendees, vec!["guest@example.com".to_string()]);
        let conference = body.conference.as_ref().expect("conference requested");
        assert_eq!(conference.solution_type, CONFERENCE_SOLUTION);
        assert!(!conference.request_id.is_empty());
    }

    #[tokio::test]
    async fn test_conflicting_slot_is_not_booked() {
        let service = MockCalendarService::with_events(vec![event("e1", at(13, 45), at(14, 15))]);
        let result = schedule_meeting(&service, "primary", &slot(), &settings()).await;

        assert_eq!(
            result,
            Ok(MeetingOutcome::NotCreated(SchedulingError::Conflict))
        );
        assert_eq!(MeetingStatus::from_result(&result), MeetingStatus::AbortedByConflict);
        assert!(service.created().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_conflict_state_blocks_creation() {
        let service = MockCalendarService::new()
            .failing_list(CalendarQueryError::Timeout(std::time::Duration::from_secs(5)));
        let result = schedule_meeting(&service, "primary", &slot(), &settings()).await;

        assert!(matches!(
            result,
            Err(SchedulingError::UnknownConflictState(CalendarQueryError::Timeout(_)))
        ));
        assert_eq!(
            MeetingStatus::from_result(&result),
            MeetingStatus::FailedByUnknownConflictState
        );
        assert!(service.created().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_is_a_service_error() {
        let service = MockCalendarService::new()
            .failing_create(CalendarCreateError::Api("403 insufficient permissions".to_string()));
        let result = schedule_meeting(&service, "primary", &slot(), &settings()).await;

        assert!(matches!(
            result,
            Ok(MeetingOutcome::NotCreated(SchedulingError::ServiceError(_)))
        ));
        assert_eq!(MeetingStatus::from_result(&result), MeetingStatus::FailedByServiceError);
        assert_eq!(service.created().len(), 1, "exactly one create attempt");
    }

    #[tokio::test]
    async fn test_pending_conference_is_reported_as_missing() {
        let service = MockCalendarService::new().conference_status(Some("pending"));
        let result = schedule_meeting(&service, "primary", &slot(), &settings()).await;

        assert!(matches!(
            &result,
            Ok(MeetingOutcome::Created {
                conferencing: Conferencing::Missing { status_code: Some(code) },
                ..
            }) if code == "pending"
        ));
        assert_eq!(
            MeetingStatus::from_result(&result),
            MeetingStatus::CreatedWithoutConferencing
        );
    }

    #[tokio::test]
    async fn test_absent_conference_status_is_missing() {
        let service = MockCalendarService::new().conference_status(None);
        let result = schedule_meeting(&service, "primary", &slot(), &settings()).await;
        assert!(matches!(
            result,
            Ok(MeetingOutcome::Created {
                conferencing: Conferencing::Missing { status_code: None },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_inverted_slot_is_rejected_before_any_call() {
        let service = MockCalendarService::new();
        let request = MeetingRequest::new(at(14, 30), at(14, 0));
        let result = schedule_meeting(&service, "primary", &request, &settings()).await;

        assert!(matches!(result, Err(SchedulingError::InvalidSlot(_))));
        assert_eq!(service.list_calls(), 0);
        assert!(service.created().is_empty());
    }

    #[tokio::test]
    async fn test_request_overrides_summary_and_attendees() {
        let service = MockCalendarService::new();
        let request = MeetingRequest {
            summary: Some("Architecture review".to_string()),
            attendees: Some(vec!["a@example.com".to_string(), "b@example.com".to_string()]),
            ..slot()
        };
        schedule_meeting(&service, "primary", &request, &settings())
            .await
            .expect("booked");

        let created = service.created();
        let body = &created[0];
        assert_eq!(body.summary, "Architecture review");
        assert_eq!(body.attendees.len(), 2);
        assert_eq!(body.description.as_deref(), Some("Consultancy Call"));
    }

    #[tokio::test]
    async fn test_each_booking_gets_a_fresh_request_id() {
        let service = MockCalendarService::new();
        let settings = settings();
        schedule_meeting(&service, "primary", &slot(), &settings).await.expect("first");
        let later = MeetingRequest::new(at(16, 0), at(16, 30));
        schedule_meeting(&service, "primary", &later, &settings).await.expect("second");

        let created = service.created();
        let ids: Vec<_> = created
            .iter()
            .filter_map(|e| e.conference.as_ref().map(|c| c.request_id.clone()))
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    // --- responses & settings ---

    #[test]
    fn test_response_for_conflict() {
        let result = Ok(MeetingOutcome::NotCreated(SchedulingError::Conflict));
        let response = MeetingResponse::from(&result);
        assert!(!response.created);
        assert_eq!(response.status, MeetingStatus::AbortedByConflict);
        assert_eq!(response.reason.as_deref(), Some("conflict"));

        let json = serde_json::to_value(&response).expect("serializes");
        assert_eq!(json["status"], "aborted_by_conflict");
        assert!(json.get("event_id").is_none());
    }

    #[test]
    fn test_settings_from_config() {
        let meeting = MeetingConfig {
            color_id: Some("6".to_string()),
            attendees: vec!["guest@example.com".to_string()],
            ..Default::default()
        };
        let settings =
            MeetingSettings::from_config(&meeting, &CalendarConfig::default()).expect("valid");
        assert_eq!(settings.time_zone, Tz::Asia__Singapore);
        assert_eq!(settings.summary, "30 minute Consultancy Call");
    }

    #[test]
    fn test_unknown_time_zone_is_rejected() {
        let calendar = CalendarConfig {
            time_zone: "Mars/Olympus_Mons".to_string(),
            ..Default::default()
        };
        assert!(MeetingSettings::from_config(&MeetingConfig::default(), &calendar).is_err());
    }

    #[test]
    fn test_default_slot_from_config() {
        let meeting = MeetingConfig {
            default_start: Some("2024-08-12T14:00:00Z".to_string()),
            default_end: None,
            default_duration_minutes: 45,
            ..Default::default()
        };
        let request = MeetingRequest::from_config(&meeting)
            .expect("parses")
            .expect("slot configured");
        assert_eq!(request.start, at(14, 0));
        assert_eq!(request.end, at(14, 45));

        assert_eq!(MeetingRequest::from_config(&MeetingConfig::default()).expect("ok"), None);
    }
}
