#[cfg(test)]
mod tests {
    use crate::logic::{find_conflict, schedule_meeting, MeetingOutcome, MeetingRequest, MeetingSettings, SchedulingError};
    use crate::service::mock::MockCalendarService;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use chrono_tz::Tz;
    use consultify_common::services::CalendarEvent;
    use proptest::prelude::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 12, 0, 0, 0).unwrap()
    }

    // Busy periods given as (start offset, duration) in minutes from `base`.
    fn busy_events(periods: &[(i64, i64)]) -> Vec<CalendarEvent> {
        periods
            .iter()
            .enumerate()
            .map(|(i, (offset, duration))| {
                let start = base() + Duration::minutes(*offset);
                CalendarEvent {
                    id: Some(format!("busy-{}", i)),
                    start: Some(start),
                    end: Some(start + Duration::minutes(*duration)),
                    ..Default::default()
                }
            })
            .collect()
    }

    fn settings() -> MeetingSettings {
        MeetingSettings {
            summary: "Call".to_string(),
            description: None,
            color_id: None,
            attendees: vec![],
            time_zone: Tz::UTC,
        }
    }

    proptest! {
        // A reported conflict always contains the candidate, and a clean result
        // means no timed event contains it.
        #[test]
        fn test_conflict_iff_candidate_in_some_span(
            periods in prop::collection::vec((0..1440i64, 0..240i64), 0..8),
            candidate_offset in 0..1680i64,
        ) {
            let events = busy_events(&periods);
            let candidate = base() + Duration::minutes(candidate_offset);

            let expected = events.iter().any(|e| match e.span() {
                Some((start, end)) => start <= candidate && candidate <= end,
                None => false,
            });

            match find_conflict(&events, candidate) {
                Some(found) => {
                    let (start, end) = found.span().expect("timed event");
                    prop_assert!(start <= candidate && candidate <= end);
                    prop_assert!(expected);
                }
                None => prop_assert!(!expected),
            }
        }

        // The scheduler creates an event exactly when the start is free.
        #[test]
        fn test_scheduler_creates_only_in_free_slots(
            periods in prop::collection::vec((0..1440i64, 1..240i64), 0..6),
            candidate_offset in 0..1440i64,
            duration in 15..120i64,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime");
            let events = busy_events(&periods);
            let start = base() + Duration::minutes(candidate_offset);
            let taken = find_conflict(&events, start).is_some();

            let service = MockCalendarService::with_events(events);
            let request = MeetingRequest::new(start, start + Duration::minutes(duration));
            let result = runtime.block_on(schedule_meeting(&service, "primary", &request, &settings()));

            if taken {
                prop_assert_eq!(result, Ok(MeetingOutcome::NotCreated(SchedulingError::Conflict)));
                prop_assert!(service.created().is_empty());
            } else {
                prop_assert!(matches!(result, Ok(MeetingOutcome::Created { .. })), "expected Created, got {:?}", result);
                prop_assert_eq!(service.created().len(), 1);
            }
        }
    }
}
