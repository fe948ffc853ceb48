mod mocks;

use chrono::{Duration, TimeZone, Utc};
use mocks::{attendee, orchestrator, person, timed_event, MockCalendar, MockContacts, MockSms};
use sms_reminder::components::google_calendar::{OrderBy, SendUpdates};
use sms_reminder::components::reminder::{MarkerCodec, RunState};
use std::collections::HashSet;
use std::sync::Arc;

const MARIO: &str = "mario@example.com";
const LUCIA: &str = "lucia@example.com";
const CHIEF: &str = "chief@example.com";

fn contacts() -> Arc<MockContacts> {
    Arc::new(MockContacts {
        people: vec![
            person(MARIO, "333 123 4567"),
            person(LUCIA, "+39 347 000 1111"),
            person(CHIEF, "+39 320 999 8888"),
        ],
        fail: false,
    })
}

#[tokio::test]
async fn service_shift_reminds_attendees_but_not_organizer() {
    let calendar = Arc::new(MockCalendar::with_events(vec![timed_event(
        "evt1",
        "Servizio Notturno",
        None,
        "2024-03-15T20:00:00+01:00",
        vec![attendee(CHIEF, true), attendee(MARIO, false)],
    )]));
    let sms = Arc::new(MockSms::default());

    let summary = orchestrator(calendar.clone(), contacts(), sms.clone())
        .run()
        .await;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(
        sms.attempts(),
        vec![(
            "+393331234567".to_string(),
            "Ricordati dell'evento 'Servizio Notturno' il 15/03/2024 alle 20:00.".to_string()
        )]
    );
    assert_eq!(
        calendar.event("evt1").description.as_deref(),
        Some("REMINDED")
    );
    assert_eq!(
        *calendar.updates.lock().unwrap(),
        vec![("evt1".to_string(), SendUpdates::None)]
    );
    assert_eq!(summary.events_reminded, 1);
    assert_eq!(summary.messages_sent, 1);
}

#[tokio::test]
async fn unrelated_event_is_left_alone() {
    let lunch = timed_event(
        "evt1",
        "Lunch",
        Some("Pizzeria"),
        "2024-03-15T12:30:00+01:00",
        vec![attendee(MARIO, false)],
    );
    let calendar = Arc::new(MockCalendar::with_events(vec![lunch.clone()]));
    let sms = Arc::new(MockSms::default());

    let summary = orchestrator(calendar.clone(), contacts(), sms.clone())
        .run()
        .await;

    assert!(sms.attempts().is_empty());
    assert_eq!(calendar.update_count(), 0);
    assert_eq!(calendar.event("evt1"), lunch);
    assert_eq!(summary.events_skipped, 1);
}

#[tokio::test]
async fn existing_description_is_kept_after_marker() {
    let calendar = Arc::new(MockCalendar::with_events(vec![timed_event(
        "evt1",
        "Riunione di reparto",
        Some("Porta la divisa"),
        "2024-03-16T09:00:00+01:00",
        vec![attendee(LUCIA, false)],
    )]));
    let sms = Arc::new(MockSms::default());

    orchestrator(calendar.clone(), contacts(), sms.clone())
        .run()
        .await;

    assert_eq!(sms.attempts().len(), 1);
    assert_eq!(sms.attempts()[0].0, "+393470001111");
    assert_eq!(
        calendar.event("evt1").description.as_deref(),
        Some("REMINDED | Porta la divisa")
    );
}

#[tokio::test]
async fn sentinel_event_is_reminded_even_when_marked() {
    let calendar = Arc::new(MockCalendar::with_events(vec![timed_event(
        "evt1",
        "TESTSMS",
        Some("REMINDED"),
        "2024-03-15T18:00:00+01:00",
        vec![attendee(MARIO, false)],
    )]));
    let sms = Arc::new(MockSms::default());

    orchestrator(calendar.clone(), contacts(), sms.clone())
        .run()
        .await;

    assert_eq!(sms.attempts().len(), 1);
    assert_eq!(
        calendar.event("evt1").description.as_deref(),
        Some("REMINDED | REMINDED")
    );
}

#[tokio::test]
async fn gateway_failure_does_not_stop_other_attendees() {
    let calendar = Arc::new(MockCalendar::with_events(vec![timed_event(
        "evt1",
        "ASSEMBLEA generale",
        None,
        "2024-03-15T21:00:00+01:00",
        vec![attendee(MARIO, false), attendee(LUCIA, false)],
    )]));
    let sms = Arc::new(MockSms {
        failing_phones: HashSet::from(["+393331234567".to_string()]),
        ..Default::default()
    });

    let summary = orchestrator(calendar.clone(), contacts(), sms.clone())
        .run()
        .await;

    let phones: Vec<String> = sms.attempts().into_iter().map(|(phone, _)| phone).collect();
    assert_eq!(phones, vec!["+393331234567", "+393470001111"]);
    assert_eq!(summary.messages_failed, 1);
    assert_eq!(summary.messages_sent, 1);
    assert_eq!(
        calendar.event("evt1").description.as_deref(),
        Some("REMINDED")
    );
}

// An attendee missing from the directory ends the attendee loop for that event.
#[tokio::test]
async fn unknown_attendee_stops_remaining_attendees_of_event() {
    let calendar = Arc::new(MockCalendar::with_events(vec![timed_event(
        "evt1",
        "Manovra notturna",
        None,
        "2024-03-15T22:00:00+01:00",
        vec![
            attendee(MARIO, false),
            attendee("stranger@example.com", false),
            attendee(LUCIA, false),
        ],
    )]));
    let sms = Arc::new(MockSms::default());

    let summary = orchestrator(calendar.clone(), contacts(), sms.clone())
        .run()
        .await;

    let phones: Vec<String> = sms.attempts().into_iter().map(|(phone, _)| phone).collect();
    assert_eq!(phones, vec!["+393331234567"]);
    assert_eq!(summary.messages_sent, 1);
    assert_eq!(summary.unknown_contacts, 1);
    assert_eq!(
        calendar.event("evt1").description.as_deref(),
        Some("REMINDED")
    );
}

#[tokio::test]
async fn second_run_sends_nothing() {
    let calendar = Arc::new(MockCalendar::with_events(vec![
        timed_event(
            "evt1",
            "Servizio Festivo",
            None,
            "2024-03-17T08:00:00+01:00",
            vec![attendee(MARIO, false)],
        ),
        timed_event(
            "evt2",
            "Reperibilità weekend",
            Some("Turno B"),
            "2024-03-17T10:00:00+01:00",
            vec![attendee(LUCIA, false)],
        ),
    ]));
    let sms = Arc::new(MockSms::default());
    let orchestrator = orchestrator(calendar.clone(), contacts(), sms.clone());

    let first = orchestrator.run().await;
    let second = orchestrator.run().await;

    assert_eq!(first.messages_sent, 2);
    assert_eq!(second.messages_sent, 0);
    assert_eq!(second.events_skipped, 2);
    assert_eq!(sms.attempts().len(), 2);
    assert_eq!(calendar.update_count(), 2);
}

#[tokio::test]
async fn contacts_failure_ends_run_before_events() {
    let calendar = Arc::new(MockCalendar::default());
    let sms = Arc::new(MockSms::default());
    let failing_contacts = Arc::new(MockContacts {
        fail: true,
        ..Default::default()
    });

    let summary = orchestrator(calendar.clone(), failing_contacts, sms.clone())
        .run()
        .await;

    assert_eq!(summary.state, RunState::Error);
    assert!(summary.error.is_some());
    assert!(calendar.queries.lock().unwrap().is_empty());
    assert!(sms.attempts().is_empty());
}

#[tokio::test]
async fn calendar_failure_ends_run_without_sending() {
    let calendar = Arc::new(MockCalendar {
        fail_list: true,
        ..Default::default()
    });
    let sms = Arc::new(MockSms::default());

    let summary = orchestrator(calendar.clone(), contacts(), sms.clone())
        .run()
        .await;

    assert_eq!(summary.state, RunState::Error);
    assert!(sms.attempts().is_empty());
    assert_eq!(calendar.update_count(), 0);
}

#[tokio::test]
async fn empty_window_completes() {
    let calendar = Arc::new(MockCalendar::default());
    let sms = Arc::new(MockSms::default());

    let summary = orchestrator(calendar.clone(), contacts(), sms.clone())
        .run()
        .await;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.events_seen, 0);
    assert!(sms.attempts().is_empty());
    assert_eq!(calendar.update_count(), 0);
}

#[tokio::test]
async fn events_are_queried_for_next_24_hours() {
    let calendar = Arc::new(MockCalendar::default());
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 7, 0, 0).unwrap();

    orchestrator(calendar.clone(), contacts(), Arc::new(MockSms::default()))
        .run_at(now)
        .await;

    let queries = calendar.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    let (calendar_id, query) = &queries[0];
    assert_eq!(calendar_id, "primary");
    assert_eq!(query.time_min, now);
    assert_eq!(query.time_max, now + Duration::hours(24));
    assert!(query.single_events);
    assert_eq!(query.order_by, OrderBy::StartTime);
}

#[tokio::test]
async fn all_day_event_is_not_marked() {
    let mut all_day = timed_event(
        "evt1",
        "Assemblea annuale",
        None,
        "2024-03-16T00:00:00+01:00",
        vec![attendee(MARIO, false)],
    );
    all_day.start.date_time = None;
    all_day.start.date = Some("2024-03-16".to_string());
    let calendar = Arc::new(MockCalendar::with_events(vec![all_day]));
    let sms = Arc::new(MockSms::default());

    let summary = orchestrator(calendar.clone(), contacts(), sms.clone())
        .run()
        .await;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.events_unformattable, 1);
    assert!(sms.attempts().is_empty());
    assert_eq!(calendar.update_count(), 0);
}

#[tokio::test]
async fn failed_update_does_not_stop_later_events() {
    let calendar = Arc::new(MockCalendar {
        fail_updates: HashSet::from(["evt1".to_string()]),
        ..MockCalendar::with_events(vec![
            timed_event(
                "evt1",
                "Servizio Sabato",
                None,
                "2024-03-16T08:00:00+01:00",
                vec![attendee(MARIO, false)],
            ),
            timed_event(
                "evt2",
                "Servizio Notturno",
                None,
                "2024-03-16T20:00:00+01:00",
                vec![attendee(LUCIA, false)],
            ),
        ])
    });
    let sms = Arc::new(MockSms::default());

    let summary = orchestrator(calendar.clone(), contacts(), sms.clone())
        .run()
        .await;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.marker_failures, 1);
    assert_eq!(sms.attempts().len(), 2);
    assert_eq!(calendar.event("evt1").description, None);
    assert_eq!(
        calendar.event("evt2").description.as_deref(),
        Some("REMINDED")
    );
}

/// Flag kept at the end of the description
struct SuffixMarker;

impl MarkerCodec for SuffixMarker {
    fn is_marked(&self, description: Option<&str>) -> bool {
        description.is_some_and(|d| d.ends_with("[sms-sent]"))
    }

    fn apply_marker(&self, description: Option<&str>) -> String {
        match description {
            Some(previous) => format!("{} [sms-sent]", previous),
            None => "[sms-sent]".to_string(),
        }
    }
}

#[tokio::test]
async fn custom_marker_drives_detection_and_write_back() {
    let calendar = Arc::new(MockCalendar::with_events(vec![
        timed_event(
            "evt1",
            "Servizio Notturno",
            Some("Turno A [sms-sent]"),
            "2024-03-15T20:00:00+01:00",
            vec![attendee(MARIO, false)],
        ),
        timed_event(
            "evt2",
            "Riunione",
            Some("REMINDED"),
            "2024-03-15T21:00:00+01:00",
            vec![attendee(LUCIA, false)],
        ),
    ]));
    let sms = Arc::new(MockSms::default());

    let summary = orchestrator(calendar.clone(), contacts(), sms.clone())
        .with_marker(Arc::new(SuffixMarker))
        .run()
        .await;

    assert_eq!(summary.events_skipped, 1);
    assert_eq!(summary.events_reminded, 1);
    let phones: Vec<String> = sms.attempts().into_iter().map(|(phone, _)| phone).collect();
    assert_eq!(phones, vec!["+393470001111"]);
    assert_eq!(
        calendar.event("evt1").description.as_deref(),
        Some("Turno A [sms-sent]")
    );
    assert_eq!(
        calendar.event("evt2").description.as_deref(),
        Some("REMINDED [sms-sent]")
    );
}
