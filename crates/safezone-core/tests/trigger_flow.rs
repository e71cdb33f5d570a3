//! End-to-end tests of the trigger cycle driven by simulated ticks.
//!
//! | Path                        | Send | Countdown | Call |
//! |-----------------------------|------|-----------|------|
//! | no contact / no location    | no   | no        | no   |
//! | transport unavailable       | no   | no        | no   |
//! | happy path                  | yes  | 10 -> 0   | once |
//! | cancelled at N > 0          | yes  | stopped   | no   |
//! | call unsupported            | yes  | 10 -> 0   | no   |

use safezone_core::detector::bridge;
use safezone_core::testing::Harness;
use safezone_core::{DetectorEvent, Event, PreconditionKind, TriggerError, TriggerPhase};

const CONTACT: &str = "+15551234567";
const EXPECTED_BODY: &str =
    "🚨 Emergency! My current location is: https://maps.google.com/?q=37.7749,-122.4194";

// ============================================================================
// Preconditions
// ============================================================================

#[tokio::test]
async fn test_no_contact_fails_without_side_effects() {
    let h = Harness::new();
    let mut controller = h.ready_controller().await;

    let err = controller.trigger().await.unwrap_err();

    assert_eq!(
        err,
        TriggerError::Precondition(PreconditionKind::MissingContact)
    );
    assert!(!controller.countdown().is_active());
    assert_eq!(controller.countdown().remaining_units(), 0);
    assert!(h.alerts.sent().is_empty());
    assert!(h.dialer.opened().is_empty());
}

#[tokio::test]
async fn test_no_location_fails_without_send() {
    let h = Harness::new().with_contact(CONTACT).await;
    h.location.set_coordinate(None);
    let mut controller = h.controller();
    assert!(controller.acquire_location().await.is_err());

    let err = controller.trigger().await.unwrap_err();

    assert_eq!(
        err,
        TriggerError::Precondition(PreconditionKind::MissingLocation)
    );
    assert_eq!(h.alerts.availability_checks(), 0);
    assert!(h.alerts.sent().is_empty());
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_scenario_send_body_and_countdown_start() {
    let h = Harness::new().with_contact(CONTACT).await;
    let mut controller = h.ready_controller().await;

    let events = controller.trigger().await.unwrap();

    assert_eq!(
        h.alerts.sent(),
        vec![(vec![CONTACT.to_string()], EXPECTED_BODY.to_string())]
    );
    assert!(controller.countdown().is_active());
    assert_eq!(controller.countdown().remaining_units(), 10);
    assert_eq!(controller.phase(), TriggerPhase::Counting);
    match events.as_slice() {
        [Event::AlertSent { body, .. }, Event::CountdownStarted { units, .. }] => {
            assert_eq!(body, EXPECTED_BODY);
            assert_eq!(*units, 10);
        }
        other => panic!("unexpected events: {other:?}"),
    }
    assert_eq!(h.notifier.titles(), vec!["Emergency Triggered"]);
    assert_eq!(
        h.notifier.notices()[0].body,
        "Location shared. Call will be made in 10 seconds."
    );
}

#[tokio::test]
async fn test_ten_ticks_escalate_exactly_once() {
    let h = Harness::new().with_contact(CONTACT).await;
    let mut controller = h.ready_controller().await;
    controller.trigger().await.unwrap();

    for remaining in (1..10).rev() {
        let event = controller.tick().await;
        assert!(matches!(
            event,
            Some(Event::CountdownTicked { remaining_units, .. }) if remaining_units == remaining
        ));
        assert!(h.dialer.opened().is_empty());
    }

    let last = controller.tick().await;
    assert!(matches!(last, Some(Event::EscalationStarted { ref uri, .. }) if uri == "tel:+15551234567"));
    assert!(!controller.countdown().is_active());
    assert_eq!(controller.phase(), TriggerPhase::Idle);
    assert_eq!(h.dialer.opened(), vec!["tel:+15551234567".to_string()]);

    // Stray ticks after the cycle are no-ops.
    for _ in 0..3 {
        assert!(controller.tick().await.is_none());
    }
    assert_eq!(h.dialer.opened().len(), 1);
}

#[tokio::test]
async fn test_new_cycle_after_escalation() {
    let h = Harness::new().with_contact(CONTACT).await;
    let mut controller = h.ready_controller().await;

    for _ in 0..2 {
        controller.trigger().await.unwrap();
        for _ in 0..10 {
            controller.tick().await;
        }
    }

    assert_eq!(h.alerts.sent().len(), 2);
    assert_eq!(h.dialer.opened().len(), 2);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_at_every_remaining_count_prevents_call() {
    for ticks_before_cancel in 0..10u32 {
        let h = Harness::new().with_contact(CONTACT).await;
        let mut controller = h.ready_controller().await;
        controller.trigger().await.unwrap();

        for _ in 0..ticks_before_cancel {
            controller.tick().await;
        }
        let cancelled = controller.cancel();

        assert!(matches!(
            cancelled,
            Some(Event::CountdownCancelled { remaining_units, .. })
                if remaining_units == 10 - ticks_before_cancel
        ));
        assert!(!controller.countdown().is_active());

        for _ in 0..20 {
            assert!(controller.tick().await.is_none());
        }
        assert!(h.dialer.opened().is_empty());
    }
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let h = Harness::new().with_contact(CONTACT).await;
    let mut controller = h.ready_controller().await;
    controller.trigger().await.unwrap();

    assert!(controller.cancel().is_some());
    assert!(controller.cancel().is_none());
    assert!(controller.cancel().is_none());
    assert_eq!(controller.phase(), TriggerPhase::Idle);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_transport_unavailable_keeps_countdown_inactive() {
    let h = Harness::new().with_contact(CONTACT).await;
    h.alerts.set_available(false);
    let mut controller = h.ready_controller().await;

    let err = controller.trigger().await.unwrap_err();

    assert_eq!(err, TriggerError::ChannelUnavailable);
    assert!(!controller.countdown().is_active());
    assert_eq!(h.notifier.titles(), vec!["SMS Not Available"]);
}

#[tokio::test]
async fn test_unsupported_call_ends_cycle_without_retry() {
    let h = Harness::new().with_contact(CONTACT).await;
    h.dialer.set_supported(false);
    let mut controller = h.ready_controller().await;
    controller.trigger().await.unwrap();

    for _ in 0..9 {
        controller.tick().await;
    }
    let last = controller.tick().await;

    assert!(matches!(
        last,
        Some(Event::EscalationFailed { ref reason, .. }) if reason.contains("tel:+15551234567")
    ));
    assert!(!controller.countdown().is_active());
    assert_eq!(controller.phase(), TriggerPhase::Idle);
    assert!(controller.tick().await.is_none());
    assert!(h.dialer.opened().is_empty());
    assert_eq!(
        h.notifier.notices().last().unwrap().body,
        "Calling not supported on this device."
    );
}

#[tokio::test]
async fn test_open_failure_is_reported() {
    let h = Harness::new().with_contact(CONTACT).await;
    h.dialer.fail_opens("no telephony");
    let mut controller = h.ready_controller().await;
    controller.trigger().await.unwrap();

    let mut last = None;
    for _ in 0..10 {
        last = controller.tick().await;
    }

    assert!(matches!(last, Some(Event::EscalationFailed { reason, .. }) if reason.contains("no telephony")));
    assert!(!controller.countdown().is_active());
}

// ============================================================================
// Detector events
// ============================================================================

#[tokio::test]
async fn test_keyword_event_closes_bridge_and_triggers_once() {
    let h = Harness::new().with_contact(CONTACT).await;
    let mut controller = h.ready_controller().await;
    let (sink, mut host) = bridge(8);

    let outcome = controller
        .on_detector_event(DetectorEvent::Transcript("Somebody HELP me".into()), &mut host)
        .await;

    assert!(host.is_closed());
    assert!(sink.is_closed());
    assert!(outcome.trigger_error.is_none());
    assert!(matches!(
        outcome.events.as_slice(),
        [
            Event::DetectorMatched { .. },
            Event::AlertSent { .. },
            Event::CountdownStarted { .. }
        ]
    ));
    assert_eq!(h.alerts.sent().len(), 1);
    assert_eq!(h.notifier.titles()[0], "Voice Detected");
}

#[tokio::test]
async fn test_loud_sound_event_triggers() {
    let h = Harness::new().with_contact(CONTACT).await;
    let mut controller = h.ready_controller().await;
    let (_sink, mut host) = bridge(8);

    let outcome = controller
        .on_detector_event(DetectorEvent::LoudSound, &mut host)
        .await;

    assert!(outcome.trigger_error.is_none());
    assert!(controller.countdown().is_active());
    assert!(host.is_closed());
}

#[tokio::test]
async fn test_non_matching_event_is_ignored() {
    let h = Harness::new().with_contact(CONTACT).await;
    let mut controller = h.ready_controller().await;
    let (_sink, mut host) = bridge(8);

    let outcome = controller
        .on_detector_event(DetectorEvent::Transcript("what a nice day".into()), &mut host)
        .await;

    assert!(matches!(outcome.events.as_slice(), [Event::DetectorIgnored { .. }]));
    assert!(!host.is_closed());
    assert!(!controller.countdown().is_active());
    assert!(h.alerts.sent().is_empty());
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn test_matched_event_with_failed_trigger_still_closes_bridge() {
    let h = Harness::new();
    let mut controller = h.ready_controller().await;
    let (_sink, mut host) = bridge(8);

    let outcome = controller
        .on_detector_event(DetectorEvent::Transcript("emergency".into()), &mut host)
        .await;

    assert_eq!(
        outcome.trigger_error,
        Some(TriggerError::Precondition(PreconditionKind::MissingContact))
    );
    assert!(matches!(outcome.events.as_slice(), [Event::DetectorMatched { .. }]));
    assert!(host.is_closed());
}
