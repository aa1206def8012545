// State-machine properties driven through a recording mock dispatcher.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

use farmabot::commands::{CommandDispatcher, DispatchError};
use farmabot::events::NavEvent;
use farmabot::location::{Level, LocationCode};
use farmabot::navigator::{Navigator, Phase};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Traversal(bool),
    Lift(bool),
    Arrival,
}

#[derive(Default)]
struct MockDispatcher {
    calls: Mutex<Vec<Call>>,
    fail_traversal: bool,
    fail_stop: bool,
    fail_lift: bool,
    fail_arrival: bool,
}

impl MockDispatcher {
    fn recording() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandDispatcher for MockDispatcher {
    async fn set_traversal(&self, active: bool) -> Result<(), DispatchError> {
        self.calls.lock().unwrap().push(Call::Traversal(active));
        if (active && self.fail_traversal) || (!active && self.fail_stop) {
            return Err(DispatchError::BadStatus(500));
        }
        Ok(())
    }

    async fn set_lift(&self, raise: bool) -> Result<(), DispatchError> {
        self.calls.lock().unwrap().push(Call::Lift(raise));
        if self.fail_lift {
            return Err(DispatchError::BadStatus(500));
        }
        Ok(())
    }

    async fn signal_arrival(&self) -> Result<(), DispatchError> {
        self.calls.lock().unwrap().push(Call::Arrival);
        if self.fail_arrival {
            return Err(DispatchError::BadStatus(500));
        }
        Ok(())
    }
}

fn navigator_with(dispatcher: Arc<MockDispatcher>) -> (Navigator, broadcast::Receiver<NavEvent>) {
    let (events_tx, events_rx) = broadcast::channel(64);
    let navigator = Navigator::new(dispatcher, Duration::ZERO, events_tx);
    (navigator, events_rx)
}

fn drain(rx: &mut broadcast::Receiver<NavEvent>) -> Vec<NavEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn select_starts_traversal_and_enters_en_route() {
    let dispatcher = MockDispatcher::recording();
    let (mut navigator, mut events) = navigator_with(dispatcher.clone());

    navigator.select("A-01").await.unwrap();

    assert_eq!(navigator.phase(), Phase::EnRoute);
    assert_eq!(
        navigator.target(),
        Some(&LocationCode {
            row: "A".to_string(),
            level: Level::Lower,
        })
    );
    assert_eq!(dispatcher.calls(), vec![Call::Traversal(true)]);
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, NavEvent::TargetAccepted { .. })));
}

#[tokio::test]
async fn invalid_target_leaves_state_unchanged() {
    let dispatcher = MockDispatcher::recording();
    let (mut navigator, mut events) = navigator_with(dispatcher.clone());

    navigator.select("A-02").await.unwrap();
    assert_eq!(navigator.phase(), Phase::EnRoute);
    drain(&mut events);

    for bad in ["A02", "", "-01", "A-"] {
        assert!(navigator.select(bad).await.is_err());
        assert_eq!(navigator.phase(), Phase::EnRoute, "phase changed for {:?}", bad);
        assert!(navigator.target().is_some());
    }
    // only the one successful traversal start was dispatched
    assert_eq!(dispatcher.calls(), vec![Call::Traversal(true)]);
    assert!(drain(&mut events)
        .iter()
        .all(|e| matches!(e, NavEvent::InvalidTarget { .. })));
}

#[tokio::test]
async fn traversal_failure_leaves_idle_with_no_target() {
    let dispatcher = Arc::new(MockDispatcher {
        fail_traversal: true,
        ..Default::default()
    });
    let (mut navigator, _events) = navigator_with(dispatcher.clone());

    assert!(navigator.select("A-01").await.is_err());
    assert_eq!(navigator.phase(), Phase::Idle);
    assert!(navigator.target().is_none());
}

#[tokio::test]
async fn matching_row_lifts_then_signals_then_arrives() {
    let dispatcher = MockDispatcher::recording();
    let (mut navigator, mut events) = navigator_with(dispatcher.clone());

    navigator.select("A-02").await.unwrap();
    navigator.observe("A").await;

    assert_eq!(navigator.phase(), Phase::Arrived);
    assert_eq!(
        dispatcher.calls(),
        vec![Call::Traversal(true), Call::Lift(true), Call::Arrival]
    );
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, NavEvent::LocationConfirmed { .. })));
}

#[tokio::test(start_paused = true)]
async fn settle_interval_sits_between_lift_and_arrival_signal() {
    let dispatcher = MockDispatcher::recording();
    let (events_tx, _events_rx) = broadcast::channel(64);
    let mut navigator = Navigator::new(dispatcher.clone(), Duration::from_millis(500), events_tx);

    navigator.select("B-01").await.unwrap();
    let before = tokio::time::Instant::now();
    navigator.observe("B").await;

    assert!(before.elapsed() >= Duration::from_millis(500));
    assert_eq!(
        dispatcher.calls(),
        vec![Call::Traversal(true), Call::Lift(false), Call::Arrival]
    );
    assert_eq!(navigator.phase(), Phase::Arrived);
}

#[tokio::test]
async fn duplicate_reads_trigger_one_command_sequence() {
    let dispatcher = MockDispatcher::recording();
    let (mut navigator, _events) = navigator_with(dispatcher.clone());

    navigator.select("A-02").await.unwrap();
    navigator.observe("A").await;
    navigator.observe("A").await;

    assert_eq!(
        dispatcher.calls(),
        vec![Call::Traversal(true), Call::Lift(true), Call::Arrival]
    );
}

#[tokio::test]
async fn end_of_course_stops_traversal_for_any_target() {
    let dispatcher = MockDispatcher::recording();
    let (mut navigator, mut events) = navigator_with(dispatcher.clone());

    navigator.select("Z-02").await.unwrap();
    navigator.observe("0").await;

    assert_eq!(navigator.phase(), Phase::Stopped);
    assert_eq!(
        dispatcher.calls(),
        vec![Call::Traversal(true), Call::Traversal(false)]
    );
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, NavEvent::CourseFinished)));
}

#[tokio::test]
async fn end_of_course_stop_failure_still_finishes_the_course() {
    let dispatcher = Arc::new(MockDispatcher {
        fail_stop: true,
        ..Default::default()
    });
    let (mut navigator, mut events) = navigator_with(dispatcher.clone());

    navigator.select("A-01").await.unwrap();
    navigator.observe("0").await;

    // the stop request failed, yet the course is finished either way
    assert_eq!(navigator.phase(), Phase::Stopped);
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, NavEvent::CourseFinished)));
}

#[tokio::test]
async fn non_matching_code_is_an_informational_no_op() {
    let dispatcher = MockDispatcher::recording();
    let (mut navigator, mut events) = navigator_with(dispatcher.clone());

    navigator.select("A-01").await.unwrap();
    drain(&mut events);
    navigator.observe("B").await;

    assert_eq!(navigator.phase(), Phase::EnRoute);
    assert_eq!(dispatcher.calls(), vec![Call::Traversal(true)]);
    let events = drain(&mut events);
    assert!(events
        .iter()
        .any(|e| matches!(e, NavEvent::LocationUnreachable { seen } if seen == "B")));
}

#[tokio::test]
async fn unsupported_level_reports_and_stays_en_route() {
    let dispatcher = MockDispatcher::recording();
    let (mut navigator, mut events) = navigator_with(dispatcher.clone());

    navigator.select("A-03").await.unwrap();
    drain(&mut events);
    navigator.observe("A").await;

    assert_eq!(navigator.phase(), Phase::EnRoute);
    // no lift and no arrival signal for a slot the lift cannot serve
    assert_eq!(dispatcher.calls(), vec![Call::Traversal(true)]);
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, NavEvent::HeightUnreachable { .. })));
}

#[tokio::test]
async fn lift_failure_does_not_skip_the_arrival_signal() {
    let dispatcher = Arc::new(MockDispatcher {
        fail_lift: true,
        ..Default::default()
    });
    let (mut navigator, _events) = navigator_with(dispatcher.clone());

    navigator.select("A-02").await.unwrap();
    navigator.observe("A").await;

    assert_eq!(
        dispatcher.calls(),
        vec![Call::Traversal(true), Call::Lift(true), Call::Arrival]
    );
    assert_eq!(navigator.phase(), Phase::Arrived);
}

#[tokio::test]
async fn dedup_reset_allows_reprocessing_after_reconnect() {
    let dispatcher = MockDispatcher::recording();
    let (mut navigator, mut events) = navigator_with(dispatcher.clone());

    navigator.select("A-01").await.unwrap();
    drain(&mut events);

    navigator.observe("B").await;
    navigator.observe("B").await; // suppressed
    navigator.reset_dedup().await;
    navigator.observe("B").await; // processed again

    let unreachable = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, NavEvent::LocationUnreachable { .. }))
        .count();
    assert_eq!(unreachable, 2);
}

#[tokio::test]
async fn detections_outside_en_route_are_ignored() {
    let dispatcher = MockDispatcher::recording();
    let (mut navigator, _events) = navigator_with(dispatcher.clone());

    // Idle: nothing commanded yet
    navigator.observe("A").await;
    assert_eq!(navigator.phase(), Phase::Idle);
    assert!(dispatcher.calls().is_empty());

    // Arrived: later reads of other labels change nothing
    navigator.select("A-01").await.unwrap();
    navigator.observe("A").await;
    assert_eq!(navigator.phase(), Phase::Arrived);
    let settled = dispatcher.calls();
    navigator.observe("B").await;
    assert_eq!(navigator.phase(), Phase::Arrived);
    assert_eq!(dispatcher.calls(), settled);
}

#[tokio::test]
async fn reselect_after_arrival_starts_a_new_trip() {
    let dispatcher = MockDispatcher::recording();
    let (mut navigator, _events) = navigator_with(dispatcher.clone());

    navigator.select("A-01").await.unwrap();
    navigator.observe("A").await;
    assert_eq!(navigator.phase(), Phase::Arrived);

    navigator.select("B-02").await.unwrap();
    assert_eq!(navigator.phase(), Phase::EnRoute);
    // the previous trip's dedup value must not suppress the new target row
    navigator.observe("B").await;
    assert_eq!(navigator.phase(), Phase::Arrived);
}
