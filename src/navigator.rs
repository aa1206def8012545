//! Navigation state machine: target tracking, detection matching, actuator
//! sequencing and duplicate suppression.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

use crate::commands::{CommandDispatcher, DispatchError};
use crate::events::NavEvent;
use crate::location::{Level, LocationCode, LocationError};

/// Payload printed on the last QR label of the rail.
pub const END_OF_COURSE: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    EnRoute,
    Arrived,
    Stopped,
}

/// Snapshot of the navigator for cross-thread readers.
#[derive(Debug, Clone)]
pub struct NavStatus {
    pub phase: Phase,
    pub target: Option<LocationCode>,
    pub last_seen: Option<String>,
}

impl Default for NavStatus {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            target: None,
            last_seen: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SelectError {
    #[error(transparent)]
    InvalidFormat(#[from] LocationError),
    #[error("failed to start traversal: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Single owner of the navigation state.
///
/// Lives on the control-loop worker; every mutation goes through [`select`]
/// or [`observe`], and a snapshot is mirrored behind an `RwLock` for readers
/// on other tasks.
///
/// [`select`]: Navigator::select
/// [`observe`]: Navigator::observe
pub struct Navigator {
    dispatcher: Arc<dyn CommandDispatcher>,
    phase: Phase,
    target: Option<LocationCode>,
    last_seen: Option<String>,
    settle: Duration,
    events: broadcast::Sender<NavEvent>,
    status: Arc<RwLock<NavStatus>>,
}

impl Navigator {
    pub fn new(
        dispatcher: Arc<dyn CommandDispatcher>,
        settle: Duration,
        events: broadcast::Sender<NavEvent>,
    ) -> Self {
        Self {
            dispatcher,
            phase: Phase::Idle,
            target: None,
            last_seen: None,
            settle,
            events,
            status: Arc::new(RwLock::new(NavStatus::default())),
        }
    }

    /// Shared snapshot handle for display/readers on other tasks.
    pub fn status_handle(&self) -> Arc<RwLock<NavStatus>> {
        self.status.clone()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> Option<&LocationCode> {
        self.target.as_ref()
    }

    /// Commands a new target slot. Valid from any phase: a selection while
    /// en route re-targets the trip.
    ///
    /// A parse failure leaves the current state untouched. A traversal
    /// dispatch failure leaves the navigator `Idle` with no target, so there
    /// is never a target without a moving robot.
    pub async fn select(&mut self, input: &str) -> Result<(), SelectError> {
        let target: LocationCode = match input.parse() {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("rejected target '{}': {}", input, e);
                self.emit(NavEvent::InvalidTarget {
                    input: input.to_string(),
                });
                return Err(SelectError::InvalidFormat(e));
            }
        };

        match self.dispatcher.set_traversal(true).await {
            Ok(()) => {
                tracing::info!("traversal started toward {}", target);
                self.target = Some(target.clone());
                self.last_seen = None;
                self.phase = Phase::EnRoute;
                self.emit(NavEvent::TargetAccepted { target });
                self.sync_status().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("failed to start traversal: {}", e);
                self.target = None;
                self.last_seen = None;
                self.phase = Phase::Idle;
                self.sync_status().await;
                Err(SelectError::Dispatch(e))
            }
        }
    }

    /// Reacts to one decoded code value. Only meaningful while en route;
    /// repeated reads of the same value are suppressed so a static label in
    /// view of the camera triggers exactly one action per visit.
    pub async fn observe(&mut self, text: &str) {
        if self.phase != Phase::EnRoute {
            return;
        }
        if self.last_seen.as_deref() == Some(text) {
            return;
        }
        self.last_seen = Some(text.to_string());
        self.emit(NavEvent::CodeDetected {
            text: text.to_string(),
        });

        if text == END_OF_COURSE {
            self.finish_course().await;
        } else if self.target.as_ref().map(|t| t.row.as_str()) == Some(text) {
            self.arrive().await;
        } else {
            tracing::info!("code '{}' is not the target, continuing", text);
            self.emit(NavEvent::LocationUnreachable {
                seen: text.to_string(),
            });
        }
        self.sync_status().await;
    }

    /// Clears duplicate suppression so the first read after a reconnect is
    /// processed even if it equals the last read before the drop.
    pub async fn reset_dedup(&mut self) {
        self.last_seen = None;
        self.sync_status().await;
    }

    async fn finish_course(&mut self) {
        if let Err(e) = self.dispatcher.set_traversal(false).await {
            tracing::error!("failed to stop traversal: {}", e);
        }
        self.phase = Phase::Stopped;
        tracing::info!("end-of-course code read, traversal stopped");
        self.emit(NavEvent::CourseFinished);
    }

    async fn arrive(&mut self) {
        // target is Some here: phase is EnRoute and the row just matched
        let target = match self.target.clone() {
            Some(target) => target,
            None => return,
        };

        let raise = match &target.level {
            Level::Raise => true,
            Level::Lower => false,
            Level::Unsupported(level) => {
                tracing::warn!("level '{}' is outside the lift's range", level);
                self.emit(NavEvent::HeightUnreachable { target });
                return;
            }
        };

        // Ordering contract: the lift request completes (or fails) and the
        // mechanism settles before the arrival signal goes out. The lift
        // outcome itself is best-effort.
        if let Err(e) = self.dispatcher.set_lift(raise).await {
            tracing::error!("failed to drive lift: {}", e);
        }
        tokio::time::sleep(self.settle).await;
        if let Err(e) = self.dispatcher.signal_arrival().await {
            tracing::error!("failed to signal arrival: {}", e);
        }

        self.phase = Phase::Arrived;
        tracing::info!("location {} confirmed", target);
        self.emit(NavEvent::LocationConfirmed { target });
    }

    fn emit(&self, event: NavEvent) {
        // no subscribers is fine; the core does not depend on a surface
        let _ = self.events.send(event);
    }

    async fn sync_status(&self) {
        let mut status = self.status.write().await;
        status.phase = self.phase;
        status.target = self.target.clone();
        status.last_seen = self.last_seen.clone();
    }
}
