//! Messages published by the navigation worker for any presentation surface.

use crate::location::LocationCode;

/// State-change notification emitted by the navigator and control loop.
///
/// Consumers subscribe through [`crate::robot::Robot::subscribe_events`];
/// the worker never touches display state directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    /// A target was accepted and the traversal started.
    TargetAccepted { target: LocationCode },
    /// A selection could not be parsed as `<row>-<level>`.
    InvalidTarget { input: String },
    /// A new (non-duplicate) code value was read from the camera.
    CodeDetected { text: String },
    /// The end-of-course sentinel was read and the traversal stopped.
    CourseFinished,
    /// The commanded slot's code was confirmed.
    LocationConfirmed { target: LocationCode },
    /// The commanded slot's row was reached but its level has no lift setting.
    HeightUnreachable { target: LocationCode },
    /// A code was read that is not the target and not the sentinel.
    LocationUnreachable { seen: String },
    /// A frame fetch failed; the loop switched to the reconnect cadence.
    Reconnecting,
}

impl NavEvent {
    /// Status-line text for a minimal surface, mirroring what an embedding UI
    /// would render.
    pub fn status_text(&self) -> String {
        match self {
            NavEvent::TargetAccepted { target } => format!("en route to {}", target),
            NavEvent::InvalidTarget { input } => format!("invalid location '{}'", input),
            NavEvent::CodeDetected { text } => format!("code detected: {}", text),
            NavEvent::CourseFinished => "course finished".to_string(),
            NavEvent::LocationConfirmed { target } => format!("location {} confirmed", target),
            NavEvent::HeightUnreachable { target } => {
                format!("height of {} not reachable", target)
            }
            NavEvent::LocationUnreachable { seen } => {
                format!("location {} not reachable from here", seen)
            }
            NavEvent::Reconnecting => "reconnecting to device...".to_string(),
        }
    }
}
