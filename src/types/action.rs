//! Inputs to the validator and the deferred work it asks for

use std::time::Duration;
use crate::types::{FaceGeometry, FaceQuality, FaceSmile, Observation, Rect, TimerId};

/// Everything that can change a validation state
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Recentre the layout guide inside a new viewport
    ViewportResized(Rect),
    /// Detector saw no face at all
    NoFaceDetected,
    GeometryObserved(Observation<FaceGeometry>),
    QualityObserved(Observation<FaceQuality>),
    SmileObserved(Observation<FaceSmile>),
    ToggleDebug,
    /// A grace-period timer fired
    GracePeriodElapsed(TimerId),
}

impl Action {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Action::ViewportResized(_) => "viewport_resized",
            Action::NoFaceDetected => "no_face",
            Action::GeometryObserved(_) => "geometry",
            Action::QualityObserved(_) => "quality",
            Action::SmileObserved(_) => "smile",
            Action::ToggleDebug => "toggle_debug",
            Action::GracePeriodElapsed(_) => "grace_elapsed",
        }
    }

    /// Detector failure carried by this action, with the axis it hit
    pub fn detection_error(&self) -> Option<(&'static str, &str)> {
        match self {
            Action::GeometryObserved(obs) => obs.error().map(|e| ("geometry", e)),
            Action::QualityObserved(obs) => obs.error().map(|e| ("quality", e)),
            Action::SmileObserved(obs) => obs.error().map(|e| ("smile", e)),
            _ => None,
        }
    }
}

/// Side effects a transition asks the dispatcher to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Schedule a single-shot `GracePeriodElapsed(id)` after `after`
    StartGraceTimer { id: TimerId, after: Duration },
    /// Drop the pending timer with this id
    CancelGraceTimer { id: TimerId },
    /// Success just turned on
    ShutterReleased,
}
