//! Detector observations: a measurement, its absence, or a failure

use serde::{Deserialize, Serialize};
use crate::types::Rect;

/// Tri-state result of one detector measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Observation<T> {
    /// No face in frame. Expected and frequent.
    NotFound,
    /// A measurement was produced
    Found(T),
    /// The detector failed to produce a measurement
    Errored(String),
}

impl<T> Default for Observation<T> {
    fn default() -> Self {
        Observation::NotFound
    }
}

impl<T> Observation<T> {
    /// The measurement, if one was produced
    pub fn found(&self) -> Option<&T> {
        match self {
            Observation::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Failure reason, if the detector errored
    pub fn error(&self) -> Option<&str> {
        match self {
            Observation::Errored(reason) => Some(reason),
            _ => None,
        }
    }

    /// Summary for the user-facing detection status
    pub fn detected_state(&self) -> FaceDetectedState {
        match self {
            Observation::NotFound => FaceDetectedState::NoFaceDetected,
            Observation::Found(_) => FaceDetectedState::FaceDetected,
            Observation::Errored(_) => FaceDetectedState::FaceDetectionErrored,
        }
    }
}

/// Face rectangle and head pose of the primary face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceGeometry {
    /// Face rectangle in preview coordinates
    pub bounding_box: Rect,
    /// Radians, detector convention
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Capture quality score in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceQuality {
    pub quality: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceSmile {
    pub smile_detected: bool,
}

/// What the most recent observation said about the face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaceDetectedState {
    FaceDetected,
    #[default]
    NoFaceDetected,
    FaceDetectionErrored,
}

impl std::fmt::Display for FaceDetectedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FaceDetectedState::FaceDetected => "FACE_DETECTED",
            FaceDetectedState::NoFaceDetected => "NO_FACE_DETECTED",
            FaceDetectedState::FaceDetectionErrored => "FACE_DETECTION_ERRORED",
        };
        write!(f, "{}", name)
    }
}
