//! Guidance codes shown to the user for a given validation state

use serde::{Deserialize, Serialize};
use crate::types::{BoundsState, FaceDetectedState, ValidationState};

/// What the user should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    // =========================================================================
    // Detection status
    // =========================================================================
    /// Detector reported a failure
    DetectionErrored,
    /// No face in frame
    LookAtCamera,

    // =========================================================================
    // Valid face
    // =========================================================================
    /// Capture condition met
    Success,
    /// Grace period over, waiting for a smile
    PleaseSmile,
    /// Face valid, grace period running
    HoldStill,

    // =========================================================================
    // Corrections
    // =========================================================================
    MoveCloser,
    MoveBack,
    CentreFace,
    LookStraight,
    LowQuality,
}

impl Instruction {
    /// Pick the instruction for a state; corrections follow the order
    /// bounds, then pose, then quality
    pub fn for_state(state: &ValidationState) -> Self {
        match state.face_detected_state {
            FaceDetectedState::FaceDetectionErrored => return Self::DetectionErrored,
            FaceDetectedState::NoFaceDetected => return Self::LookAtCamera,
            FaceDetectedState::FaceDetected => {}
        }
        // No geometry since the face was last lost
        if state.bounds_state == BoundsState::Unknown {
            return Self::LookAtCamera;
        }

        if state.has_valid_face() {
            return if state.success {
                Self::Success
            } else if state.smile_permitted {
                Self::PleaseSmile
            } else {
                Self::HoldStill
            };
        }

        match state.bounds_state {
            BoundsState::TooSmall => Self::MoveCloser,
            BoundsState::TooLarge => Self::MoveBack,
            BoundsState::OffCentre => Self::CentreFace,
            _ if !state.acceptable_pose() => Self::LookStraight,
            _ if !state.acceptable_quality => Self::LowQuality,
            _ => Self::LookAtCamera,
        }
    }

    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::DetectionErrored => "DETECTION_ERRORED",
            Self::LookAtCamera => "LOOK_AT_CAMERA",
            Self::Success => "SUCCESS",
            Self::PleaseSmile => "PLEASE_SMILE",
            Self::HoldStill => "HOLD_STILL",
            Self::MoveCloser => "MOVE_CLOSER",
            Self::MoveBack => "MOVE_BACK",
            Self::CentreFace => "CENTRE_FACE",
            Self::LookStraight => "LOOK_STRAIGHT",
            Self::LowQuality => "LOW_QUALITY",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::DetectionErrored => "Face detection failed",
            Self::LookAtCamera => "Please look at the camera",
            Self::Success => "Success!",
            Self::PleaseSmile => "Please smile",
            Self::HoldStill => "Face detected, stay inside the frame...",
            Self::MoveCloser => "Please bring your face closer to the camera",
            Self::MoveBack => "Please hold the camera further from your face",
            Self::CentreFace => "Please centre your face in the frame",
            Self::LookStraight => "Please look straight at the camera",
            Self::LowQuality => "Image quality is too low",
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
