//! Validation state owned by a single FaceValidator

use serde::{Deserialize, Serialize};
use crate::types::{FaceDetectedState, FaceGeometry, FaceQuality, LayoutGuide, Observation};

/// Face box size and position relative to the layout guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoundsState {
    /// No geometry yet, or geometry was lost
    #[default]
    Unknown,
    TooSmall,
    TooLarge,
    OffCentre,
    /// Right size, centred in the guide
    Appropriate,
}

impl BoundsState {
    pub fn is_appropriate(&self) -> bool {
        *self == BoundsState::Appropriate
    }
}

impl std::fmt::Display for BoundsState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BoundsState::Unknown => "UNKNOWN",
            BoundsState::TooSmall => "TOO_SMALL",
            BoundsState::TooLarge => "TOO_LARGE",
            BoundsState::OffCentre => "OFF_CENTRE",
            BoundsState::Appropriate => "APPROPRIATE",
        };
        write!(f, "{}", name)
    }
}

/// Identifies one grace-period timer; a fire with a stale id is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Where the grace period stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GracePhase {
    /// Face not valid, no timer
    #[default]
    Idle,
    /// Face valid, timer running
    Pending(TimerId),
    /// Face valid and the timer has fired
    Elapsed,
}

/// Aggregate validation state
///
/// `has_valid_face` is derived on demand from the five acceptability inputs
/// and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationState {
    pub acceptable_roll: bool,
    pub acceptable_pitch: bool,
    pub acceptable_yaw: bool,
    pub bounds_state: BoundsState,
    pub acceptable_quality: bool,
    pub smile_permitted: bool,
    pub smile_detected: bool,
    pub success: bool,
    pub debug_enabled: bool,
    pub face_detected_state: FaceDetectedState,
    pub layout_guide: LayoutGuide,
    /// Most recent geometry as received, for diagnostics
    pub last_geometry: Observation<FaceGeometry>,
    /// Most recent quality as received, for diagnostics
    pub last_quality: Observation<FaceQuality>,
    pub grace: GracePhase,
    next_timer_id: u64,
}

impl Default for ValidationState {
    fn default() -> Self {
        Self::new(LayoutGuide::default(), false)
    }
}

impl ValidationState {
    /// Session-start state: every flag false, bounds unknown
    pub fn new(layout_guide: LayoutGuide, debug_enabled: bool) -> Self {
        Self {
            acceptable_roll: false,
            acceptable_pitch: false,
            acceptable_yaw: false,
            bounds_state: BoundsState::Unknown,
            acceptable_quality: false,
            smile_permitted: false,
            smile_detected: false,
            success: false,
            debug_enabled,
            face_detected_state: FaceDetectedState::NoFaceDetected,
            layout_guide,
            last_geometry: Observation::NotFound,
            last_quality: Observation::NotFound,
            grace: GracePhase::Idle,
            next_timer_id: 0,
        }
    }

    /// All pose, bounds and quality checks pass
    pub fn has_valid_face(&self) -> bool {
        self.acceptable_roll
            && self.acceptable_pitch
            && self.acceptable_yaw
            && self.bounds_state.is_appropriate()
            && self.acceptable_quality
    }

    pub fn acceptable_pose(&self) -> bool {
        self.acceptable_roll && self.acceptable_pitch && self.acceptable_yaw
    }

    /// Reset every geometry-derived flag
    pub fn invalidate_geometry(&mut self) {
        self.acceptable_roll = false;
        self.acceptable_pitch = false;
        self.acceptable_yaw = false;
        self.bounds_state = BoundsState::Unknown;
    }

    /// Allocate the id for the next grace-period timer
    pub(crate) fn issue_timer_id(&mut self) -> TimerId {
        self.next_timer_id += 1;
        TimerId(self.next_timer_id)
    }
}
