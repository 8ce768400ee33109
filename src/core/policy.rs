//! Threshold policy: raw measurements → pass/fail against photo-standard limits
//!
//! - Bounds: width within SIZE_TOLERANCE of the guide, then centre within
//!   CENTRE_TOLERANCE on both axes. Size is checked before centring.
//! - Pose: roll in (ROLL_MIN, ROLL_MAX), |pitch| < PITCH_LIMIT, |yaw| < YAW_LIMIT
//! - Quality: score ≥ MIN_QUALITY

use serde::{Deserialize, Serialize};
use crate::error::ConfigError;
use crate::types::{BoundsState, Rect};
use crate::{
    CENTRE_TOLERANCE, MIN_QUALITY, PITCH_LIMIT, ROLL_MAX, ROLL_MIN, SIZE_TOLERANCE, YAW_LIMIT,
};

/// Per-axis pose verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseVerdict {
    pub roll_ok: bool,
    pub pitch_ok: bool,
    pub yaw_ok: bool,
}

/// Acceptance tolerances; stateless apart from the limits themselves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdPolicy {
    pub size_tolerance: f64,
    pub centre_tolerance: f64,
    pub roll_min: f64,
    pub roll_max: f64,
    pub pitch_limit: f64,
    pub yaw_limit: f64,
    pub min_quality: f32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            size_tolerance: SIZE_TOLERANCE,
            centre_tolerance: CENTRE_TOLERANCE,
            roll_min: ROLL_MIN,
            roll_max: ROLL_MAX,
            pitch_limit: PITCH_LIMIT,
            yaw_limit: YAW_LIMIT,
            min_quality: MIN_QUALITY,
        }
    }
}

impl ThresholdPolicy {
    /// Classify a face box against the layout guide
    pub fn classify_bounds(&self, face: &Rect, guide: &Rect) -> BoundsState {
        if face.width > self.size_tolerance * guide.width {
            BoundsState::TooLarge
        } else if face.width * self.size_tolerance < guide.width {
            BoundsState::TooSmall
        } else if (face.mid_x() - guide.mid_x()).abs() > self.centre_tolerance
            || (face.mid_y() - guide.mid_y()).abs() > self.centre_tolerance
        {
            BoundsState::OffCentre
        } else {
            BoundsState::Appropriate
        }
    }

    /// Classify head pose; every bound is exclusive
    pub fn classify_pose(&self, roll: f64, pitch: f64, yaw: f64) -> PoseVerdict {
        PoseVerdict {
            roll_ok: roll > self.roll_min && roll < self.roll_max,
            pitch_ok: pitch.abs() < self.pitch_limit,
            yaw_ok: yaw.abs() < self.yaw_limit,
        }
    }

    pub fn classify_quality(&self, quality: f32) -> bool {
        quality >= self.min_quality
    }

    /// Reject limits that can never (or always) pass
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.size_tolerance >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "size_tolerance must be >= 1.0, got {}",
                self.size_tolerance
            )));
        }
        if !(self.centre_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "centre_tolerance must be >= 0, got {}",
                self.centre_tolerance
            )));
        }
        if !(self.roll_min < self.roll_max) {
            return Err(ConfigError::Invalid(format!(
                "roll band is empty: ({}, {})",
                self.roll_min, self.roll_max
            )));
        }
        if !(self.pitch_limit > 0.0) || !(self.yaw_limit > 0.0) {
            return Err(ConfigError::Invalid(
                "pitch_limit and yaw_limit must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_quality) {
            return Err(ConfigError::Invalid(format!(
                "min_quality must be in [0, 1], got {}",
                self.min_quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guide() -> Rect {
        // centre (200, 400)
        Rect::new(100.0, 250.0, 200.0, 300.0)
    }

    fn face_at(mid_x: f64, mid_y: f64, width: f64) -> Rect {
        Rect::new(mid_x - width / 2.0, mid_y - width / 2.0, width, width)
    }

    #[test]
    fn test_too_large_regardless_of_position() {
        let policy = ThresholdPolicy::default();
        for (x, y) in [(200.0, 400.0), (0.0, 0.0), (900.0, -300.0)] {
            assert_eq!(policy.classify_bounds(&face_at(x, y, 241.0), &guide()), BoundsState::TooLarge);
        }
    }

    #[test]
    fn test_too_small_before_off_centre() {
        let policy = ThresholdPolicy::default();
        // 166 * 1.2 = 199.2 < 200
        assert_eq!(policy.classify_bounds(&face_at(0.0, 0.0, 166.0), &guide()), BoundsState::TooSmall);
    }

    #[test]
    fn test_size_band_accepts_near_guide_width() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.classify_bounds(&face_at(200.0, 400.0, 239.0), &guide()), BoundsState::Appropriate);
        assert_eq!(policy.classify_bounds(&face_at(200.0, 400.0, 170.0), &guide()), BoundsState::Appropriate);
    }

    #[test]
    fn test_size_limits_are_inclusive_at_equality() {
        let policy = ThresholdPolicy::default();
        // 1.2 * 200 == 240 exactly
        assert_eq!(policy.classify_bounds(&face_at(200.0, 400.0, 240.0), &guide()), BoundsState::Appropriate);
        assert_eq!(policy.classify_bounds(&face_at(200.0, 400.0, 240.001), &guide()), BoundsState::TooLarge);

        // 200 * 1.2 == 240 exactly
        let wide_guide = Rect::new(80.0, 250.0, 240.0, 300.0);
        assert_eq!(policy.classify_bounds(&face_at(200.0, 400.0, 200.0), &wide_guide), BoundsState::Appropriate);
        assert_eq!(policy.classify_bounds(&face_at(200.0, 400.0, 199.999), &wide_guide), BoundsState::TooSmall);
    }

    #[test]
    fn test_off_centre_each_axis() {
        let policy = ThresholdPolicy::default();
        assert_eq!(policy.classify_bounds(&face_at(251.0, 400.0, 200.0), &guide()), BoundsState::OffCentre);
        assert_eq!(policy.classify_bounds(&face_at(200.0, 349.0, 200.0), &guide()), BoundsState::OffCentre);
        assert_eq!(policy.classify_bounds(&face_at(250.0, 450.0, 200.0), &guide()), BoundsState::Appropriate);
    }

    #[test]
    fn test_roll_band_is_open() {
        let policy = ThresholdPolicy::default();
        assert!(!policy.classify_pose(ROLL_MIN, 0.0, 0.0).roll_ok);
        assert!(!policy.classify_pose(ROLL_MAX, 0.0, 0.0).roll_ok);
        assert!(policy.classify_pose(1.4, 0.0, 0.0).roll_ok);
        assert!(!policy.classify_pose(0.0, 0.0, 0.0).roll_ok);
    }

    #[test]
    fn test_pitch_and_yaw_limits() {
        let policy = ThresholdPolicy::default();
        let v = policy.classify_pose(1.4, -0.19, 0.14);
        assert!(v.pitch_ok && v.yaw_ok);
        let v = policy.classify_pose(1.4, PITCH_LIMIT, -YAW_LIMIT);
        assert!(!v.pitch_ok);
        assert!(!v.yaw_ok);
    }

    #[test]
    fn test_quality_threshold_inclusive() {
        let policy = ThresholdPolicy::default();
        assert!(policy.classify_quality(MIN_QUALITY));
        assert!(policy.classify_quality(0.5));
        assert!(!policy.classify_quality(0.19));
    }

    #[test]
    fn test_validate_rejects_empty_roll_band() {
        let policy = ThresholdPolicy {
            roll_min: 1.6,
            roll_max: 1.2,
            ..ThresholdPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(ConfigError::Invalid(_))));
        assert!(ThresholdPolicy::default().validate().is_ok());
    }
}
