//! Read-only copy of a validation state for presentation

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use crate::types::{
    BoundsState, FaceDetectedState, FaceGeometry, FaceQuality, Instruction, Observation, Rect,
    ValidationState,
};

/// Consistent view of one validation state, taken after an update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSnapshot {
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,
    /// Number of actions applied so far
    pub sequence: u64,
    pub face_detected_state: FaceDetectedState,
    pub acceptable_roll: bool,
    pub acceptable_pitch: bool,
    pub acceptable_yaw: bool,
    pub bounds_state: BoundsState,
    pub acceptable_quality: bool,
    pub has_valid_face: bool,
    pub smile_permitted: bool,
    pub smile_detected: bool,
    pub success: bool,
    pub debug_enabled: bool,
    pub layout_guide: Rect,
    pub last_geometry: Observation<FaceGeometry>,
    pub last_quality: Observation<FaceQuality>,
    pub instruction: Instruction,
}

impl ValidationSnapshot {
    pub fn from_state(state: &ValidationState, sequence: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            sequence,
            face_detected_state: state.face_detected_state,
            acceptable_roll: state.acceptable_roll,
            acceptable_pitch: state.acceptable_pitch,
            acceptable_yaw: state.acceptable_yaw,
            bounds_state: state.bounds_state,
            acceptable_quality: state.acceptable_quality,
            has_valid_face: state.has_valid_face(),
            smile_permitted: state.smile_permitted,
            smile_detected: state.smile_detected,
            success: state.success,
            debug_enabled: state.debug_enabled,
            layout_guide: state.layout_guide.frame(),
            last_geometry: state.last_geometry.clone(),
            last_quality: state.last_quality.clone(),
            instruction: Instruction::for_state(state),
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let line = self.to_parseable_string();
        if self.success {
            format!("📸 {}", line.green().bold())
        } else if self.has_valid_face {
            format!("🙂 {}", line.yellow())
        } else if self.face_detected_state == FaceDetectedState::FaceDetected {
            format!("🔴 {}", line.red())
        } else {
            format!("⏳ {}", line.dimmed())
        }
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "#{} | valid={} | bounds={} | pose={}{}{} | quality={} | smile_ok={} | smile={} | success={} | {}",
            self.sequence,
            self.has_valid_face,
            self.bounds_state,
            flag(self.acceptable_roll),
            flag(self.acceptable_pitch),
            flag(self.acceptable_yaw),
            flag(self.acceptable_quality),
            self.smile_permitted,
            self.smile_detected,
            self.success,
            self.instruction.code()
        )
    }

    /// Raw measurements for the diagnostic overlay
    pub fn debug_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.last_geometry {
            Observation::Found(g) => {
                lines.push(format!("R: {:.3} {}", g.roll, flag(self.acceptable_roll)));
                lines.push(format!("P: {:.3} {}", g.pitch, flag(self.acceptable_pitch)));
                lines.push(format!("Y: {:.3} {}", g.yaw, flag(self.acceptable_yaw)));
                lines.push(format!(
                    "box: {:.0},{:.0} {:.0}x{:.0} guide: {:.0},{:.0} {:.0}x{:.0}",
                    g.bounding_box.x,
                    g.bounding_box.y,
                    g.bounding_box.width,
                    g.bounding_box.height,
                    self.layout_guide.x,
                    self.layout_guide.y,
                    self.layout_guide.width,
                    self.layout_guide.height
                ));
            }
            Observation::Errored(reason) => lines.push(format!("ERROR: {}", reason)),
            Observation::NotFound => {}
        }
        match &self.last_quality {
            Observation::Found(q) => {
                lines.push(format!("Q: {:.3} {}", q.quality, flag(self.acceptable_quality)))
            }
            Observation::Errored(reason) => lines.push(format!("ERROR: {}", reason)),
            Observation::NotFound => {}
        }
        lines
    }
}

fn flag(ok: bool) -> &'static str {
    if ok {
        "+"
    } else {
        "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_derives_validity() {
        let state = ValidationState::default();
        let snap = ValidationSnapshot::from_state(&state, 0);
        assert!(!snap.has_valid_face);
        assert_eq!(snap.instruction, Instruction::LookAtCamera);
        assert_eq!(snap.layout_guide.width, crate::LAYOUT_GUIDE_WIDTH);
    }

    #[test]
    fn test_parseable_string() {
        let snap = ValidationSnapshot::from_state(&ValidationState::default(), 3);
        let line = snap.to_parseable_string();
        assert!(line.starts_with("#3 | valid=false | bounds=UNKNOWN | pose=---"));
        assert!(line.ends_with("LOOK_AT_CAMERA"));
    }

    #[test]
    fn test_debug_lines_show_errors() {
        let mut state = ValidationState::default();
        state.last_quality = Observation::Errored("no buffer".into());
        let snap = ValidationSnapshot::from_state(&state, 1);
        assert_eq!(snap.debug_lines(), vec!["ERROR: no buffer".to_string()]);
    }
}
