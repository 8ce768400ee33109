//! Wire shape of detection-source events

use serde::{Deserialize, Serialize};
use crate::types::{Action, FaceGeometry, FaceQuality, FaceSmile, Observation, Rect};

/// One inbound event, as carried by JSON transports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetectionEvent {
    ViewportResized { rect: Rect },
    NoFace,
    Geometry {
        bounding_box: Rect,
        roll: f64,
        pitch: f64,
        yaw: f64,
    },
    GeometryError { reason: String },
    Quality { score: f32 },
    QualityError { reason: String },
    Smile { detected: bool },
    SmileError { reason: String },
    ToggleDebug,
}

impl From<DetectionEvent> for Action {
    fn from(event: DetectionEvent) -> Self {
        match event {
            DetectionEvent::ViewportResized { rect } => Action::ViewportResized(rect),
            DetectionEvent::NoFace => Action::NoFaceDetected,
            DetectionEvent::Geometry { bounding_box, roll, pitch, yaw } => {
                Action::GeometryObserved(Observation::Found(FaceGeometry {
                    bounding_box,
                    roll,
                    pitch,
                    yaw,
                }))
            }
            DetectionEvent::GeometryError { reason } => {
                Action::GeometryObserved(Observation::Errored(reason))
            }
            DetectionEvent::Quality { score } => {
                Action::QualityObserved(Observation::Found(FaceQuality { quality: score }))
            }
            DetectionEvent::QualityError { reason } => {
                Action::QualityObserved(Observation::Errored(reason))
            }
            DetectionEvent::Smile { detected } => {
                Action::SmileObserved(Observation::Found(FaceSmile { smile_detected: detected }))
            }
            DetectionEvent::SmileError { reason } => {
                Action::SmileObserved(Observation::Errored(reason))
            }
            DetectionEvent::ToggleDebug => Action::ToggleDebug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geometry_event() {
        let json = r#"{"type":"geometry","bounding_box":{"x":0,"y":0,"width":200,"height":300},"roll":1.4,"pitch":0.0,"yaw":0.0}"#;
        let event: DetectionEvent = serde_json::from_str(json).unwrap();
        match Action::from(event) {
            Action::GeometryObserved(Observation::Found(g)) => {
                assert_eq!(g.bounding_box.width, 200.0);
                assert_eq!(g.roll, 1.4);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_error_events_become_errored_observations() {
        let event: DetectionEvent =
            serde_json::from_str(r#"{"type":"quality_error","reason":"timeout"}"#).unwrap();
        assert_eq!(
            Action::from(event),
            Action::QualityObserved(Observation::Errored("timeout".into()))
        );
    }

    #[test]
    fn test_unit_events() {
        let event: DetectionEvent = serde_json::from_str(r#"{"type":"no_face"}"#).unwrap();
        assert_eq!(Action::from(event), Action::NoFaceDetected);
        let event: DetectionEvent = serde_json::from_str(r#"{"type":"toggle_debug"}"#).unwrap();
        assert_eq!(Action::from(event), Action::ToggleDebug);
    }
}
