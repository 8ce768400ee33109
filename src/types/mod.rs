//! Core types for Passport Gate

mod action;
mod event;
mod geometry;
mod instruction;
mod observation;
mod snapshot;
mod state;

pub use action::{Action, Effect};
pub use event::DetectionEvent;
pub use geometry::{LayoutGuide, Rect};
pub use instruction::Instruction;
pub use observation::{FaceDetectedState, FaceGeometry, FaceQuality, FaceSmile, Observation};
pub use snapshot::ValidationSnapshot;
pub use state::{BoundsState, GracePhase, TimerId, ValidationState};
