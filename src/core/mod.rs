//! Core modules for Passport Gate

pub mod policy;
pub mod aggregator;
pub mod dispatcher;
pub mod api;

pub use policy::{PoseVerdict, ThresholdPolicy};
pub use aggregator::{reduce, FaceValidator, Transition};
pub use dispatcher::{DispatcherHandle, ShutterReleased, ValidationSession};
pub use api::{create_router, run_server};
