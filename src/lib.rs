//! Passport Gate: live face validation for passport photo capture
//!
//! Detection source → dispatcher → FaceValidator → snapshot readers

pub mod config;
pub mod core;
pub mod error;
pub mod script;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, DispatchError, ScriptError};

// =============================================================================
// BOUNDS THRESHOLDS
// =============================================================================

/// Face box may be at most this factor wider (or narrower) than the guide
pub const SIZE_TOLERANCE: f64 = 1.2;

/// Maximum centre offset between face box and guide, per axis (points)
pub const CENTRE_TOLERANCE: f64 = 50.0;

// =============================================================================
// POSE THRESHOLDS (radians)
// =============================================================================

/// Lower bound of the frontal roll band (exclusive)
///
/// The band is not centred on zero: the detector measures roll from the
/// horizontal axis, so a level face reports roughly π/2.
pub const ROLL_MIN: f64 = 1.2;

/// Upper bound of the frontal roll band (exclusive)
pub const ROLL_MAX: f64 = 1.6;

/// Maximum absolute pitch (exclusive)
pub const PITCH_LIMIT: f64 = 0.2;

/// Maximum absolute yaw (exclusive)
pub const YAW_LIMIT: f64 = 0.15;

// =============================================================================
// QUALITY
// =============================================================================

/// Minimum capture quality score (inclusive)
pub const MIN_QUALITY: f32 = 0.2;

// =============================================================================
// SESSION
// =============================================================================

/// Time a face must stay valid before a smile is accepted (milliseconds)
pub const GRACE_PERIOD_MS: u64 = 2000;

/// Default layout guide size (points)
pub const LAYOUT_GUIDE_WIDTH: f64 = 200.0;
pub const LAYOUT_GUIDE_HEIGHT: f64 = 300.0;

/// Pending actions a session queue holds before senders wait
pub const CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
