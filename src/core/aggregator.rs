//! FaceValidator: fuses geometry, quality and smile observations into one
//! debounced capture signal
//!
//! Two coupled levels:
//! - Validity: pose, bounds and quality flags; `has_valid_face` is their AND
//! - Smile gating: a face valid for the whole grace period may smile;
//!   success = valid AND smile permitted AND smiling
//!
//! Transitions are computed by `reduce`, which returns the next state plus the
//! timer work to schedule. It never touches clocks or channels.

use std::time::Duration;
use crate::config::SessionConfig;
use crate::core::ThresholdPolicy;
use crate::types::{
    Action, Effect, FaceDetectedState, FaceGeometry, FaceQuality, GracePhase, LayoutGuide,
    Observation, ValidationSnapshot, ValidationState,
};

/// Result of applying one action
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ValidationState,
    pub effects: Vec<Effect>,
}

/// Pure transition function: `(state, action) -> (state', effects)`
pub fn reduce(
    state: &ValidationState,
    action: &Action,
    policy: &ThresholdPolicy,
    grace_period: Duration,
) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();
    let was_valid = state.has_valid_face();

    match action {
        Action::ViewportResized(viewport) => next.layout_guide.recenter(viewport),
        Action::ToggleDebug => next.debug_enabled = !next.debug_enabled,
        Action::NoFaceDetected => {
            next.face_detected_state = FaceDetectedState::NoFaceDetected;
            apply_geometry(&mut next, &Observation::NotFound, policy);
        }
        Action::GeometryObserved(obs) => {
            next.face_detected_state = obs.detected_state();
            apply_geometry(&mut next, obs, policy);
        }
        Action::QualityObserved(obs) => {
            next.face_detected_state = obs.detected_state();
            apply_quality(&mut next, obs, policy);
        }
        Action::SmileObserved(obs) => {
            // A smile only counts while the face is valid
            if was_valid {
                next.face_detected_state = obs.detected_state();
                next.smile_detected = obs.found().is_some_and(|s| s.smile_detected);
            }
        }
        Action::GracePeriodElapsed(id) => {
            if next.grace == GracePhase::Pending(*id) {
                next.grace = GracePhase::Elapsed;
                next.smile_permitted = true;
            }
        }
    }

    let now_valid = next.has_valid_face();
    if !was_valid && now_valid {
        if next.grace == GracePhase::Idle {
            let id = next.issue_timer_id();
            next.grace = GracePhase::Pending(id);
            effects.push(Effect::StartGraceTimer { id, after: grace_period });
        }
    } else if was_valid && !now_valid {
        if let GracePhase::Pending(id) = next.grace {
            effects.push(Effect::CancelGraceTimer { id });
        }
        next.grace = GracePhase::Idle;
        next.smile_permitted = false;
    }

    next.success = now_valid && next.smile_permitted && next.smile_detected;
    if next.success && !state.success {
        effects.push(Effect::ShutterReleased);
    }

    Transition { state: next, effects }
}

fn apply_geometry(
    state: &mut ValidationState,
    obs: &Observation<FaceGeometry>,
    policy: &ThresholdPolicy,
) {
    match obs {
        Observation::Found(geometry) => {
            let pose = policy.classify_pose(geometry.roll, geometry.pitch, geometry.yaw);
            state.acceptable_roll = pose.roll_ok;
            state.acceptable_pitch = pose.pitch_ok;
            state.acceptable_yaw = pose.yaw_ok;
            state.bounds_state =
                policy.classify_bounds(&geometry.bounding_box, &state.layout_guide.frame());
        }
        Observation::NotFound | Observation::Errored(_) => state.invalidate_geometry(),
    }
    state.last_geometry = obs.clone();
}

fn apply_quality(
    state: &mut ValidationState,
    obs: &Observation<FaceQuality>,
    policy: &ThresholdPolicy,
) {
    state.acceptable_quality = obs
        .found()
        .is_some_and(|q| policy.classify_quality(q.quality));
    state.last_quality = obs.clone();
}

/// Owner of one session's validation state
#[derive(Debug)]
pub struct FaceValidator {
    state: ValidationState,
    policy: ThresholdPolicy,
    grace_period: Duration,
    update_count: u64,
}

impl Default for FaceValidator {
    fn default() -> Self {
        Self::new(ThresholdPolicy::default(), Duration::from_millis(crate::GRACE_PERIOD_MS))
    }
}

impl FaceValidator {
    /// Create a validator with the default layout guide, debug off
    pub fn new(policy: ThresholdPolicy, grace_period: Duration) -> Self {
        Self {
            state: ValidationState::default(),
            policy,
            grace_period,
            update_count: 0,
        }
    }

    pub fn from_config(policy: ThresholdPolicy, session: &SessionConfig) -> Self {
        let guide = LayoutGuide::new(session.layout_guide_width, session.layout_guide_height);
        Self {
            state: ValidationState::new(guide, session.debug_enabled),
            policy,
            grace_period: session.grace_period(),
            update_count: 0,
        }
    }

    /// Apply one action, returning the effects to schedule
    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        if let Some((axis, reason)) = action.detection_error() {
            tracing::warn!(axis, reason, "detection errored");
        }
        if let Action::SmileObserved(_) = action {
            if !self.state.has_valid_face() {
                tracing::trace!("smile ignored while face invalid");
            }
        }

        let transition = reduce(&self.state, &action, &self.policy, self.grace_period);
        self.log_transition(&transition);

        self.state = transition.state;
        self.update_count += 1;
        transition.effects
    }

    fn log_transition(&self, transition: &Transition) {
        let before = &self.state;
        let after = &transition.state;

        match (before.has_valid_face(), after.has_valid_face()) {
            (false, true) => tracing::info!("valid face acquired"),
            (true, false) => tracing::info!(
                bounds = %after.bounds_state,
                roll = after.acceptable_roll,
                pitch = after.acceptable_pitch,
                yaw = after.acceptable_yaw,
                quality = after.acceptable_quality,
                "valid face lost"
            ),
            _ => {}
        }
        if !before.smile_permitted && after.smile_permitted {
            tracing::info!("grace period elapsed, smile permitted");
        }
        if before.success != after.success {
            tracing::info!(success = after.success, "success changed");
        }
        for effect in &transition.effects {
            tracing::debug!(?effect, "effect scheduled");
        }
    }

    /// Current state
    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    pub fn has_valid_face(&self) -> bool {
        self.state.has_valid_face()
    }

    pub fn success(&self) -> bool {
        self.state.success
    }

    /// Get update count
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Consistent copy for readers
    pub fn snapshot(&self) -> ValidationSnapshot {
        ValidationSnapshot::from_state(&self.state, self.update_count)
    }
}

// =============================================================================
// TESTS
// =============================================================================
