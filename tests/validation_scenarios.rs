//! Integration tests for the validator
//!
//! Drives FaceValidator directly; grace-period fires are fed in by hand.

use passport_gate::core::{FaceValidator, ThresholdPolicy};
use passport_gate::types::{
    Action, BoundsState, Effect, FaceGeometry, FaceQuality, FaceSmile, Instruction, Observation,
    Rect, TimerId,
};
use passport_gate::{ROLL_MAX, ROLL_MIN, SIZE_TOLERANCE};
use pretty_assertions::assert_eq;

const VIEWPORT: Rect = Rect { x: 0.0, y: 0.0, width: 400.0, height: 800.0 };

/// Face box centred in VIEWPORT with the given width
fn centred_box(width: f64) -> Rect {
    Rect::new(200.0 - width / 2.0, 400.0 - 150.0, width, 300.0)
}

fn geometry(bounding_box: Rect, roll: f64, pitch: f64, yaw: f64) -> Action {
    Action::GeometryObserved(Observation::Found(FaceGeometry {
        bounding_box,
        roll,
        pitch,
        yaw,
    }))
}

fn good_geometry() -> Action {
    geometry(centred_box(200.0), 1.4, 0.0, 0.0)
}

fn quality(q: f32) -> Action {
    Action::QualityObserved(Observation::Found(FaceQuality { quality: q }))
}

fn smile(detected: bool) -> Action {
    Action::SmileObserved(Observation::Found(FaceSmile { smile_detected: detected }))
}

fn validator() -> FaceValidator {
    let mut v = FaceValidator::default();
    v.apply(Action::ViewportResized(VIEWPORT));
    v
}

fn timer_of(effects: &[Effect]) -> TimerId {
    effects
        .iter()
        .find_map(|e| match e {
            Effect::StartGraceTimer { id, .. } => Some(*id),
            _ => None,
        })
        .expect("timer start")
}

/// Scenario A: valid face, grace period, smile → success
#[test]
fn test_valid_face_then_smile_succeeds() {
    let mut v = validator();
    v.apply(good_geometry());
    let id = timer_of(&v.apply(quality(0.5)));

    let snap = v.snapshot();
    assert!(snap.has_valid_face);
    assert!(!snap.smile_permitted);
    assert_eq!(snap.instruction, Instruction::HoldStill);

    v.apply(Action::GracePeriodElapsed(id));
    assert_eq!(v.snapshot().instruction, Instruction::PleaseSmile);

    let effects = v.apply(smile(true));
    assert_eq!(effects, vec![Effect::ShutterReleased]);
    let snap = v.snapshot();
    assert!(snap.success);
    assert_eq!(snap.instruction, Instruction::Success);
}

/// Scenario B: losing the face cancels the grace period; re-detection restarts it
#[test]
fn test_no_face_mid_grace_restarts_wait() {
    let mut v = validator();
    v.apply(good_geometry());
    let first = timer_of(&v.apply(quality(0.5)));

    let effects = v.apply(Action::NoFaceDetected);
    assert_eq!(effects, vec![Effect::CancelGraceTimer { id: first }]);
    assert!(!v.has_valid_face());
    assert!(!v.state().smile_permitted);

    // A late fire of the cancelled timer changes nothing
    v.apply(Action::GracePeriodElapsed(first));
    assert!(!v.state().smile_permitted);

    let second = timer_of(&v.apply(good_geometry()));
    assert_ne!(first, second);
    assert!(!v.state().smile_permitted);
}

#[test]
fn test_geometry_after_no_face_restores_validity() {
    let mut v = validator();
    v.apply(good_geometry());
    v.apply(quality(0.5));
    v.apply(Action::NoFaceDetected);
    assert!(v.snapshot().acceptable_quality);
    assert!(!v.has_valid_face());

    // Quality was never re-observed; geometry alone brings the face back
    let effects = v.apply(good_geometry());
    assert!(matches!(effects.as_slice(), [Effect::StartGraceTimer { .. }]));
    let snap = v.snapshot();
    assert!(snap.has_valid_face);
    assert!(snap.acceptable_quality);
}

/// Scenario C: errored quality alone invalidates the face
#[test]
fn test_errored_quality_invalidates_valid_geometry() {
    let mut v = validator();
    v.apply(good_geometry());
    v.apply(quality(0.5));
    assert!(v.has_valid_face());

    v.apply(Action::QualityObserved(Observation::Errored("inference failed".into())));
    let snap = v.snapshot();
    assert!(!snap.acceptable_quality);
    assert!(!snap.has_valid_face);
    assert!(snap.acceptable_roll && snap.acceptable_pitch && snap.acceptable_yaw);
    assert_eq!(snap.bounds_state, BoundsState::Appropriate);
    assert_eq!(snap.instruction, Instruction::DetectionErrored);
}

#[test]
fn test_too_large_wins_over_position() {
    let policy = ThresholdPolicy::default();
    let guide = Rect::new(100.0, 250.0, 200.0, 300.0);
    let width = 200.0 * SIZE_TOLERANCE + 1.0;
    for x in [-500.0, 0.0, 100.0, 5000.0] {
        let face = Rect::new(x, x, width, 300.0);
        assert_eq!(policy.classify_bounds(&face, &guide), BoundsState::TooLarge);
    }
}

#[test]
fn test_roll_outside_band_never_acceptable() {
    let mut v = validator();
    v.apply(quality(0.5));
    for roll in [ROLL_MIN, ROLL_MAX, 0.0, -1.4, 1.0, 1.7, 3.0] {
        v.apply(geometry(centred_box(200.0), roll, 0.0, 0.0));
        assert!(!v.state().acceptable_roll, "roll {} accepted", roll);
        assert!(!v.has_valid_face());
    }
    v.apply(geometry(centred_box(200.0), 1.21, 0.0, 0.0));
    assert!(v.state().acceptable_roll);
}

#[test]
fn test_any_single_failure_invalidates() {
    let breakers = [
        geometry(centred_box(200.0), 1.0, 0.0, 0.0),
        geometry(centred_box(200.0), 1.4, 0.3, 0.0),
        geometry(centred_box(200.0), 1.4, 0.0, -0.2),
        geometry(centred_box(100.0), 1.4, 0.0, 0.0),
        quality(0.05),
    ];
    for breaker in breakers {
        let mut v = validator();
        v.apply(good_geometry());
        v.apply(quality(0.5));
        assert!(v.has_valid_face());

        v.apply(breaker.clone());
        assert!(!v.has_valid_face(), "{:?} left the face valid", breaker);
        assert!(!v.success());
    }
}

#[test]
fn test_success_not_sticky_across_invalidation() {
    let mut v = validator();
    v.apply(good_geometry());
    let id = timer_of(&v.apply(quality(0.5)));
    v.apply(Action::GracePeriodElapsed(id));
    v.apply(smile(true));
    assert!(v.success());

    v.apply(Action::GeometryObserved(Observation::NotFound));
    assert!(!v.success());
    assert!(v.state().smile_detected);

    // Face comes back: the kept smile waits for a fresh grace period
    let second = timer_of(&v.apply(good_geometry()));
    assert!(v.has_valid_face());
    assert!(!v.success());
    assert!(v.state().smile_detected);

    let effects = v.apply(Action::GracePeriodElapsed(second));
    assert_eq!(effects, vec![Effect::ShutterReleased]);
    assert!(v.success());
}

#[test]
fn test_smile_while_invalid_does_not_count_later() {
    let mut v = validator();
    v.apply(smile(true));
    v.apply(good_geometry());
    let id = timer_of(&v.apply(quality(0.5)));
    v.apply(Action::GracePeriodElapsed(id));
    assert!(!v.state().smile_detected);
    assert!(!v.success());
}

#[test]
fn test_same_geometry_twice_is_idempotent() {
    let mut v = validator();
    v.apply(quality(0.5));
    let effects = v.apply(good_geometry());
    assert_eq!(effects.len(), 1);
    let state = v.state().clone();

    let effects = v.apply(good_geometry());
    assert!(effects.is_empty());
    assert_eq!(v.state(), &state);
}

#[test]
fn test_resize_recentres_guide_for_next_geometry() {
    let mut v = FaceValidator::default();
    v.apply(quality(0.5));
    v.apply(good_geometry());
    // Default guide sits at the origin
    assert_eq!(v.state().bounds_state, BoundsState::OffCentre);

    v.apply(Action::ViewportResized(VIEWPORT));
    assert_eq!(v.state().bounds_state, BoundsState::OffCentre);
    v.apply(good_geometry());
    assert_eq!(v.state().bounds_state, BoundsState::Appropriate);
    assert_eq!(v.state().layout_guide.frame(), Rect::new(100.0, 250.0, 200.0, 300.0));
}
