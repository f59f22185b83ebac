use super::*;
use crate::foundation::core::FrameTime;

const EPS: f64 = 1e-4;

fn canvas() -> Canvas {
    Canvas::new(640, 480).unwrap()
}

fn reference_pose() -> PoseFrame {
    PoseFrame::empty(FrameTime::ZERO)
        .with(BodyLandmark::LeftShoulder, Landmark::new(0.40, 0.30))
        .with(BodyLandmark::RightShoulder, Landmark::new(0.60, 0.30))
        .with(BodyLandmark::LeftHip, Landmark::new(0.42, 0.55))
        .with(BodyLandmark::RightHip, Landmark::new(0.58, 0.55))
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn reference_scenario_640x480() {
    let pose = reference_pose();
    let m = torso_metrics(&pose, canvas(), 0.0).unwrap();
    assert!(close(m.shoulder_width_px, 128.0, EPS), "{m:?}");
    assert!(close(m.torso_height_px, 120.0, EPS), "{m:?}");
    assert!(close(m.center_x, 320.0, EPS), "{m:?}");
    assert!(close(m.center_y, 144.0, EPS), "{m:?}");

    let p = solve_placement(&pose, 1.5, canvas(), &SolverParams::default()).unwrap();
    assert!(close(p.width, 281.6, EPS), "{p:?}");
    assert!(close(p.height, 187.733, 1e-3), "{p:?}");
    assert!(close(p.x, 179.2, EPS), "{p:?}");
    assert!(close(p.y, 132.0, EPS), "{p:?}");
}

#[test]
fn height_times_aspect_equals_width() {
    let pose = reference_pose();
    for aspect in [0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 3.7] {
        let p = solve_placement(&pose, aspect, canvas(), &SolverParams::default()).unwrap();
        assert!(close(p.height * aspect, p.width, 1e-9), "aspect {aspect}: {p:?}");
    }
}

#[test]
fn shoulder_order_does_not_matter() {
    let swapped = PoseFrame::empty(FrameTime::ZERO)
        .with(BodyLandmark::LeftShoulder, Landmark::new(0.60, 0.30))
        .with(BodyLandmark::RightShoulder, Landmark::new(0.40, 0.30))
        .with(BodyLandmark::LeftHip, Landmark::new(0.58, 0.55))
        .with(BodyLandmark::RightHip, Landmark::new(0.42, 0.55));
    let params = SolverParams::default();
    assert_eq!(
        solve_placement(&swapped, 1.5, canvas(), &params),
        solve_placement(&reference_pose(), 1.5, canvas(), &params)
    );
}

#[test]
fn any_missing_torso_landmark_yields_no_placement() {
    for which in BodyLandmark::TORSO {
        let mut pose = reference_pose();
        pose.set(which, None);
        assert!(
            solve_placement(&pose, 1.5, canvas(), &SolverParams::default()).is_none(),
            "{which:?} missing should yield no placement"
        );
    }
}

#[test]
fn low_visibility_counts_as_missing_when_threshold_set() {
    let pose = reference_pose().with(
        BodyLandmark::RightHip,
        Landmark::new(0.58, 0.55).with_visibility(0.2),
    );
    let strict = SolverParams {
        min_visibility: 0.5,
        ..SolverParams::default()
    };
    assert!(solve_placement(&pose, 1.5, canvas(), &strict).is_none());
    assert!(solve_placement(&pose, 1.5, canvas(), &SolverParams::default()).is_some());
}

#[test]
fn degenerate_aspect_ratio_yields_no_placement() {
    let pose = reference_pose();
    let params = SolverParams::default();
    assert!(solve_placement(&pose, 0.0, canvas(), &params).is_none());
    assert!(solve_placement(&pose, -1.0, canvas(), &params).is_none());
    assert!(solve_placement(&pose, f64::NAN, canvas(), &params).is_none());
}

#[test]
fn master_scale_and_collar_offset_are_tunable() {
    let params = SolverParams {
        master_scale: 1.0,
        collar_offset: 0.0,
        min_visibility: 0.0,
    };
    let p = solve_placement(&reference_pose(), 1.0, canvas(), &params).unwrap();
    assert!(close(p.width, 128.0, EPS));
    assert!(close(p.height, 128.0, EPS));
    assert!(close(p.x, 256.0, EPS));
    assert!(close(p.y, 144.0, EPS));
    let r = p.rect();
    assert!(close(r.x1, 384.0, EPS));
    assert!(close(r.y1, 272.0, EPS));
}
