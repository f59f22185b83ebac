use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = SessionConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, SessionConfig::default());
    assert_eq!(cfg.solver.master_scale, MASTER_SCALE);
    assert_eq!(cfg.solver.collar_offset, COLLAR_OFFSET);
    assert_eq!(cfg.engine.model_asset_path, "pose_landmarker_lite.task");
    assert_eq!(cfg.engine.delegate, Delegate::Gpu);
    assert_eq!(cfg.engine.running_mode, RunningMode::Video);
    assert_eq!(cfg.video.ideal_width, 640);
    assert_eq!(cfg.video.ideal_height, 480);
    assert_eq!(cfg.overlay.persistence, OverlayPersistence::DropOnSkip);
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let cfg = SessionConfig::from_json_str(
        r#"{ "solver": { "master_scale": 1.8 }, "overlay": { "persistence": "hold_last" } }"#,
    )
    .unwrap();
    assert_eq!(cfg.solver.master_scale, 1.8);
    assert_eq!(cfg.solver.collar_offset, COLLAR_OFFSET);
    assert_eq!(cfg.overlay.persistence, OverlayPersistence::HoldLast);
    assert_eq!(cfg.overlay.clear_rgba, [0, 0, 0, 0]);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(SessionConfig::from_json_str(r#"{ "solver": { "master_scale": 0.0 } }"#).is_err());
    assert!(SessionConfig::from_json_str(r#"{ "solver": { "min_visibility": 2.0 } }"#).is_err());
    assert!(SessionConfig::from_json_str(r#"{ "engine": { "num_poses": 2 } }"#).is_err());
    assert!(SessionConfig::from_json_str(r#"{ "video": { "fps": 0 } }"#).is_err());
    assert!(SessionConfig::from_json_str("not json").is_err());
}

#[test]
fn from_json_file_reports_missing_path() {
    let err = SessionConfig::from_json_file(Path::new("definitely/not/here.json")).unwrap_err();
    assert!(err.to_string().contains("read config"));
}
