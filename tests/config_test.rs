use tabletop_sim::config::{
    load_scene_settings_from, save_scene_settings_to, ConfigError, SceneSettings,
};
use tabletop_sim::simulation::StepLimit;

fn temp_config_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("tabletop-sim-test-{}", std::process::id()))
        .join(name)
}

#[tokio::test]
async fn test_scene_settings_persistence() {
    let mut settings = SceneSettings::default();
    settings.objects.count = 3;
    settings.objects.seed = Some(42);
    settings.objects.bounds.x_min = -0.1;
    settings.simulation.step_limit = StepLimit::Unbounded;
    settings.simulation.real_time = false;
    settings.camera.yaw = 30.0;

    let path = temp_config_path("persist/scene.toml");
    save_scene_settings_to(&path, &settings).expect("Failed to save scene settings");

    let loaded = load_scene_settings_from(&path).expect("Failed to load scene settings");
    assert_eq!(loaded, settings);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_missing_file_yields_defaults() {
    let path = temp_config_path("missing/does-not-exist.toml");
    let loaded = load_scene_settings_from(&path).expect("Missing file should not be an error");
    assert_eq!(loaded, SceneSettings::default());
}

#[tokio::test]
async fn test_partial_file_fills_defaults() {
    let path = temp_config_path("partial/scene.toml");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"
[objects]
count = 0

[simulation]
step_limit = 480
real_time = false
"#,
    )
    .unwrap();

    let loaded = load_scene_settings_from(&path).unwrap();
    assert_eq!(loaded.objects.count, 0);
    assert_eq!(loaded.simulation.step_limit, StepLimit::Bounded(480));
    assert!(!loaded.simulation.real_time);
    assert_eq!(loaded.world, SceneSettings::default().world);
    assert_eq!(loaded.camera, SceneSettings::default().camera);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_invalid_file_is_rejected() {
    let path = temp_config_path("invalid/scene.toml");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[objects]\ncount = -1\n").unwrap();

    match load_scene_settings_from(&path) {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "objects.count"),
        other => panic!("expected an invalid count, got {:?}", other),
    }

    std::fs::write(&path, "[world]\ntimestep = \"fast\"\n").unwrap();
    assert!(matches!(load_scene_settings_from(&path), Err(ConfigError::Parse(_))));

    let _ = std::fs::remove_file(&path);
}
