pub mod settings;

// Re-export commonly used types
pub use settings::{
    CameraSettings, ConfigError, ObjectSettings, SceneSettings, SimulationSettings, WorldSettings,
    load_scene_settings, load_scene_settings_from, save_scene_settings, save_scene_settings_to,
    scene_config_path, SCENE_CONFIG_ENV,
};
