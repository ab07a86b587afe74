use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rendering::camera::CameraPose;
use crate::simulation::StepLimit;
use crate::world::SpawnBounds;

const SCENE_CONFIG_FILE: &str = "scene.toml";
/// Overrides the platform config location when set
pub const SCENE_CONFIG_ENV: &str = "TABLETOP_SCENE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read or write settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

// =============================================================================
// Scene Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub gravity: [f32; 3],
    /// Simulated seconds per step
    pub timestep: f32,
    /// Typical object size handed to the solver
    pub length_unit: f32,
    pub arm_base_position: [f32; 3],
    /// Roll, pitch, yaw of the arm base, in radians
    pub arm_base_euler: [f32; 3],
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: [0.0, 0.0, -9.81],
            timestep: 1.0 / 240.0,
            length_unit: 0.1,
            arm_base_position: [0.0, 0.2, 0.6],
            arm_base_euler: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectSettings {
    pub count: i64,
    pub bounds: SpawnBounds,
    pub spawn_height: f32,
    /// Fixed seed for a reproducible scene; fresh entropy when absent
    pub seed: Option<u64>,
}

impl Default for ObjectSettings {
    fn default() -> Self {
        Self {
            count: 10,
            bounds: SpawnBounds::default(),
            spawn_height: 0.8,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub distance: f32,
    /// Degrees
    pub yaw: f32,
    /// Degrees, negative looks down
    pub pitch: f32,
    pub target: [f32; 3],
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            distance: 1.5,
            yaw: 0.0,
            pitch: -60.9,
            target: [0.0, 0.0, 0.6],
        }
    }
}

impl CameraSettings {
    pub fn to_pose(&self) -> Result<CameraPose, ConfigError> {
        CameraPose::new(self.distance, self.yaw, self.pitch, self.target.into()).map_err(|e| {
            ConfigError::Invalid {
                field: "camera",
                reason: e.to_string(),
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of steps to run, or "unbounded" to run until interrupted
    pub step_limit: StepLimit,
    /// Sleep one timestep after every step so the scene plays at wall-clock speed
    pub real_time: bool,
    /// Steps between progress log lines; 0 disables them
    pub progress_interval_steps: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            step_limit: StepLimit::Bounded(1_000_000),
            real_time: true,
            progress_interval_steps: 240,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub world: WorldSettings,
    pub objects: ObjectSettings,
    pub camera: CameraSettings,
    pub simulation: SimulationSettings,
}

impl SceneSettings {
    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let settings: SceneSettings = toml::from_str(data)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject anything that would fail later, before any world exists
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: String| Err(ConfigError::Invalid { field, reason });

        if !self.world.gravity.iter().all(|g| g.is_finite()) {
            return invalid("world.gravity", "must be finite".to_string());
        }
        if !(self.world.timestep.is_finite() && self.world.timestep > 0.0) {
            return invalid("world.timestep", format!("must be positive, got {}", self.world.timestep));
        }
        if !(self.world.length_unit.is_finite() && self.world.length_unit > 0.0) {
            return invalid("world.length_unit", format!("must be positive, got {}", self.world.length_unit));
        }
        if self.objects.count < 0 {
            return invalid("objects.count", format!("must be non-negative, got {}", self.objects.count));
        }
        if let Err(e) = self.objects.bounds.validate() {
            return invalid("objects.bounds", e.to_string());
        }
        if !self.objects.spawn_height.is_finite() {
            return invalid("objects.spawn_height", "must be finite".to_string());
        }
        self.camera.to_pose()?;
        Ok(())
    }
}

// Scene configuration file management
pub fn scene_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(SCENE_CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("com", "tabletop", "tabletop-sim")
        .map(|proj| proj.config_dir().join(SCENE_CONFIG_FILE))
}

pub fn save_scene_settings_to(path: &Path, settings: &SceneSettings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, settings.to_toml_string()?)?;
    Ok(())
}

/// Load settings from `path`; a missing file yields the defaults
pub fn load_scene_settings_from(path: &Path) -> Result<SceneSettings, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => SceneSettings::from_toml_str(&data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SceneSettings::default()),
        Err(e) => Err(e.into()),
    }
}

pub fn save_scene_settings(settings: &SceneSettings) -> Result<(), ConfigError> {
    match scene_config_path() {
        Some(path) => save_scene_settings_to(&path, settings),
        None => Ok(()),
    }
}

pub fn load_scene_settings() -> Result<SceneSettings, ConfigError> {
    match scene_config_path() {
        Some(path) => load_scene_settings_from(&path),
        None => Ok(SceneSettings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scene_constants() {
        let settings = SceneSettings::default();
        assert_eq!(settings.world.gravity, [0.0, 0.0, -9.81]);
        assert_eq!(settings.objects.count, 10);
        assert_eq!(settings.objects.spawn_height, 0.8);
        assert_eq!(settings.objects.bounds, SpawnBounds { x_min: -0.3, x_max: 0.3, y_min: -0.3, y_max: 0.3 });
        assert_eq!(settings.camera.distance, 1.5);
        assert_eq!(settings.camera.yaw, 0.0);
        assert_eq!(settings.camera.pitch, -60.9);
        assert_eq!(settings.camera.target, [0.0, 0.0, 0.6]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = SceneSettings::from_toml_str(
            r#"
            [objects]
            count = 3
            seed = 11

            [simulation]
            step_limit = "unbounded"
            real_time = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.objects.count, 3);
        assert_eq!(settings.objects.seed, Some(11));
        assert_eq!(settings.objects.spawn_height, 0.8);
        assert_eq!(settings.simulation.step_limit, StepLimit::Unbounded);
        assert!(!settings.simulation.real_time);
        assert_eq!(settings.world, WorldSettings::default());
    }

    #[test]
    fn test_negative_count_rejected() {
        let err = SceneSettings::from_toml_str("[objects]\ncount = -1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "objects.count", .. }));
    }

    #[test]
    fn test_camera_distance_rejected() {
        let err = SceneSettings::from_toml_str("[camera]\ndistance = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera", .. }));
    }

    #[test]
    fn test_toml_roundtrip_preserves_step_limit() {
        let mut settings = SceneSettings::default();
        settings.simulation.step_limit = StepLimit::Bounded(480);
        let text = settings.to_toml_string().unwrap();
        assert!(text.contains("step_limit = 480"));
        assert_eq!(SceneSettings::from_toml_str(&text).unwrap(), settings);
    }
}
