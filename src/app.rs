use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::{ConfigError, SceneSettings};
use crate::rendering::camera::{apply_camera_pose, Viewer};
use crate::simulation::{CancelToken, NoPacing, Pacer, RealTimePacer, RunSummary, SimulationClock, SimulationDriver};
use crate::world::{create_world, spawn_random_objects, BodyHandle, PhysicsBackend, RapierWorld, Scene, WorldResult};

/// Everything a finished run leaves behind
pub struct SceneRun {
    pub scene: Scene<RapierWorld>,
    pub objects: Vec<BodyHandle>,
    pub summary: RunSummary,
}

/// Bootstrap -> spawn objects -> set camera -> drive the simulation
pub struct App {
    settings: SceneSettings,
    cancel: CancelToken,
}

impl App {
    pub fn new(settings: SceneSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            settings,
            cancel: CancelToken::new(),
        })
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Token that stops the simulation at the next step boundary
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run with the pacing chosen in the settings
    pub fn run<V: Viewer>(&self, viewer: &mut V) -> WorldResult<SceneRun> {
        if self.settings.simulation.real_time {
            self.run_with(viewer, RealTimePacer)
        } else {
            self.run_with(viewer, NoPacing)
        }
    }

    pub fn run_with<V: Viewer, P: Pacer>(&self, viewer: &mut V, pacer: P) -> WorldResult<SceneRun> {
        let mut scene = create_world(&self.settings.world)?;

        let objects = &self.settings.objects;
        if objects.spawn_height <= scene.support_height {
            warn!(
                "📦 Spawn height {} is not above the support surface at {}",
                objects.spawn_height, scene.support_height
            );
        }
        let mut rng = match objects.seed {
            Some(seed) => {
                info!("📦 Using object seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let handles = spawn_random_objects(
            &mut scene.world,
            &mut rng,
            objects.count,
            &objects.bounds,
            objects.spawn_height,
        )?;

        let pose = self
            .settings
            .camera
            .to_pose()
            .map_err(|e| crate::world::WorldError::invalid_input(e.to_string()))?;
        apply_camera_pose(viewer, &pose)?;

        let clock = SimulationClock::new(scene.world.timestep() as f64);
        let mut driver = SimulationDriver::new(clock, self.settings.simulation.step_limit, pacer)
            .with_cancel_token(self.cancel.clone())
            .with_progress_interval(self.settings.simulation.progress_interval_steps);
        let summary = driver.run(&mut scene.world)?;

        Ok(SceneRun {
            scene,
            objects: handles,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::camera::DebugViewer;
    use crate::simulation::{StepLimit, StopReason};

    fn quick_settings(steps: u64) -> SceneSettings {
        let mut settings = SceneSettings::default();
        settings.objects.seed = Some(5);
        settings.simulation.step_limit = StepLimit::Bounded(steps);
        settings.simulation.real_time = false;
        settings
    }

    #[test]
    fn test_app_runs_to_limit() {
        let app = App::new(quick_settings(24)).unwrap();
        let mut viewer = DebugViewer::default();
        let run = app.run(&mut viewer).unwrap();

        assert_eq!(run.objects.len(), 10);
        assert_eq!(run.summary.steps, 24);
        assert_eq!(run.summary.stop_reason, StopReason::StepLimitReached);
        assert!(!run.scene.world.is_connected());
        assert!(viewer.camera().is_some());
    }

    #[test]
    fn test_app_rejects_invalid_settings() {
        let mut settings = quick_settings(1);
        settings.objects.count = -1;
        assert!(App::new(settings).is_err());
    }

    #[test]
    fn test_cancelled_app_takes_no_steps() {
        let app = App::new(quick_settings(1_000)).unwrap();
        app.cancel_token().cancel();
        let run = app.run(&mut DebugViewer::default()).unwrap();
        assert_eq!(run.summary.steps, 0);
        assert_eq!(run.summary.stop_reason, StopReason::Cancelled);
    }
}
