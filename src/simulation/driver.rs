//! Simulation driver state machine
//!
//! Idle -> Stepping -> Stopped. While stepping, each iteration advances the
//! world by one fixed timestep, counts it, then hands the timestep to the
//! pacer. Cancellation and the step limit are checked between steps only.
//! Entering Stopped releases the world's backend connection exactly once.

use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::clock::{SimulationClock, StepLimit};
use super::pacing::{CancelToken, Pacer};
use crate::world::{PhysicsBackend, WorldError, WorldResult};

/// States of the driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DriverState {
    /// Not started
    #[default]
    Idle,
    /// Advancing the world
    Stepping,
    /// Finished; the world has been released
    Stopped,
}

impl std::fmt::Display for DriverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverState::Idle => write!(f, "Idle"),
            DriverState::Stepping => write!(f, "Stepping"),
            DriverState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Why the driver stopped
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    StepLimitReached,
    Cancelled,
    Failed(WorldError),
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub elapsed_sim_time: f64,
    pub stop_reason: StopReason,
    pub wall_time: Duration,
}

pub struct SimulationDriver<P: Pacer> {
    state: DriverState,
    clock: SimulationClock,
    step_limit: StepLimit,
    pacer: P,
    cancel: CancelToken,
    /// Steps between progress log lines; 0 disables them
    progress_interval_steps: u64,
}

impl<P: Pacer> SimulationDriver<P> {
    pub fn new(clock: SimulationClock, step_limit: StepLimit, pacer: P) -> Self {
        Self {
            state: DriverState::Idle,
            clock,
            step_limit,
            pacer,
            cancel: CancelToken::new(),
            progress_interval_steps: 0,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress_interval(mut self, steps: u64) -> Self {
        self.progress_interval_steps = steps;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn can_transition_to(&self, new_state: DriverState) -> bool {
        use DriverState::*;
        matches!(
            (self.state, new_state),
            (Idle, Stepping) | (Idle, Stopped) | (Stepping, Stopped)
        )
    }

    fn transition_to(&mut self, new_state: DriverState) -> WorldResult<()> {
        if !self.can_transition_to(new_state) {
            return Err(WorldError::SetupOrder {
                reason: format!("invalid driver transition from {} to {}", self.state, new_state),
            });
        }
        debug!("⏱️ Driver state: {} -> {}", self.state, new_state);
        self.state = new_state;
        Ok(())
    }

    /// Enter Stopped and release the world
    fn stop<W: PhysicsBackend + ?Sized>(&mut self, world: &mut W) -> WorldResult<()> {
        self.transition_to(DriverState::Stopped)?;
        world.disconnect()
    }

    /// Step `world` until the limit is reached, cancellation is requested or
    /// the backend fails. A backend failure is returned as the error after the
    /// world has been released.
    pub fn run<W: PhysicsBackend + ?Sized>(&mut self, world: &mut W) -> WorldResult<RunSummary> {
        let timestep = self.clock.fixed_timestep_seconds();
        if !(timestep.is_finite() && timestep > 0.0) {
            return Err(WorldError::invalid_input(format!("clock timestep must be positive, got {}", timestep)));
        }
        if timestep != world.timestep() as f64 {
            return Err(WorldError::invalid_input(format!(
                "clock timestep {} does not match the world timestep {}",
                timestep,
                world.timestep()
            )));
        }
        self.transition_to(DriverState::Stepping)?;

        let pace = Duration::from_secs_f64(timestep);
        let started = Instant::now();
        info!("⏱️ Simulation started ({}, dt = {:.6}s)", self.step_limit, timestep);

        let stop_reason = loop {
            if self.step_limit.is_reached(self.clock.step_count()) {
                break StopReason::StepLimitReached;
            }
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            if let Err(e) = world.step() {
                error!("⏱️ Step {} failed: {}", self.clock.step_count() + 1, e);
                break StopReason::Failed(e);
            }
            self.clock.tick();

            let steps = self.clock.step_count();
            if self.progress_interval_steps > 0 && steps % self.progress_interval_steps == 0 {
                info!(
                    "⏱️ {} steps, {:.2}s simulated, {:.2}s wall",
                    steps,
                    self.clock.elapsed_sim_time(),
                    started.elapsed().as_secs_f64()
                );
            }

            self.pacer.pace(pace);
        };

        let release = self.stop(world);
        let summary = RunSummary {
            steps: self.clock.step_count(),
            elapsed_sim_time: self.clock.elapsed_sim_time(),
            stop_reason,
            wall_time: started.elapsed(),
        };

        match &summary.stop_reason {
            StopReason::Failed(e) => {
                if let Err(release_err) = release {
                    warn!("⏱️ Releasing the world after a failed step also failed: {}", release_err);
                }
                Err(e.clone())
            }
            reason => {
                release?;
                info!(
                    "⏱️ Simulation stopped ({:?}) after {} steps, {:.3}s simulated",
                    reason, summary.steps, summary.elapsed_sim_time
                );
                Ok(summary)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::pacing::NoPacing;
    use crate::world::fixtures::StaticBodyDesc;
    use crate::world::shapes::{BodySpec, ShapeSpec, VisualShape};
    use crate::world::BodyHandle;
    use glam::Vec3;

    /// Backend double that counts steps and can fail on a chosen step
    struct CountingWorld {
        steps: u64,
        fail_at: Option<u64>,
        disconnects: u32,
        cancel_after: Option<(u64, CancelToken)>,
    }

    impl CountingWorld {
        fn new() -> Self {
            Self {
                steps: 0,
                fail_at: None,
                disconnects: 0,
                cancel_after: None,
            }
        }
    }

    impl PhysicsBackend for CountingWorld {
        fn set_gravity(&mut self, _: Vec3) -> WorldResult<()> {
            Ok(())
        }
        fn gravity(&self) -> Option<Vec3> {
            Some(Vec3::new(0.0, 0.0, -9.81))
        }
        fn timestep(&self) -> f32 {
            1.0 / 240.0
        }
        fn register_static(&mut self, _: &StaticBodyDesc) -> WorldResult<BodyHandle> {
            Ok(BodyHandle::from_raw(0, 0))
        }
        fn register_dynamic(&mut self, _: BodySpec) -> WorldResult<BodyHandle> {
            Ok(BodyHandle::from_raw(0, 0))
        }
        fn step(&mut self) -> WorldResult<()> {
            if self.fail_at == Some(self.steps + 1) {
                return Err(WorldError::StepFailure {
                    step: self.steps + 1,
                    reason: "injected".to_string(),
                });
            }
            self.steps += 1;
            if let Some((after, token)) = &self.cancel_after {
                if self.steps == *after {
                    token.cancel();
                }
            }
            Ok(())
        }
        fn body_count(&self) -> usize {
            0
        }
        fn body_position(&self, handle: BodyHandle) -> WorldResult<Vec3> {
            Err(WorldError::UnknownBody { handle })
        }
        fn visual_shape(&self, _: BodyHandle) -> WorldResult<Option<VisualShape>> {
            Ok(None)
        }
        fn collision_shape(&self, _: BodyHandle) -> WorldResult<Option<ShapeSpec>> {
            Ok(None)
        }
        fn disconnect(&mut self) -> WorldResult<()> {
            self.disconnects += 1;
            Ok(())
        }
        fn is_connected(&self) -> bool {
            self.disconnects == 0
        }
    }

    fn driver(limit: StepLimit) -> SimulationDriver<NoPacing> {
        SimulationDriver::new(SimulationClock::new((1.0_f32 / 240.0) as f64), limit, NoPacing)
    }

    #[test]
    fn test_bounded_run() {
        let mut world = CountingWorld::new();
        let mut driver = driver(StepLimit::Bounded(240));
        assert_eq!(driver.state(), DriverState::Idle);

        let summary = driver.run(&mut world).unwrap();
        assert_eq!(summary.steps, 240);
        assert_eq!(world.steps, 240);
        assert_eq!(summary.stop_reason, StopReason::StepLimitReached);
        assert_eq!(summary.elapsed_sim_time, 240.0 * driver.clock().fixed_timestep_seconds());
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(world.disconnects, 1);
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(DriverState::default(), DriverState::Idle);
    }

    #[test]
    fn test_zero_limit_takes_no_steps() {
        let mut world = CountingWorld::new();
        let summary = driver(StepLimit::Bounded(0)).run(&mut world).unwrap();
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.elapsed_sim_time, 0.0);
        assert_eq!(world.disconnects, 1);
    }

    #[test]
    fn test_unbounded_run_stops_on_cancel() {
        let mut driver = driver(StepLimit::Unbounded);
        let mut world = CountingWorld::new();
        world.cancel_after = Some((37, driver.cancel_token()));

        let summary = driver.run(&mut world).unwrap();
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(summary.steps, 37);
        assert_eq!(world.steps, 37);
        assert_eq!(world.disconnects, 1);
    }

    #[test]
    fn test_cancel_before_start() {
        let mut driver = driver(StepLimit::Bounded(10));
        driver.cancel_token().cancel();
        let mut world = CountingWorld::new();
        let summary = driver.run(&mut world).unwrap();
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
    }

    #[test]
    fn test_step_failure_is_fatal() {
        let mut world = CountingWorld::new();
        world.fail_at = Some(5);
        let mut driver = driver(StepLimit::Bounded(100));

        let err = driver.run(&mut world).unwrap_err();
        assert!(matches!(err, WorldError::StepFailure { step: 5, .. }));
        assert!(err.is_fatal());
        assert_eq!(driver.clock().step_count(), 4);
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(world.disconnects, 1);
    }

    #[test]
    fn test_driver_runs_once() {
        let mut world = CountingWorld::new();
        let mut driver = driver(StepLimit::Bounded(3));
        driver.run(&mut world).unwrap();
        assert!(matches!(driver.run(&mut world), Err(WorldError::SetupOrder { .. })));
        assert_eq!(world.steps, 3);
        assert_eq!(world.disconnects, 1);
    }

    #[test]
    fn test_mismatched_timestep_rejected() {
        let mut world = CountingWorld::new();
        let mut driver = SimulationDriver::new(SimulationClock::new(1.0 / 60.0), StepLimit::Bounded(3), NoPacing);
        assert!(matches!(driver.run(&mut world), Err(WorldError::InvalidInput { .. })));
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(world.steps, 0);
        assert_eq!(world.disconnects, 0);
    }
}
