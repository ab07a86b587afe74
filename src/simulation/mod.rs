//! Fixed-timestep simulation driving
//!
//! The driver advances a [`PhysicsBackend`](crate::world::PhysicsBackend) one
//! step at a time until a [`StepLimit`] is reached or a [`CancelToken`] fires,
//! pacing wall-clock time through a [`Pacer`].

pub mod clock;
pub mod driver;
pub mod pacing;

pub use clock::{SimulationClock, StepLimit};
pub use driver::{DriverState, RunSummary, SimulationDriver, StopReason};
pub use pacing::{CancelToken, NoPacing, Pacer, RealTimePacer};
