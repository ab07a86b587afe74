use glam::Vec3;
use std::fmt;

use super::fixtures::StaticBodyDesc;
use super::shapes::{BodySpec, ShapeSpec, VisualShape};
use super::WorldResult;

/// Opaque identifier for a body registered with a world.
///
/// Handles carry the id of the world that issued them and are only valid
/// against that world. Within a world they are issued in increasing order and
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    world: u64,
    index: u64,
}

impl BodyHandle {
    pub(crate) fn from_raw(world: u64, index: u64) -> Self {
        Self { world, index }
    }

    /// Id of the issuing world
    pub fn world(&self) -> u64 {
        self.world
    }

    /// Issue order within the world
    pub fn index(&self) -> u64 {
        self.index
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.world, self.index)
    }
}

/// Handles for every link body of a registered articulated fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureHandle {
    pub name: String,
    pub links: Vec<BodyHandle>,
}

/// Fixed interface to the physics backend.
///
/// A world is created with a timestep, receives its gravity exactly once, and
/// only then accepts bodies. After [`disconnect`](PhysicsBackend::disconnect)
/// every mutating call fails with [`WorldError::Disconnected`](super::WorldError::Disconnected).
pub trait PhysicsBackend {
    /// Set the global gravity vector. Allowed once, before any registration.
    fn set_gravity(&mut self, gravity: Vec3) -> WorldResult<()>;

    fn gravity(&self) -> Option<Vec3>;

    /// Fixed simulated time advanced by one [`step`](PhysicsBackend::step), in seconds
    fn timestep(&self) -> f32;

    /// Register an immovable body built from one or more parts
    fn register_static(&mut self, desc: &StaticBodyDesc) -> WorldResult<BodyHandle>;

    /// Register a dynamic body; the `BodySpec` is consumed
    fn register_dynamic(&mut self, spec: BodySpec) -> WorldResult<BodyHandle>;

    /// Advance the world by exactly one fixed timestep
    fn step(&mut self) -> WorldResult<()>;

    fn body_count(&self) -> usize;

    fn body_position(&self, handle: BodyHandle) -> WorldResult<Vec3>;

    /// What the viewer draws for this body, if it has a single visual shape
    fn visual_shape(&self, handle: BodyHandle) -> WorldResult<Option<VisualShape>>;

    /// The collision geometry as the backend actually holds it
    fn collision_shape(&self, handle: BodyHandle) -> WorldResult<Option<ShapeSpec>>;

    /// Release the backend connection
    fn disconnect(&mut self) -> WorldResult<()>;

    fn is_connected(&self) -> bool;
}
