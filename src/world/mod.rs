//! Physics world for the tabletop scene
//!
//! The world is an external collaborator reached through [`PhysicsBackend`]:
//! it owns every registered body and fixture, holds the global gravity and
//! timestep, and advances one fixed step at a time. Everything else in this
//! module builds on top of that interface.

pub mod backend;
pub mod bootstrap;
pub mod fixtures;
pub mod generator;
pub mod physics;
pub mod shapes;

// Re-export main types for convenience
pub use backend::{BodyHandle, FixtureHandle, PhysicsBackend};
pub use bootstrap::{create_world, Scene};
pub use fixtures::{ArmFixture, StaticBodyDesc, StaticPart, TableFixture};
pub use generator::{spawn_random_objects, SpawnBounds};
pub use physics::RapierWorld;
pub use shapes::{BodySpec, ColorName, MaterialSpec, ShapeClass, ShapeSpec, VisualShape};

// Error types
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("Physics backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    #[error("Fixture '{name}' is invalid: {reason}")]
    InvalidFixture { name: String, reason: String },

    #[error("World setup out of order: {reason}")]
    SetupOrder { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Physics step {step} failed: {reason}")]
    StepFailure { step: u64, reason: String },

    #[error("Physics backend connection already released")]
    Disconnected,

    #[error("Body {handle} was not issued by this world")]
    UnknownBody { handle: BodyHandle },
}

pub type WorldResult<T> = Result<T, WorldError>;

impl WorldError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        WorldError::InvalidInput { reason: reason.into() }
    }

    /// Caller-input errors are rejected before any side effect; everything
    /// else ends the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WorldError::InvalidInput { .. })
    }
}
