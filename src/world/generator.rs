//! Procedural object generator
//!
//! Every object is drawn independently: a shape class and a palette color
//! uniformly at random, fixed dimensions per class, and a spawn point uniform
//! over the bounds at a constant height. Freshly spawned objects may overlap;
//! the solver separates them over the first few steps.

use glam::Vec3;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::backend::{BodyHandle, PhysicsBackend};
use super::shapes::{BodySpec, ColorName, ShapeClass};
use super::{WorldError, WorldResult};

/// Mass of every spawned object, in kilograms
pub const OBJECT_MASS: f32 = 0.1;

/// Horizontal region objects are dropped into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Default for SpawnBounds {
    fn default() -> Self {
        Self {
            x_min: -0.3,
            x_max: 0.3,
            y_min: -0.3,
            y_max: 0.3,
        }
    }
}

impl SpawnBounds {
    pub fn validate(&self) -> WorldResult<()> {
        let finite = [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(WorldError::invalid_input("spawn bounds must be finite"));
        }
        if self.x_min > self.x_max || self.y_min > self.y_max {
            return Err(WorldError::invalid_input(format!(
                "spawn bounds are inverted: x [{}, {}], y [{}, {}]",
                self.x_min, self.x_max, self.y_min, self.y_max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

/// Draw one body spec
pub fn random_body_spec<R: Rng>(rng: &mut R, bounds: &SpawnBounds, spawn_height: f32) -> BodySpec {
    let class = *ShapeClass::ALL.choose(rng).unwrap_or(&ShapeClass::Box);
    let color = *ColorName::PALETTE.choose(rng).unwrap_or(&ColorName::Red);
    let x = rng.random_range(bounds.x_min..=bounds.x_max);
    let y = rng.random_range(bounds.y_min..=bounds.y_max);

    BodySpec {
        shape: class.standard_shape(),
        material: color.material(),
        mass: OBJECT_MASS,
        spawn_position: Vec3::new(x, y, spawn_height),
    }
}

/// Spawn `count` random objects into `world` and return their handles.
///
/// A negative count, inverted bounds or a non-finite height are rejected
/// before anything is registered.
pub fn spawn_random_objects<W, R>(
    world: &mut W,
    rng: &mut R,
    count: i64,
    bounds: &SpawnBounds,
    spawn_height: f32,
) -> WorldResult<Vec<BodyHandle>>
where
    W: PhysicsBackend + ?Sized,
    R: Rng,
{
    let count = usize::try_from(count)
        .map_err(|_| WorldError::invalid_input(format!("object count must be non-negative, got {}", count)))?;
    bounds.validate()?;
    if !spawn_height.is_finite() {
        return Err(WorldError::invalid_input("spawn height must be finite"));
    }

    let mut handles = Vec::new();
    for _ in 0..count {
        let spec = random_body_spec(rng, bounds, spawn_height);
        let class = spec.shape.class();
        let position = spec.spawn_position;
        let handle = world.register_dynamic(spec)?;
        debug!("📦 Spawned {} {} at {}", class, handle, position);
        handles.push(handle);
    }

    info!("📦 Spawned {} random objects", handles.len());
    Ok(handles)
}
