//! Rapier-backed physics world
//!
//! Wraps the rapier3d pipeline state behind [`PhysicsBackend`]. The world is
//! Z-up; rapier cylinders run along their local Y axis, so cylinder colliders
//! are tipped onto +Z to stay congruent with the visual shape.
//!
//! Every body is either fixed or a free dynamic body. Fixtures are assembled
//! from fixed bodies, so the joint sets rapier's pipeline requires stay empty.

use glam::{Quat, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info, trace};

use super::backend::{BodyHandle, PhysicsBackend};
use super::fixtures::{FixtureGeometry, StaticBodyDesc};
use super::shapes::{BodySpec, ShapeSpec, VisualShape};
use super::{WorldError, WorldResult};

/// Linear velocity damping of spawned bodies
const LINEAR_DAMPING: f32 = 0.5;
/// Angular damping of spawned bodies; stands in for rolling resistance so
/// spheres and tipped cylinders come to rest instead of rolling off the table
const ANGULAR_DAMPING: f32 = 25.0;
/// Penetration-correction speed cap, in length units per second. Bodies that
/// spawn overlapping a fixture or each other are eased apart at no more than
/// this speed.
const MAX_CORRECTIVE_VELOCITY: f32 = 2.0;
/// Contact prediction distance for fast-moving bodies, in meters
const SOFT_CCD_PREDICTION: f32 = 0.02;

/// Source of per-world ids, so handles from one world never resolve in another
static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
struct BodyEntry {
    rigid_body: RigidBodyHandle,
    /// Set for single-part bodies; compound fixtures have no single visual
    visual: Option<VisualShape>,
    dynamic: bool,
}

pub struct RapierWorld {
    id: u64,
    gravity: Option<Vec3>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    /// Always empty
    impulse_joints: ImpulseJointSet,
    /// Always empty
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    entries: HashMap<BodyHandle, BodyEntry>,
    next_handle: u64,
    steps_taken: u64,
    connected: bool,
}

impl RapierWorld {
    /// Create a world that advances `timestep` seconds per step.
    ///
    /// Gravity is not set yet; see [`PhysicsBackend::set_gravity`].
    pub fn connect(timestep: f32) -> WorldResult<Self> {
        if !(timestep.is_finite() && timestep > 0.0) {
            return Err(WorldError::BackendUnavailable {
                reason: format!("cannot create a world with timestep {}", timestep),
            });
        }

        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = timestep;
        integration_parameters.normalized_max_corrective_velocity = MAX_CORRECTIVE_VELOCITY;

        let id = NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed);
        info!("⚙️ Physics world {} created (timestep {:.6}s)", id, timestep);
        Ok(Self {
            id,
            gravity: None,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            entries: HashMap::new(),
            next_handle: 0,
            steps_taken: 0,
            connected: true,
        })
    }

    /// Typical object size, used by the solver to scale its tolerances
    pub fn with_length_unit(mut self, length_unit: f32) -> WorldResult<Self> {
        if !(length_unit.is_finite() && length_unit > 0.0) {
            return Err(WorldError::invalid_input(format!(
                "length unit must be positive, got {}",
                length_unit
            )));
        }
        self.integration_parameters.length_unit = length_unit;
        Ok(self)
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    fn ensure_ready(&self) -> WorldResult<()> {
        if !self.connected {
            return Err(WorldError::Disconnected);
        }
        if self.gravity.is_none() {
            return Err(WorldError::SetupOrder {
                reason: "gravity must be set before bodies are registered or stepped".to_string(),
            });
        }
        Ok(())
    }

    fn issue_handle(&mut self, entry: BodyEntry) -> BodyHandle {
        let handle = BodyHandle::from_raw(self.id, self.next_handle);
        self.next_handle += 1;
        self.entries.insert(handle, entry);
        handle
    }

    fn entry(&self, handle: BodyHandle) -> WorldResult<&BodyEntry> {
        if handle.world() != self.id {
            return Err(WorldError::UnknownBody { handle });
        }
        self.entries.get(&handle).ok_or(WorldError::UnknownBody { handle })
    }

    fn rigid_body(&self, handle: BodyHandle) -> WorldResult<&RigidBody> {
        let entry = self.entry(handle)?;
        self.bodies
            .get(entry.rigid_body)
            .ok_or(WorldError::UnknownBody { handle })
    }
}

fn to_na_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_isometry(position: Vec3, rotation: Quat) -> Isometry3<Real> {
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z));
    Isometry3::from_parts(Translation3::new(position.x, position.y, position.z), rotation)
}

/// Collision geometry for a shape; the visual side uses the same [`ShapeSpec`].
pub(crate) fn collider_for(shape: &ShapeSpec) -> ColliderBuilder {
    match *shape {
        ShapeSpec::Box { half_extents } => ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z),
        ShapeSpec::Sphere { radius } => ColliderBuilder::ball(radius),
        ShapeSpec::Cylinder { radius, height } => {
            ColliderBuilder::cylinder(height / 2.0, radius).rotation(vector![FRAC_PI_2, 0.0, 0.0])
        }
    }
}

/// Read the collision geometry back out of a collider
pub(crate) fn shape_of(collider: &Collider) -> Option<ShapeSpec> {
    let shape = collider.shape();
    if let Some(cuboid) = shape.as_cuboid() {
        let h = cuboid.half_extents;
        return Some(ShapeSpec::Box {
            half_extents: Vec3::new(h.x, h.y, h.z),
        });
    }
    if let Some(ball) = shape.as_ball() {
        return Some(ShapeSpec::Sphere { radius: ball.radius });
    }
    if let Some(cylinder) = shape.as_cylinder() {
        return Some(ShapeSpec::Cylinder {
            radius: cylinder.radius,
            height: cylinder.half_height * 2.0,
        });
    }
    None
}

impl PhysicsBackend for RapierWorld {
    fn set_gravity(&mut self, gravity: Vec3) -> WorldResult<()> {
        if !self.connected {
            return Err(WorldError::Disconnected);
        }
        if self.gravity.is_some() {
            return Err(WorldError::SetupOrder {
                reason: "gravity is already set".to_string(),
            });
        }
        if !gravity.is_finite() {
            return Err(WorldError::invalid_input("gravity must be finite"));
        }
        debug!("⚙️ Gravity set to {}", gravity);
        self.gravity = Some(gravity);
        Ok(())
    }

    fn gravity(&self) -> Option<Vec3> {
        self.gravity
    }

    fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    fn register_static(&mut self, desc: &StaticBodyDesc) -> WorldResult<BodyHandle> {
        self.ensure_ready()?;
        desc.validate()?;

        let body = RigidBodyBuilder::fixed()
            .position(to_isometry(desc.position, desc.rotation))
            .build();
        let rigid_body = self.bodies.insert(body);

        for part in &desc.parts {
            let builder = match part.geometry {
                FixtureGeometry::Plane => ColliderBuilder::halfspace(Vector::<Real>::z_axis()),
                FixtureGeometry::Solid(shape) => collider_for(&shape),
            };
            let collider = builder.translation(to_na_vector(part.offset)).build();
            self.colliders.insert_with_parent(collider, rigid_body, &mut self.bodies);
        }

        let visual = match desc.parts.as_slice() {
            [part] if part.offset == Vec3::ZERO => match part.geometry {
                FixtureGeometry::Solid(shape) => Some(shape.to_visual(part.material)),
                FixtureGeometry::Plane => None,
            },
            _ => None,
        };

        let handle = self.issue_handle(BodyEntry {
            rigid_body,
            visual,
            dynamic: false,
        });
        debug!("🧱 Static body '{}' registered as {}", desc.name, handle);
        Ok(handle)
    }

    fn register_dynamic(&mut self, spec: BodySpec) -> WorldResult<BodyHandle> {
        self.ensure_ready()?;
        spec.validate()?;

        let body = RigidBodyBuilder::dynamic()
            .translation(to_na_vector(spec.spawn_position))
            .linear_damping(LINEAR_DAMPING)
            .angular_damping(ANGULAR_DAMPING)
            .soft_ccd_prediction(SOFT_CCD_PREDICTION)
            .build();
        let rigid_body = self.bodies.insert(body);
        let collider = collider_for(&spec.shape).mass(spec.mass).build();
        self.colliders.insert_with_parent(collider, rigid_body, &mut self.bodies);

        Ok(self.issue_handle(BodyEntry {
            rigid_body,
            visual: Some(spec.shape.to_visual(spec.material)),
            dynamic: true,
        }))
    }

    fn step(&mut self) -> WorldResult<()> {
        self.ensure_ready()?;
        let gravity = to_na_vector(self.gravity.unwrap_or(Vec3::ZERO));

        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.steps_taken += 1;

        for (handle, entry) in self.entries.iter().filter(|(_, e)| e.dynamic) {
            let finite = self
                .bodies
                .get(entry.rigid_body)
                .map(|b| b.translation().iter().all(|c| c.is_finite()))
                .unwrap_or(false);
            if !finite {
                error!("⚙️ Body {} left the finite domain at step {}", handle, self.steps_taken);
                return Err(WorldError::StepFailure {
                    step: self.steps_taken,
                    reason: format!("body {} has a non-finite pose", handle),
                });
            }
        }
        trace!("⚙️ Step {} complete", self.steps_taken);
        Ok(())
    }

    fn body_count(&self) -> usize {
        self.entries.len()
    }

    fn body_position(&self, handle: BodyHandle) -> WorldResult<Vec3> {
        let t = self.rigid_body(handle)?.translation();
        Ok(Vec3::new(t.x, t.y, t.z))
    }

    fn visual_shape(&self, handle: BodyHandle) -> WorldResult<Option<VisualShape>> {
        Ok(self.entry(handle)?.visual)
    }

    fn collision_shape(&self, handle: BodyHandle) -> WorldResult<Option<ShapeSpec>> {
        let body = self.rigid_body(handle)?;
        match body.colliders() {
            [collider] => Ok(self.colliders.get(*collider).and_then(shape_of)),
            _ => Ok(None),
        }
    }

    fn disconnect(&mut self) -> WorldResult<()> {
        if !self.connected {
            return Err(WorldError::Disconnected);
        }
        self.connected = false;
        info!(
            "⚙️ Physics world released after {} steps ({} bodies)",
            self.steps_taken,
            self.entries.len()
        );
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
