use glam::Vec3;
use tracing::info;

use super::backend::{BodyHandle, FixtureHandle, PhysicsBackend};
use super::fixtures::{ArmFixture, StaticBodyDesc, TableFixture};
use super::physics::RapierWorld;
use super::WorldResult;
use crate::config::WorldSettings;

/// A bootstrapped world together with its fixtures
pub struct Scene<W: PhysicsBackend> {
    pub world: W,
    pub ground: BodyHandle,
    pub table: BodyHandle,
    pub arm: FixtureHandle,
    pub arm_fixture: ArmFixture,
    /// Height of the table top face
    pub support_height: f32,
}

impl<W: PhysicsBackend> std::fmt::Debug for Scene<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("ground", &self.ground)
            .field("table", &self.table)
            .field("arm", &self.arm)
            .field("support_height", &self.support_height)
            .finish()
    }
}

/// Create the rapier world and register the fixtures.
///
/// Any error here is fatal: nothing downstream can run without a world.
pub fn create_world(settings: &WorldSettings) -> WorldResult<Scene<RapierWorld>> {
    let world = RapierWorld::connect(settings.timestep)?.with_length_unit(settings.length_unit)?;
    bootstrap(world, settings)
}

/// Set gravity once, then register ground, table and arm in that order
pub fn bootstrap<W: PhysicsBackend>(mut world: W, settings: &WorldSettings) -> WorldResult<Scene<W>> {
    world.set_gravity(Vec3::from_array(settings.gravity))?;

    let ground = world.register_static(&StaticBodyDesc::ground_plane())?;

    let table_fixture = TableFixture::default();
    let table = world.register_static(&table_fixture.to_static_desc())?;
    let support_height = table_fixture.support_height();

    let arm_fixture = ArmFixture::seven_dof(
        Vec3::from_array(settings.arm_base_position),
        Vec3::from_array(settings.arm_base_euler),
    );
    let arm = arm_fixture.register(&mut world)?;

    info!(
        "🌍 World ready: gravity {:?}, support surface at {:.3} m, {} fixture bodies",
        settings.gravity,
        support_height,
        world.body_count()
    );

    Ok(Scene {
        world,
        ground,
        table,
        arm,
        arm_fixture,
        support_height,
    })
}
