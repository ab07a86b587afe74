//! Static fixtures of the tabletop scene
//!
//! Fixtures are immovable: the ground plane, the table the objects land on,
//! and a fixed-base serial arm standing on the table.

use glam::{Quat, Vec3};
use tracing::debug;

use super::backend::{BodyHandle, FixtureHandle, PhysicsBackend};
use super::shapes::{MaterialSpec, ShapeSpec};
use super::{WorldError, WorldResult};

/// Geometry of one part of a static body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixtureGeometry {
    /// Infinite plane through the part origin, normal along +Z
    Plane,
    Solid(ShapeSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticPart {
    pub geometry: FixtureGeometry,
    /// Offset from the body origin, in the body frame
    pub offset: Vec3,
    pub material: MaterialSpec,
}

/// An immovable body made of one or more parts
#[derive(Debug, Clone, PartialEq)]
pub struct StaticBodyDesc {
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub parts: Vec<StaticPart>,
}

impl StaticBodyDesc {
    pub fn ground_plane() -> Self {
        Self {
            name: "ground".to_string(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            parts: vec![StaticPart {
                geometry: FixtureGeometry::Plane,
                offset: Vec3::ZERO,
                material: MaterialSpec::new([0.9, 0.9, 0.9, 1.0]),
            }],
        }
    }

    pub fn validate(&self) -> WorldResult<()> {
        if self.parts.is_empty() {
            return Err(WorldError::InvalidFixture {
                name: self.name.clone(),
                reason: "no parts".to_string(),
            });
        }
        for part in &self.parts {
            if let FixtureGeometry::Solid(shape) = part.geometry {
                shape.validate().map_err(|e| WorldError::InvalidFixture {
                    name: self.name.clone(),
                    reason: e.to_string(),
                })?;
            }
        }
        Ok(())
    }
}

/// Four-legged table whose top face is the support surface
#[derive(Debug, Clone, PartialEq)]
pub struct TableFixture {
    pub position: Vec3,
    /// Half-extents of the table top slab
    pub top_half_extents: Vec3,
    /// Height of the slab center above the table origin
    pub top_center_height: f32,
    pub leg_half_width: f32,
    /// Leg centers are inset from the slab corners by this much
    pub leg_inset: f32,
}

impl Default for TableFixture {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            top_half_extents: Vec3::new(0.75, 0.5, 0.025),
            top_center_height: 0.6,
            leg_half_width: 0.05,
            leg_inset: 0.1,
        }
    }
}

impl TableFixture {
    /// World height of the table top face
    pub fn support_height(&self) -> f32 {
        self.position.z + self.top_center_height + self.top_half_extents.z
    }

    pub fn to_static_desc(&self) -> StaticBodyDesc {
        let material = MaterialSpec::new([0.55, 0.35, 0.2, 1.0]);
        let mut parts = vec![StaticPart {
            geometry: FixtureGeometry::Solid(ShapeSpec::Box {
                half_extents: self.top_half_extents,
            }),
            offset: Vec3::new(0.0, 0.0, self.top_center_height),
            material,
        }];

        let leg_half_height = (self.top_center_height - self.top_half_extents.z) / 2.0;
        let lx = self.top_half_extents.x - self.leg_inset;
        let ly = self.top_half_extents.y - self.leg_inset;
        for (sx, sy) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
            parts.push(StaticPart {
                geometry: FixtureGeometry::Solid(ShapeSpec::Box {
                    half_extents: Vec3::new(self.leg_half_width, self.leg_half_width, leg_half_height),
                }),
                offset: Vec3::new(sx * lx, sy * ly, leg_half_height),
                material,
            });
        }

        StaticBodyDesc {
            name: "table".to_string(),
            position: self.position,
            rotation: Quat::IDENTITY,
            parts,
        }
    }
}

/// One cylindrical link of the arm, extending along its local +Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmLink {
    pub length: f32,
    pub radius: f32,
}

/// Fixed-base serial manipulator, kept as scenery.
///
/// Each link is its own immovable body, stacked end to end from the base in
/// the arm's zero pose. No joints are simulated and the links never move;
/// the arm only collides with the objects dropped around it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmFixture {
    pub name: String,
    pub base_position: Vec3,
    pub base_orientation: Quat,
    pub links: Vec<ArmLink>,
}

impl ArmFixture {
    pub fn new(name: impl Into<String>, base_position: Vec3, base_orientation: Quat, links: Vec<ArmLink>) -> Self {
        Self {
            name: name.into(),
            base_position,
            base_orientation,
            links,
        }
    }

    /// Base plus seven links in the proportions of a common industrial cobot
    pub fn seven_dof(base_position: Vec3, base_euler: Vec3) -> Self {
        let link = |length, radius| ArmLink { length, radius };
        let links = vec![
            link(0.1575, 0.07),
            link(0.2025, 0.065),
            link(0.2045, 0.065),
            link(0.2155, 0.06),
            link(0.1845, 0.06),
            link(0.2155, 0.055),
            link(0.081, 0.05),
            link(0.045, 0.04),
        ];
        let orientation = Quat::from_euler(glam::EulerRot::XYZ, base_euler.x, base_euler.y, base_euler.z);
        Self::new("arm", base_position, orientation, links)
    }

    pub fn validate(&self) -> WorldResult<()> {
        let invalid = |reason: String| WorldError::InvalidFixture {
            name: self.name.clone(),
            reason,
        };
        if self.links.is_empty() {
            return Err(invalid("no links".to_string()));
        }
        for (i, link) in self.links.iter().enumerate() {
            if !(link.length > 0.0 && link.radius > 0.0) {
                return Err(invalid(format!("link {} has non-positive dimensions", i)));
            }
        }
        if !(self.base_position.is_finite() && self.base_orientation.is_finite()) {
            return Err(invalid("base pose is not finite".to_string()));
        }
        Ok(())
    }

    /// World pose (center, rotation) of every link, stacked along the base's +Z
    pub fn link_poses(&self) -> Vec<(Vec3, Quat)> {
        let rotation = self.base_orientation.normalize();
        let axis = rotation * Vec3::Z;
        let mut origin = self.base_position;

        self.links
            .iter()
            .map(|link| {
                let center = origin + axis * (link.length / 2.0);
                origin += axis * link.length;
                (center, rotation)
            })
            .collect()
    }

    /// Register every link as an immovable body
    pub fn register<W: PhysicsBackend>(&self, world: &mut W) -> WorldResult<FixtureHandle> {
        self.validate()?;
        let material = MaterialSpec::new([1.0, 0.45, 0.0, 1.0]);
        let mut links = Vec::with_capacity(self.links.len());

        for (i, (link, (center, rotation))) in self.links.iter().zip(self.link_poses()).enumerate() {
            let desc = StaticBodyDesc {
                name: format!("{}_link{}", self.name, i),
                position: center,
                rotation,
                parts: vec![StaticPart {
                    geometry: FixtureGeometry::Solid(ShapeSpec::Cylinder {
                        radius: link.radius,
                        height: link.length,
                    }),
                    offset: Vec3::ZERO,
                    material,
                }],
            };
            links.push(world.register_static(&desc)?);
        }

        debug!("🦾 Registered fixture '{}' with {} links", self.name, links.len());
        Ok(FixtureHandle {
            name: self.name.clone(),
            links,
        })
    }

    /// Handle of the anchored base link
    pub fn base_link(handle: &FixtureHandle) -> Option<BodyHandle> {
        handle.links.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_table_support_height() {
        let table = TableFixture::default();
        assert!((table.support_height() - 0.625).abs() < EPS);
    }

    #[test]
    fn test_table_legs_reach_floor() {
        let desc = TableFixture::default().to_static_desc();
        assert_eq!(desc.parts.len(), 5);
        for leg in &desc.parts[1..] {
            match leg.geometry {
                FixtureGeometry::Solid(ShapeSpec::Box { half_extents }) => {
                    assert!((leg.offset.z - half_extents.z).abs() < EPS);
                }
                other => panic!("unexpected leg geometry {:?}", other),
            }
        }
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_arm_links_stack_vertically() {
        let arm = ArmFixture::seven_dof(Vec3::new(0.0, 0.2, 0.6), Vec3::ZERO);
        let poses = arm.link_poses();
        assert_eq!(poses.len(), 8);
        for (center, rotation) in &poses {
            assert!((center.x).abs() < EPS);
            assert!((center.y - 0.2).abs() < EPS);
            assert!(rotation.abs_diff_eq(Quat::IDENTITY, EPS));
        }
        let total: f32 = arm.links.iter().map(|l| l.length).sum();
        let (top_center, _) = poses[7];
        let top = top_center.z + arm.links[7].length / 2.0;
        assert!((top - (0.6 + total)).abs() < 1e-4);
    }

    #[test]
    fn test_tilted_base_tilts_the_column() {
        let arm = ArmFixture::seven_dof(Vec3::ZERO, Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let poses = arm.link_poses();
        // A quarter turn about Y lays the column along +X
        let (first, _) = poses[0];
        assert!((first.x - arm.links[0].length / 2.0).abs() < EPS);
        assert!(first.z.abs() < EPS);
    }

    #[test]
    fn test_arm_validation() {
        let arm = ArmFixture::new("empty", Vec3::ZERO, Quat::IDENTITY, vec![]);
        assert!(matches!(arm.validate(), Err(WorldError::InvalidFixture { .. })));

        let arm = ArmFixture::new(
            "flat",
            Vec3::ZERO,
            Quat::IDENTITY,
            vec![ArmLink { length: 0.0, radius: 0.05 }],
        );
        assert!(arm.validate().is_err());
    }
}
