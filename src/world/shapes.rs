use glam::Vec3;
use std::fmt;

use super::{WorldError, WorldResult};

/// Half-extent of the spawned cubes on every axis
pub const BOX_HALF_EXTENT: f32 = 0.025;
/// Radius of the spawned spheres
pub const SPHERE_RADIUS: f32 = 0.025;
/// Radius of the spawned cylinders
pub const CYLINDER_RADIUS: f32 = 0.025;
/// Full height of the spawned cylinders
pub const CYLINDER_HEIGHT: f32 = 0.05;

/// Shape class drawn by the object generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeClass {
    Box,
    Sphere,
    Cylinder,
}

impl ShapeClass {
    pub const ALL: [ShapeClass; 3] = [ShapeClass::Box, ShapeClass::Sphere, ShapeClass::Cylinder];

    /// The fixed-dimension shape used for spawned objects of this class
    pub fn standard_shape(self) -> ShapeSpec {
        match self {
            ShapeClass::Box => ShapeSpec::Box {
                half_extents: Vec3::splat(BOX_HALF_EXTENT),
            },
            ShapeClass::Sphere => ShapeSpec::Sphere { radius: SPHERE_RADIUS },
            ShapeClass::Cylinder => ShapeSpec::Cylinder {
                radius: CYLINDER_RADIUS,
                height: CYLINDER_HEIGHT,
            },
        }
    }
}

impl fmt::Display for ShapeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeClass::Box => write!(f, "box"),
            ShapeClass::Sphere => write!(f, "sphere"),
            ShapeClass::Cylinder => write!(f, "cylinder"),
        }
    }
}

/// Geometry shared by the collision and the visual representation of a body.
///
/// Cylinders stand upright: their axis runs along world +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeSpec {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    Cylinder { radius: f32, height: f32 },
}

impl ShapeSpec {
    pub fn class(&self) -> ShapeClass {
        match self {
            ShapeSpec::Box { .. } => ShapeClass::Box,
            ShapeSpec::Sphere { .. } => ShapeClass::Sphere,
            ShapeSpec::Cylinder { .. } => ShapeClass::Cylinder,
        }
    }

    /// Distance from the body origin to the lowest point of the shape
    pub fn bottom_offset(&self) -> f32 {
        match *self {
            ShapeSpec::Box { half_extents } => half_extents.z,
            ShapeSpec::Sphere { radius } => radius,
            ShapeSpec::Cylinder { height, .. } => height / 2.0,
        }
    }

    pub fn validate(&self) -> WorldResult<()> {
        let ok = match *self {
            ShapeSpec::Box { half_extents } => {
                half_extents.is_finite() && half_extents.min_element() > 0.0
            }
            ShapeSpec::Sphere { radius } => radius.is_finite() && radius > 0.0,
            ShapeSpec::Cylinder { radius, height } => {
                radius.is_finite() && height.is_finite() && radius > 0.0 && height > 0.0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(WorldError::invalid_input(format!("degenerate shape {:?}", self)))
        }
    }

    /// Build the visual representation from this same geometry
    pub fn to_visual(&self, material: MaterialSpec) -> VisualShape {
        VisualShape { shape: *self, material }
    }
}

/// Named entries of the object palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorName {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Orange,
}

impl ColorName {
    pub const PALETTE: [ColorName; 6] = [
        ColorName::Red,
        ColorName::Green,
        ColorName::Blue,
        ColorName::Yellow,
        ColorName::Purple,
        ColorName::Orange,
    ];

    pub fn rgba(self) -> [f32; 4] {
        match self {
            ColorName::Red => [1.0, 0.0, 0.0, 1.0],
            ColorName::Green => [0.0, 1.0, 0.0, 1.0],
            ColorName::Blue => [0.0, 0.0, 1.0, 1.0],
            ColorName::Yellow => [1.0, 1.0, 0.0, 1.0],
            ColorName::Purple => [0.5, 0.0, 0.5, 1.0],
            ColorName::Orange => [1.0, 0.65, 0.0, 1.0],
        }
    }

    pub fn material(self) -> MaterialSpec {
        MaterialSpec { rgba: self.rgba() }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorName::Red => "red",
            ColorName::Green => "green",
            ColorName::Blue => "blue",
            ColorName::Yellow => "yellow",
            ColorName::Purple => "purple",
            ColorName::Orange => "orange",
        };
        f.write_str(name)
    }
}

/// RGBA color, purely cosmetic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSpec {
    pub rgba: [f32; 4],
}

impl MaterialSpec {
    pub fn new(rgba: [f32; 4]) -> Self {
        Self { rgba }
    }

    /// Flat grey used for fixtures
    pub fn fixture_grey() -> Self {
        Self::new([0.6, 0.6, 0.6, 1.0])
    }
}

/// What the viewer draws for a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualShape {
    pub shape: ShapeSpec,
    pub material: MaterialSpec,
}

/// Everything needed to register one dynamic body.
///
/// Consumed by [`PhysicsBackend::register_dynamic`](super::PhysicsBackend::register_dynamic);
/// afterwards only the returned handle is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub shape: ShapeSpec,
    pub material: MaterialSpec,
    pub mass: f32,
    pub spawn_position: Vec3,
}

impl BodySpec {
    pub fn validate(&self) -> WorldResult<()> {
        self.shape.validate()?;
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(WorldError::invalid_input(format!(
                "dynamic body mass must be positive, got {}",
                self.mass
            )));
        }
        if !self.spawn_position.is_finite() {
            return Err(WorldError::invalid_input("spawn position is not finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_shapes_match_class() {
        for class in ShapeClass::ALL {
            let shape = class.standard_shape();
            assert_eq!(shape.class(), class);
            assert!(shape.validate().is_ok());
        }
    }

    #[test]
    fn test_standard_dimensions() {
        assert_eq!(
            ShapeClass::Box.standard_shape(),
            ShapeSpec::Box { half_extents: Vec3::splat(0.025) }
        );
        assert_eq!(ShapeClass::Sphere.standard_shape(), ShapeSpec::Sphere { radius: 0.025 });
        assert_eq!(
            ShapeClass::Cylinder.standard_shape(),
            ShapeSpec::Cylinder { radius: 0.025, height: 0.05 }
        );
    }

    #[test]
    fn test_visual_uses_same_geometry() {
        let shape = ShapeClass::Cylinder.standard_shape();
        let visual = shape.to_visual(ColorName::Orange.material());
        assert_eq!(visual.shape, shape);
        assert_eq!(visual.material.rgba, [1.0, 0.65, 0.0, 1.0]);
    }

    #[test]
    fn test_palette_is_distinct() {
        let palette = ColorName::PALETTE;
        assert_eq!(palette.len(), 6);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a.rgba(), b.rgba());
            }
        }
    }

    #[test]
    fn test_body_spec_rejects_bad_mass() {
        let spec = BodySpec {
            shape: ShapeClass::Box.standard_shape(),
            material: ColorName::Red.material(),
            mass: 0.0,
            spawn_position: Vec3::new(0.0, 0.0, 0.8),
        };
        assert!(matches!(spec.validate(), Err(WorldError::InvalidInput { .. })));
    }
}
