//! Overhead camera for the external viewer
//!
//! A [`CameraPose`] orbits a target point: yaw turns about world +Z, negative
//! pitch looks down, and the eye sits `distance` back along the view direction.

use glam::{Mat4, Vec3};
use tracing::{debug, info};

use crate::world::{WorldError, WorldResult};

/// Immutable orbit pose handed to a [`Viewer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    distance: f32,
    yaw: f32,
    pitch: f32,
    target: Vec3,
}

impl CameraPose {
    /// `yaw` and `pitch` are in degrees. Rejects a non-positive distance.
    pub fn new(distance: f32, yaw: f32, pitch: f32, target: Vec3) -> WorldResult<Self> {
        let pose = Self {
            distance,
            yaw,
            pitch,
            target,
        };
        pose.validate()?;
        Ok(pose)
    }

    pub fn validate(&self) -> WorldResult<()> {
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return Err(WorldError::invalid_input(format!(
                "camera distance must be positive, got {}",
                self.distance
            )));
        }
        if !(self.yaw.is_finite() && self.pitch.is_finite() && self.target.is_finite()) {
            return Err(WorldError::invalid_input("camera angles and target must be finite"));
        }
        Ok(())
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Unit view direction, from the eye toward the target
    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.sin() * pitch.cos(), yaw.cos() * pitch.cos(), pitch.sin())
    }

    pub fn eye(&self) -> Vec3 {
        self.target - self.forward() * self.distance
    }

    /// Right-handed look-at matrix with world +Z up
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.forward();
        // Looking straight up or down leaves +Z parallel to the view direction
        let up = if forward.cross(Vec3::Z).length_squared() < 1e-8 {
            Vec3::Y
        } else {
            Vec3::Z
        };
        Mat4::look_at_rh(self.eye(), self.target, up)
    }
}

/// Camera state held by a viewer after a pose was applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerCamera {
    pub pose: CameraPose,
    pub eye: Vec3,
    pub view: Mat4,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl ViewerCamera {
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fovy.to_radians(), self.aspect, self.znear, self.zfar);
        proj * self.view
    }
}

/// External visualizer that accepts a camera pose
pub trait Viewer {
    fn reset_camera(&mut self, pose: &CameraPose) -> WorldResult<()>;

    fn camera(&self) -> Option<&ViewerCamera>;
}

/// Headless viewer that keeps the resulting camera state
#[derive(Debug, Clone)]
pub struct DebugViewer {
    camera: Option<ViewerCamera>,
    aspect: f32,
    fovy: f32,
}

impl Default for DebugViewer {
    fn default() -> Self {
        Self::new(4.0 / 3.0, 60.0)
    }
}

impl DebugViewer {
    pub fn new(aspect: f32, fovy: f32) -> Self {
        Self {
            camera: None,
            aspect,
            fovy,
        }
    }
}

impl Viewer for DebugViewer {
    fn reset_camera(&mut self, pose: &CameraPose) -> WorldResult<()> {
        pose.validate()?;
        let camera = ViewerCamera {
            pose: *pose,
            eye: pose.eye(),
            view: pose.view_matrix(),
            aspect: self.aspect,
            fovy: self.fovy,
            znear: 0.01,
            zfar: 100.0,
        };
        debug!("📷 Viewer camera eye at {}", camera.eye);
        self.camera = Some(camera);
        Ok(())
    }

    fn camera(&self) -> Option<&ViewerCamera> {
        self.camera.as_ref()
    }
}

/// Apply `pose` to `viewer`. Applying the same pose again is a no-op.
pub fn apply_camera_pose<V: Viewer + ?Sized>(viewer: &mut V, pose: &CameraPose) -> WorldResult<()> {
    viewer.reset_camera(pose)?;
    info!(
        "📷 Camera set: distance {}, yaw {}°, pitch {}°, target {}",
        pose.distance(),
        pose.yaw(),
        pose.pitch(),
        pose.target()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overhead() -> CameraPose {
        CameraPose::new(1.5, 0.0, -60.9, Vec3::new(0.0, 0.0, 0.6)).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_distance() {
        for distance in [0.0, -1.0, f32::NAN] {
            let result = CameraPose::new(distance, 0.0, -60.0, Vec3::ZERO);
            assert!(matches!(result, Err(WorldError::InvalidInput { .. })));
        }
    }

    #[test]
    fn test_overhead_eye_is_above_target() {
        let pose = overhead();
        let eye = pose.eye();
        assert!(eye.z > pose.target().z);
        assert!((eye.distance(pose.target()) - 1.5).abs() < 1e-5);
        // yaw 0 puts the eye on the -Y side
        assert!(eye.y < 0.0);
        assert!(eye.x.abs() < 1e-6);
    }

    #[test]
    fn test_target_projects_to_view_center() {
        let pose = overhead();
        let in_view = pose.view_matrix().transform_point3(pose.target());
        assert!(in_view.x.abs() < 1e-5);
        assert!(in_view.y.abs() < 1e-5);
        assert!((in_view.z + 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_straight_down_is_not_degenerate() {
        let pose = CameraPose::new(2.0, 0.0, -90.0, Vec3::ZERO).unwrap();
        assert!(pose.view_matrix().is_finite());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let pose = overhead();
        let mut once = DebugViewer::default();
        apply_camera_pose(&mut once, &pose).unwrap();

        let mut twice = DebugViewer::default();
        apply_camera_pose(&mut twice, &pose).unwrap();
        apply_camera_pose(&mut twice, &pose).unwrap();

        assert_eq!(once.camera(), twice.camera());
        let camera = twice.camera().unwrap();
        assert!(camera.build_view_projection_matrix().is_finite());
    }
}
