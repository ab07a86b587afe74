pub mod camera;

// Re-export the camera types as the main interface
pub use camera::{apply_camera_pose, CameraPose, DebugViewer, Viewer, ViewerCamera};
