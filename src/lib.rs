// tabletop-sim: randomized rigid bodies dropped onto a table, stepped in real time

pub mod utils;
pub mod config;
pub mod app;

pub mod rendering;
pub mod simulation;
pub mod world;

// Re-export commonly used types for convenience
pub use config::{SceneSettings, load_scene_settings};
pub use world::{WorldError, WorldResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
