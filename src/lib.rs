//! Balloon Shooter - steer an aircraft and pop a grid of balloons
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity pools, collisions, game mode)
//! - `renderer`: Renderable objects, camera and the wgpu backend
//! - `assets`: Asset handles, procedural meshes, textures and shader validation
//! - `platform`: Native window, keyboard mapping and frame driver
//! - `tuning`: Data-driven game balance

pub mod assets;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep (one game frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default window size
    pub const WINDOW_WIDTH: u32 = 800;
    pub const WINDOW_HEIGHT: u32 = 600;

    /// Camera placement (fixed for the whole session)
    pub const CAMERA_EYE: Vec3 = Vec3::new(0.0, 40.0, 80.0);
    pub const CAMERA_TARGET: Vec3 = Vec3::ZERO;
    pub const CAMERA_UP: Vec3 = Vec3::Y;
    /// Vertical field of view in degrees
    pub const CAMERA_FOV_Y_DEG: f32 = 45.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 1000.0;

    /// Point light in world space
    pub const LIGHT_POS: Vec3 = Vec3::new(0.0, 50.0, 0.0);

    /// Below this magnitude a velocity counts as zero
    pub const VELOCITY_EPSILON: f32 = 1.0e-8;
}

/// Sign with a dead zone around zero
#[inline]
pub fn sign(x: f32) -> f32 {
    if x < -consts::VELOCITY_EPSILON {
        -1.0
    } else if x > consts::VELOCITY_EPSILON {
        1.0
    } else {
        0.0
    }
}
