//! Data-driven game balance
//!
//! Every gameplay constant lives here so a settings file can override it.
//! Defaults reproduce the reference game exactly.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A tuning value outside the range the simulation can run with
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("tuning.{field} must be {requirement}")]
pub struct InvalidTuning {
    pub field: &'static str,
    pub requirement: &'static str,
}

/// Gameplay constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Projectiles ===
    /// Distance a projectile travels along -Z each frame
    pub projectile_step: f32,
    /// Projectiles at or beyond this Z are culled
    pub cull_z: f32,
    /// Maximum number of live projectiles
    pub max_projectiles: usize,
    /// Projectile-target distance that counts as a hit
    pub hit_radius: f32,

    // === Aircraft ===
    /// Velocity gained per frame while steering
    pub acceleration: f32,
    /// Maximum steering speed (either direction)
    pub velocity_cap: f32,
    /// Fraction of `acceleration` lost per frame
    pub decay_factor: f32,
    /// Aircraft position after a reset
    pub actor_start: Vec3,

    // === Balloon grid ===
    pub grid_rows: usize,
    pub grid_cols: usize,
    /// Distance between neighbouring balloons
    pub grid_spacing: f32,
    /// Position of the balloon at row 0, column 0
    pub grid_origin: Vec3,
    /// Max X/Z offset applied to each balloon (0 = exact grid)
    pub target_jitter: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            projectile_step: 2.0,
            cull_z: -100.0,
            max_projectiles: 10,
            hit_radius: 2.0,

            acceleration: 0.05,
            velocity_cap: 0.5,
            decay_factor: 0.2,
            actor_start: Vec3::new(0.0, 0.0, 30.0),

            grid_rows: 5,
            grid_cols: 10,
            grid_spacing: 10.0,
            grid_origin: Vec3::new(-45.0, 0.0, -40.0),
            target_jitter: 0.0,
        }
    }
}

impl Tuning {
    /// Per-frame projectile displacement
    #[inline]
    pub fn projectile_displacement(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, -self.projectile_step)
    }

    /// Velocity lost per idle frame
    #[inline]
    pub fn decay_per_frame(&self) -> f32 {
        self.acceleration * self.decay_factor
    }

    /// Check the values the simulation relies on
    ///
    /// Projectiles must move toward the cull plane or the pool jams at the
    /// cap, and a negative speed cap inverts steering.
    pub fn validate(&self) -> Result<(), InvalidTuning> {
        const POSITIVE: &str = "finite and > 0";
        const NON_NEGATIVE: &str = "finite and >= 0";
        const FINITE: &str = "finite";

        let non_negative = |v: f32| v >= 0.0 && v.is_finite();
        let checks = [
            ("projectile_step", self.projectile_step > 0.0 && self.projectile_step.is_finite(), POSITIVE),
            ("cull_z", self.cull_z.is_finite(), FINITE),
            ("hit_radius", non_negative(self.hit_radius), NON_NEGATIVE),
            ("acceleration", non_negative(self.acceleration), NON_NEGATIVE),
            ("velocity_cap", non_negative(self.velocity_cap), NON_NEGATIVE),
            ("decay_factor", non_negative(self.decay_factor), NON_NEGATIVE),
            ("target_jitter", self.target_jitter.is_finite(), FINITE),
        ];
        match checks.into_iter().find(|(_, ok, _)| !ok) {
            Some((field, _, requirement)) => Err(InvalidTuning { field, requirement }),
            None => Ok(()),
        }
    }

    /// Total balloons in a fresh grid
    pub fn target_count(&self) -> usize {
        self.grid_rows * self.grid_cols
    }
}
