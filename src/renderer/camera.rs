//! Fixed perspective camera

use glam::{Mat4, Vec3};

use crate::consts::{CAMERA_EYE, CAMERA_FAR, CAMERA_FOV_Y_DEG, CAMERA_NEAR, CAMERA_TARGET, CAMERA_UP};

/// View and projection matrices for the playfield
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub view: Mat4,
    pub projection: Mat4,
    aspect: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let aspect = aspect_ratio(width, height).unwrap_or(1.0);
        Self {
            view: Mat4::look_at_rh(CAMERA_EYE, CAMERA_TARGET, CAMERA_UP),
            projection: projection(aspect),
            aspect,
        }
    }

    /// Rebuild the projection for a new surface size
    ///
    /// Zero-sized surfaces (minimised windows) keep the previous projection.
    /// Returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let Some(aspect) = aspect_ratio(width, height) else {
            return false;
        };
        self.aspect = aspect;
        self.projection = projection(aspect);
        true
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Transform a world-space point into view space
    pub fn to_view(&self, point: Vec3) -> Vec3 {
        self.view.transform_point3(point)
    }
}

fn aspect_ratio(width: u32, height: u32) -> Option<f32> {
    (width > 0 && height > 0).then(|| width as f32 / height as f32)
}

fn projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(
        CAMERA_FOV_Y_DEG.to_radians(),
        aspect,
        CAMERA_NEAR,
        CAMERA_FAR,
    )
}
