//! Procedural mesh generation
//!
//! All game geometry is built from a handful of primitives at startup.
//! Indices are 32-bit triangle lists with counter-clockwise front faces.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::AssetError;
use crate::renderer::vertex::Vertex;

/// CPU-side triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Check the mesh is drawable before it reaches a backend
    pub fn validate(&self, label: &str) -> Result<(), AssetError> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(AssetError::load(label, "mesh has no geometry"));
        }
        if self.indices.len() % 3 != 0 {
            return Err(AssetError::load(
                label,
                format!("index count {} is not a triangle list", self.indices.len()),
            ));
        }
        let vertex_count = self.vertices.len() as u32;
        if let Some(bad) = self.indices.iter().find(|&&i| i >= vertex_count) {
            return Err(AssetError::load(
                label,
                format!("index {bad} out of range for {vertex_count} vertices"),
            ));
        }
        if self
            .vertices
            .iter()
            .any(|v| v.position.iter().chain(&v.normal).any(|c| !c.is_finite()))
        {
            return Err(AssetError::load(label, "non-finite vertex data"));
        }
        Ok(())
    }

    /// Shift every vertex by `offset`
    pub fn translated(mut self, offset: Vec3) -> Self {
        for v in &mut self.vertices {
            v.position = (Vec3::from(v.position) + offset).to_array();
        }
        self
    }

    /// Append another mesh, rebasing its indices
    pub fn merge(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}

/// Unit quad in the XY plane facing +Z, spanning -1..1
///
/// Used for full-screen overlays, where the positions are already in clip space.
pub fn quad() -> MeshData {
    let n = [0.0, 0.0, 1.0];
    MeshData {
        vertices: vec![
            Vertex::new([-1.0, -1.0, 0.0], n, [0.0, 1.0]),
            Vertex::new([1.0, -1.0, 0.0], n, [1.0, 1.0]),
            Vertex::new([1.0, 1.0, 0.0], n, [1.0, 0.0]),
            Vertex::new([-1.0, 1.0, 0.0], n, [0.0, 0.0]),
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Axis-aligned box centred on the origin with flat-shaded faces
pub fn cuboid(half: Vec3) -> MeshData {
    // (normal, u, v) with u × v = normal
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    let mut mesh = MeshData::default();
    for (normal, u, v) in FACES {
        let base = mesh.vertices.len() as u32;
        for (su, sv) in CORNERS {
            let position = (normal + u * su + v * sv) * half;
            let uv = [(su + 1.0) * 0.5, (1.0 - sv) * 0.5];
            mesh.vertices
                .push(Vertex::new(position.to_array(), normal.to_array(), uv));
        }
        mesh.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// UV-sphere stretched to `radii`
pub fn ellipsoid(radii: Vec3, stacks: u32, slices: u32) -> MeshData {
    let stacks = stacks.max(2);
    let slices = slices.max(3);
    let mut mesh = MeshData::default();

    for i in 0..=stacks {
        let phi = PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = TAU * j as f32 / slices as f32;
            let unit = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            let position = unit * radii;
            let normal = (unit / radii).normalize_or(Vec3::Y);
            let uv = [j as f32 / slices as f32, i as f32 / stacks as f32];
            mesh.vertices
                .push(Vertex::new(position.to_array(), normal.to_array(), uv));
        }
    }

    let row = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            mesh.indices.extend([a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

/// Player aircraft, nose towards -Z
pub fn aircraft() -> MeshData {
    let mut mesh = cuboid(Vec3::new(1.0, 0.6, 3.0));
    mesh.merge(&cuboid(Vec3::new(4.0, 0.15, 1.0)).translated(Vec3::new(0.0, 0.0, 0.3)));
    mesh.merge(&cuboid(Vec3::new(1.6, 0.1, 0.5)).translated(Vec3::new(0.0, 0.1, 2.5)));
    mesh.merge(&cuboid(Vec3::new(0.1, 0.8, 0.5)).translated(Vec3::new(0.0, 0.9, 2.5)));
    mesh
}

pub fn balloon() -> MeshData {
    ellipsoid(Vec3::new(1.2, 1.5, 1.2), 12, 16)
}

pub fn projectile() -> MeshData {
    cuboid(Vec3::new(0.15, 0.15, 0.6))
}
