//! Projectile-balloon collision and projectile culling
//!
//! Hits are resolved in a stable two-phase pass: each projectile, in pool
//! order, claims the first unclaimed balloon within the hit radius, then both
//! pools are compacted once. This gives the same survivors as rescanning from
//! the start after every single hit, without removing during iteration.

use glam::Vec3;

use super::state::EntityPool;

/// One resolved projectile-balloon pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Pool index of the projectile before compaction
    pub projectile_index: usize,
    /// Pool index of the balloon before compaction
    pub target_index: usize,
    /// Balloon position at the moment it was hit
    pub target_pos: Vec3,
}

/// Whether two points are close enough to collide
#[inline]
pub fn within_radius(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance(b) <= radius
}

/// Find every hit without modifying the pools
///
/// Each projectile matches at most one balloon and each balloon at most one
/// projectile.
pub fn find_hits(projectiles: &EntityPool, targets: &EntityPool, hit_radius: f32) -> Vec<Hit> {
    let mut claimed = vec![false; targets.len()];
    let mut hits = Vec::new();

    for (pi, projectile) in projectiles.iter().enumerate() {
        let found = targets.iter().enumerate().find(|(ti, target)| {
            !claimed[*ti] && within_radius(projectile.position, target.position, hit_radius)
        });
        if let Some((ti, target)) = found {
            claimed[ti] = true;
            hits.push(Hit {
                projectile_index: pi,
                target_index: ti,
                target_pos: target.position,
            });
        }
    }

    hits
}

/// Remove every colliding projectile-balloon pair
///
/// Returns the removed pairs in projectile order. Running it a second time
/// without moving anything removes nothing.
pub fn resolve_collisions(
    projectiles: &mut EntityPool,
    targets: &mut EntityPool,
    hit_radius: f32,
) -> Vec<Hit> {
    let hits = find_hits(projectiles, targets, hit_radius);
    if hits.is_empty() {
        return hits;
    }

    let mut projectile_flags = vec![false; projectiles.len()];
    let mut target_flags = vec![false; targets.len()];
    for hit in &hits {
        projectile_flags[hit.projectile_index] = true;
        target_flags[hit.target_index] = true;
    }
    projectiles.remove_flagged(&projectile_flags);
    targets.remove_flagged(&target_flags);

    hits
}

/// Drop projectiles that have flown past `cull_z`
///
/// Only the front is inspected: projectiles spawn in order and all move at the
/// same speed, so the oldest one is always the furthest along.
pub fn cull_projectiles(projectiles: &mut EntityPool, cull_z: f32) -> usize {
    projectiles.pop_front_while(|p| p.position.z <= cull_z)
}
