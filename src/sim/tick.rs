//! Fixed timestep simulation tick
//!
//! One call is one game frame. Per-frame constants in [`Tuning`] are in
//! units per tick, so the tick rate sets the game speed.

use super::collision::{cull_projectiles, resolve_collisions};
use super::state::{Entity, GameEvent, GameMode, GameWorld};
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Steer left (held)
    pub left: bool,
    /// Steer right (held)
    pub right: bool,
    /// Fire (edge: pressed this frame)
    pub fire: bool,
    /// Confirm / start / restart (edge)
    pub confirm: bool,
}

/// Advance the world by one frame
pub fn tick(world: &mut GameWorld, input: &TickInput, tuning: &Tuning) {
    world.frame += 1;

    if input.confirm {
        handle_confirm(world, tuning);
    }

    if !world.mode.accepts_gameplay_input() {
        return;
    }

    world.stats.frames_in_play += 1;

    if input.fire {
        fire(world, tuning);
    }
    if input.left {
        world.actor.steer_left(tuning);
    }
    if input.right {
        world.actor.steer_right(tuning);
    }

    step_playing(world, tuning);
}

/// Confirm moves Start → Playing and Cleared → Start (with a reset)
fn handle_confirm(world: &mut GameWorld, tuning: &Tuning) {
    match world.mode {
        GameMode::Start => world.set_mode(GameMode::Playing),
        GameMode::Cleared => {
            world.reset(tuning);
            world.set_mode(GameMode::Start);
        }
        GameMode::Playing => {}
    }
}

/// Spawn a projectile at the aircraft unless the pool is full
pub fn fire(world: &mut GameWorld, tuning: &Tuning) {
    let at = world.actor.position;
    if world
        .projectiles
        .try_push_back(Entity::new(at), tuning.max_projectiles)
    {
        world.stats.shots_fired += 1;
        world.events.push(GameEvent::ProjectileFired { at });
    } else {
        world.events.push(GameEvent::FireIgnored);
    }
}

/// Advance, collide, cull, decay and check for the win, in that order
pub fn step_playing(world: &mut GameWorld, tuning: &Tuning) {
    let displacement = tuning.projectile_displacement();
    for projectile in world.projectiles.iter_mut() {
        projectile.position += displacement;
    }

    let hits = resolve_collisions(
        &mut world.projectiles,
        &mut world.targets,
        tuning.hit_radius,
    );
    for hit in &hits {
        world.stats.targets_popped += 1;
        world.events.push(GameEvent::TargetPopped { at: hit.target_pos });
    }

    let culled = cull_projectiles(&mut world.projectiles, tuning.cull_z);
    if culled > 0 {
        world.events.push(GameEvent::ProjectilesCulled { count: culled });
    }

    world.actor.decay(tuning);

    if world.targets.is_empty() {
        log::info!(
            "All balloons popped: {} shots in {} frames",
            world.stats.shots_fired,
            world.stats.frames_in_play
        );
        world.set_mode(GameMode::Cleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EntityPool;
    use glam::Vec3;

    fn confirm() -> TickInput {
        TickInput {
            confirm: true,
            ..Default::default()
        }
    }

    fn fire_input() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    fn playing_world(tuning: &Tuning) -> GameWorld {
        let mut world = GameWorld::new(12345, tuning);
        tick(&mut world, &confirm(), tuning);
        world
    }

    #[test]
    fn test_start_to_playing() {
        let tuning = Tuning::default();
        let mut world = GameWorld::new(12345, &tuning);
        assert_eq!(world.mode, GameMode::Start);

        tick(&mut world, &TickInput::default(), &tuning);
        assert_eq!(world.mode, GameMode::Start);

        tick(&mut world, &confirm(), &tuning);
        assert_eq!(world.mode, GameMode::Playing);
        assert_eq!(world.targets.len(), 50);
        assert_eq!(world.projectiles.len(), 0);
    }

    #[test]
    fn test_input_ignored_outside_playing() {
        let tuning = Tuning::default();
        let mut world = GameWorld::new(1, &tuning);
        let input = TickInput {
            left: true,
            fire: true,
            ..Default::default()
        };
        tick(&mut world, &input, &tuning);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.actor.position, tuning.actor_start);
        assert_eq!(world.actor.velocity, 0.0);
    }

    #[test]
    fn test_confirm_ignored_while_playing() {
        let tuning = Tuning::default();
        let mut world = playing_world(&tuning);
        tick(&mut world, &confirm(), &tuning);
        assert_eq!(world.mode, GameMode::Playing);
    }

    #[test]
    fn test_fire_cap() {
        let tuning = Tuning::default();
        let mut world = playing_world(&tuning);
        // Park the aircraft well away from the balloons
        world.actor.position = Vec3::new(500.0, 0.0, 30.0);
        world.drain_events();

        for _ in 0..11 {
            fire(&mut world, &tuning);
        }
        assert_eq!(world.projectiles.len(), 10);
        assert_eq!(world.stats.shots_fired, 10);
        let ignored = world
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::FireIgnored)
            .count();
        assert_eq!(ignored, 1);
    }

    #[test]
    fn test_projectiles_advance_and_cull() {
        let tuning = Tuning::default();
        let mut world = playing_world(&tuning);
        world.actor.position = Vec3::new(500.0, 0.0, 30.0);

        tick(&mut world, &fire_input(), &tuning);
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.projectiles.front().unwrap().position.z, 28.0);

        // 30 → -100 takes 65 steps; one already done
        for _ in 0..63 {
            tick(&mut world, &TickInput::default(), &tuning);
        }
        assert_eq!(world.projectiles.len(), 1);
        tick(&mut world, &TickInput::default(), &tuning);
        assert!(world.projectiles.is_empty());
    }

    #[test]
    fn test_same_frame_kill_at_hit_radius() {
        let tuning = Tuning::default();
        let mut world = playing_world(&tuning);
        let spawn = world.actor.position;
        // Exactly one hit radius ahead of the spawn point along the travel axis
        world.targets = [Entity::new(spawn + Vec3::new(0.0, 0.0, -tuning.hit_radius))]
            .into_iter()
            .collect();

        tick(&mut world, &fire_input(), &tuning);
        assert_eq!(world.projectiles.len(), 0);
        assert_eq!(world.targets.len(), 0);
        assert_eq!(world.mode, GameMode::Cleared);
    }

    #[test]
    fn test_velocity_capped_and_decays_to_zero() {
        let tuning = Tuning::default();
        let mut world = playing_world(&tuning);
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..200 {
            tick(&mut world, &right, &tuning);
            assert!(world.actor.velocity.abs() <= tuning.velocity_cap);
        }
        assert!(world.actor.velocity > 0.0);

        let left = TickInput {
            left: true,
            ..Default::default()
        };
        for _ in 0..200 {
            tick(&mut world, &left, &tuning);
            assert!(world.actor.velocity.abs() <= tuning.velocity_cap);
        }
        assert!(world.actor.velocity < 0.0);

        let x_before = world.actor.position.x;
        for _ in 0..60 {
            tick(&mut world, &TickInput::default(), &tuning);
        }
        assert_eq!(world.actor.velocity, 0.0);
        // No steering key, no movement
        assert_eq!(world.actor.position.x, x_before);
    }

    #[test]
    fn test_steering_moves_aircraft() {
        let tuning = Tuning::default();
        let mut world = playing_world(&tuning);
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        tick(&mut world, &left, &tuning);
        assert!((world.actor.position.x - -0.05).abs() < 1e-6);
    }

    #[test]
    fn test_clear_and_restart_resets_grid() {
        let tuning = Tuning::default();
        let mut world = playing_world(&tuning);
        let initial: Vec<Entity> = world.targets.iter().copied().collect();

        world.targets = EntityPool::new();
        world.projectiles.push_back(Entity::new(Vec3::ZERO));
        world.actor.position.x = 12.0;
        tick(&mut world, &TickInput::default(), &tuning);
        assert_eq!(world.mode, GameMode::Cleared);

        // Gameplay input does nothing while cleared
        tick(&mut world, &fire_input(), &tuning);
        assert_eq!(world.mode, GameMode::Cleared);

        tick(&mut world, &confirm(), &tuning);
        assert_eq!(world.mode, GameMode::Start);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.actor.position, tuning.actor_start);
        let reset: Vec<Entity> = world.targets.iter().copied().collect();
        assert_eq!(reset, initial);

        tick(&mut world, &confirm(), &tuning);
        assert_eq!(world.mode, GameMode::Playing);
        assert_eq!(world.targets.len(), 50);
    }

    #[test]
    fn test_popping_every_balloon_clears() {
        let tuning = Tuning::default();
        let mut world = playing_world(&tuning);
        let positions: Vec<Vec3> = world.targets.iter().map(|t| t.position).collect();

        // Drop a projectile one step in front of each balloon, one at a time
        for pos in positions {
            world
                .projectiles
                .push_back(Entity::new(pos + tuning.projectile_displacement() * -1.0));
            tick(&mut world, &TickInput::default(), &tuning);
        }
        assert!(world.targets.is_empty());
        assert_eq!(world.mode, GameMode::Cleared);
        assert_eq!(world.stats.targets_popped, 50);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning {
            target_jitter: 2.0,
            ..Default::default()
        };
        let mut a = GameWorld::new(99, &tuning);
        let mut b = GameWorld::new(99, &tuning);
        let inputs = [
            confirm(),
            TickInput {
                right: true,
                fire: true,
                ..Default::default()
            },
            TickInput {
                left: true,
                ..Default::default()
            },
            fire_input(),
            TickInput::default(),
        ];
        for _ in 0..20 {
            for input in &inputs {
                tick(&mut a, input, &tuning);
                tick(&mut b, input, &tuning);
            }
        }
        assert_eq!(a.frame, b.frame);
        assert_eq!(a.actor, b.actor);
        assert_eq!(
            a.targets.iter().copied().collect::<Vec<_>>(),
            b.targets.iter().copied().collect::<Vec<_>>()
        );
        assert_eq!(a.stats, b.stats);
    }
}
