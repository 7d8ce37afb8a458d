//! Game state and core simulation types
//!
//! Everything that changes while the game runs lives in [`GameWorld`].

use std::collections::VecDeque;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::tuning::Tuning;

/// Top-level game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Title screen, waiting for confirm
    #[default]
    Start,
    /// Active gameplay
    Playing,
    /// Every balloon popped, waiting for confirm
    Cleared,
}

impl GameMode {
    /// Whether steering and fire input are accepted
    pub fn accepts_gameplay_input(&self) -> bool {
        matches!(self, GameMode::Playing)
    }
}

/// A transient simulation object (projectile or balloon)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub position: Vec3,
}

impl Entity {
    pub const fn new(position: Vec3) -> Self {
        Self { position }
    }
}

/// Ordered pool of entities of one kind
///
/// Front-to-back order is spawn order. New entities go to the back, culled
/// ones leave from the front, and hits may remove from anywhere.
#[derive(Debug, Clone, Default)]
pub struct EntityPool {
    entities: VecDeque<Entity>,
}

impl EntityPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn front(&self) -> Option<&Entity> {
        self.entities.front()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push_back(&mut self, entity: Entity) {
        self.entities.push_back(entity);
    }

    /// Append only while the pool holds fewer than `cap` entities
    ///
    /// Returns false when the pool is full; nothing is queued.
    pub fn try_push_back(&mut self, entity: Entity, cap: usize) -> bool {
        if self.entities.len() < cap {
            self.entities.push_back(entity);
            true
        } else {
            false
        }
    }

    /// Remove entities from the front while `pred` holds, returning how many
    pub fn pop_front_while(&mut self, mut pred: impl FnMut(&Entity) -> bool) -> usize {
        let mut removed = 0;
        while let Some(front) = self.entities.front() {
            if !pred(front) {
                break;
            }
            self.entities.pop_front();
            removed += 1;
        }
        removed
    }

    /// Remove every entity whose flag is set, keeping the rest in order
    ///
    /// `flags` is indexed by pool position and must cover the whole pool.
    pub fn remove_flagged(&mut self, flags: &[bool]) {
        debug_assert_eq!(flags.len(), self.entities.len());
        let mut index = 0;
        self.entities.retain(|_| {
            let keep = !flags.get(index).copied().unwrap_or(false);
            index += 1;
            keep
        });
    }
}

impl FromIterator<Entity> for EntityPool {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self {
            entities: iter.into_iter().collect(),
        }
    }
}

/// The player's aircraft
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    pub position: Vec3,
    /// Steering velocity along X (units per frame)
    pub velocity: f32,
}

impl Actor {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: 0.0,
        }
    }

    /// Accelerate left for one frame and move by the new velocity
    ///
    /// Rightward velocity is dropped first so the aircraft never drifts
    /// against the requested direction.
    pub fn steer_left(&mut self, tuning: &Tuning) {
        self.velocity = self.velocity.min(0.0);
        self.velocity -= tuning.acceleration;
        self.velocity = self.velocity.max(-tuning.velocity_cap);
        self.position.x += self.velocity;
    }

    /// Accelerate right for one frame and move by the new velocity
    pub fn steer_right(&mut self, tuning: &Tuning) {
        self.velocity = self.velocity.max(0.0);
        self.velocity += tuning.acceleration;
        self.velocity = self.velocity.min(tuning.velocity_cap);
        self.position.x += self.velocity;
    }

    /// Bleed velocity toward zero, never past it
    pub fn decay(&mut self, tuning: &Tuning) {
        let step = tuning.decay_per_frame();
        if self.velocity.abs() <= step {
            self.velocity = 0.0;
        } else {
            self.velocity -= crate::sign(self.velocity) * step;
        }
    }
}

/// Running counters for the current round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundStats {
    pub shots_fired: u32,
    pub targets_popped: u32,
    pub frames_in_play: u64,
}

/// Things that happened during a tick, for logging and feedback
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ModeChanged { from: GameMode, to: GameMode },
    ProjectileFired { at: Vec3 },
    /// Fire pressed while the projectile pool was full
    FireIgnored,
    TargetPopped { at: Vec3 },
    ProjectilesCulled { count: usize },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameWorld {
    /// Layout seed
    pub seed: u64,
    pub mode: GameMode,
    pub actor: Actor,
    pub projectiles: EntityPool,
    pub targets: EntityPool,
    pub stats: RoundStats,
    /// Simulation tick counter (all modes)
    pub frame: u64,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
}

impl GameWorld {
    /// Create a world on the start screen with a fresh layout
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let mut world = Self {
            seed,
            mode: GameMode::Start,
            actor: Actor::new(tuning.actor_start),
            projectiles: EntityPool::new(),
            targets: EntityPool::new(),
            stats: RoundStats::default(),
            frame: 0,
            events: Vec::new(),
        };
        world.reset(tuning);
        world
    }

    /// Put the aircraft and both pools back to their starting layout
    pub fn reset(&mut self, tuning: &Tuning) {
        self.actor = Actor::new(tuning.actor_start);
        self.projectiles.clear();
        self.targets = generate_targets(tuning, self.seed);
        self.stats = RoundStats::default();
    }

    /// Switch mode, recording the transition
    pub fn set_mode(&mut self, mode: GameMode) {
        if self.mode != mode {
            log::debug!("Mode {:?} -> {:?}", self.mode, mode);
            self.events.push(GameEvent::ModeChanged {
                from: self.mode,
                to: mode,
            });
            self.mode = mode;
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Build the balloon grid
///
/// Rows run along Z, columns along X. With zero jitter the layout is the
/// same for every seed.
pub fn generate_targets(tuning: &Tuning, seed: u64) -> EntityPool {
    let mut rng = Pcg32::seed_from_u64(seed);
    let jitter = tuning.target_jitter.max(0.0);

    let mut pool = EntityPool::with_capacity(tuning.target_count());
    for row in 0..tuning.grid_rows {
        for col in 0..tuning.grid_cols {
            let mut pos = tuning.grid_origin
                + Vec3::new(
                    col as f32 * tuning.grid_spacing,
                    0.0,
                    row as f32 * tuning.grid_spacing,
                );
            if jitter > 0.0 {
                pos.x += rng.random_range(-jitter..=jitter);
                pos.z += rng.random_range(-jitter..=jitter);
            }
            pool.push_back(Entity::new(pos));
        }
    }
    pool
}
