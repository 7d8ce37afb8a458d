//! Game rules
//!
//! Modes, entity pools, hit tests and the per-frame `tick`. Nothing in here
//! touches the window or the GPU, and target jitter comes from a seeded
//! `Pcg32`, so a seed plus an input sequence always replays the same round.

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Hit, cull_projectiles, find_hits, resolve_collisions};
pub use state::{
    Actor, Entity, EntityPool, GameEvent, GameMode, GameWorld, RoundStats, generate_targets,
};
pub use tick::{TickInput, fire, step_playing, tick};
