//! Rock spawning
//!
//! New rocks start fully off-screen, centred `size/2` beyond a random edge,
//! with a heading drawn from an arc around that edge's inward normal. The
//! arc stops short of the edge tangent, so every rock has a net inward
//! velocity and none spawns already receding.

use glam::Vec2;
use rand::Rng;

use super::state::{Rock, SpawnEdge};
use crate::config::{GameConfig, SpawnPolicy};
use crate::consts::SPAWN_TANGENT_EXCLUSION;
use crate::{heading_from_angle, wrap_angle};

/// Half-width of the heading arc around the inward normal
pub const HEADING_HALF_ARC: f32 = std::f32::consts::FRAC_PI_2 - SPAWN_TANGENT_EXCLUSION;

/// Decide whether a rock enters this tick.
///
/// `frame` is the number of completed ticks and `elapsed` the seconds
/// survived before this tick. Cadence mode draws no random numbers.
pub fn should_spawn<R: Rng>(rng: &mut R, config: &GameConfig, frame: u64, elapsed: f32) -> bool {
    match config.spawn_policy {
        SpawnPolicy::Cadence => (frame + 1) % config.frames_per_rock() == 0,
        SpawnPolicy::Rate { increment } => {
            let threshold = config.tick_seconds() * (config.rock_rate + elapsed / increment);
            rng.random::<f32>() < threshold
        }
    }
}

/// Build a rock entering from a random edge
pub fn spawn_rock<R: Rng>(rng: &mut R, config: &GameConfig) -> Rock {
    let edge = SpawnEdge::ALL[rng.random_range(0..SpawnEdge::ALL.len())];
    spawn_rock_on_edge(rng, config, edge)
}

/// Build a rock entering from `edge`
pub fn spawn_rock_on_edge<R: Rng>(rng: &mut R, config: &GameConfig, edge: SpawnEdge) -> Rock {
    let (size_min, size_max) = config.rock_size_range();
    let (speed_min, speed_max) = config.rock_speed_range();
    let size = rng.random_range(size_min..=size_max);
    let speed = rng.random_range(speed_min..=speed_max);
    let heading = inward_heading(rng, edge);
    let position = edge_position(rng, config.screen_size, size, edge);

    Rock::new(position, size, speed, heading).with_edge(edge)
}

/// Random unit heading within [`HEADING_HALF_ARC`] of the edge's inward normal
pub fn inward_heading<R: Rng>(rng: &mut R, edge: SpawnEdge) -> Vec2 {
    let offset = rng.random_range(-HEADING_HALF_ARC..=HEADING_HALF_ARC);
    heading_from_angle(wrap_angle(edge.inward_angle() + offset))
}

/// Centre just outside `edge`, uniform along its length
fn edge_position<R: Rng>(rng: &mut R, screen_size: f32, size: f32, edge: SpawnEdge) -> Vec2 {
    let along = rng.random_range(0.0..=screen_size);
    let outside = size / 2.0;
    match edge {
        SpawnEdge::Top => Vec2::new(along, -outside),
        SpawnEdge::Right => Vec2::new(screen_size + outside, along),
        SpawnEdge::Bottom => Vec2::new(along, screen_size + outside),
        SpawnEdge::Left => Vec2::new(-outside, along),
    }
}
