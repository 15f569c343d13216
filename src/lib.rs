//! Kuiper Escape - survive the asteroid belt for as long as possible
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, lidar)
//! - `config`: Game and sensor configuration, difficulty presets
//! - `runner`: Headless episode driver and built-in policies
//!
//! Screen-space coordinates are used everywhere: origin at the top-left
//! corner, x grows to the right and y grows downward. Angles are measured
//! from +x toward +y, so an angle of π/2 points straight down.

pub mod config;
pub mod runner;
pub mod sim;

pub use config::{ConfigError, Difficulty, GameConfig, LidarConfig, SpawnPolicy};
pub use runner::{
    EpisodeSummary, EvadePolicy, IdlePolicy, Policy, RandomPolicy, default_max_ticks, run_episode,
};
pub use sim::{Action, Beam, Lidar, LidarScan, Snapshot, World};

use glam::Vec2;

/// Game configuration defaults
pub mod consts {
    /// Playfield edge length (square field)
    pub const SCREEN_SIZE: f32 = 512.0;
    /// Simulation ticks per second
    pub const FRAMERATE: u32 = 10;
    pub const LIVES_START: u32 = 3;

    /// Player speed, portion of the screen traversed in one second
    pub const PLAYER_SPEED: f32 = 0.5;
    /// Player box edge as a fraction of the screen
    pub const PLAYER_SIZE: f32 = 0.05;

    /// Rocks generated per second
    pub const ROCK_RATE: f32 = 2.0;
    /// Rock diameter bounds, fraction of the screen
    pub const ROCK_SIZE_MIN: f32 = 0.04;
    pub const ROCK_SIZE_MAX: f32 = 0.08;
    /// Rock speed bounds, portion of the screen traversed in one second
    pub const ROCK_SPEED_MIN: f32 = 0.1;
    pub const ROCK_SPEED_MAX: f32 = 0.3;
    /// Seconds of play that add one extra rock/second in rate mode
    pub const ROCK_RATE_INCREMENT: f32 = 50.0;

    /// Distance past the edge a rock may drift before it is pruned
    pub const DESPAWN_MARGIN: f32 = 50.0;

    /// Spawn headings never come closer than this to the edge tangent (radians)
    pub const SPAWN_TANGENT_EXCLUSION: f32 = 0.1 * std::f32::consts::PI;

    /// Lidar defaults
    pub const LIDAR_BEAMS: usize = 64;
    pub const LIDAR_STEP_FRACTION: f32 = 0.01;
    pub const LIDAR_RADIUS_FRACTION: f32 = 0.5;
    /// Upper bound on `radius_fraction / step_fraction`
    pub const LIDAR_MAX_STEPS: f32 = 1e6;

    /// Episode cap used by the headless runner, in seconds (15 minutes)
    pub const EPISODE_SECONDS: u32 = 15 * 60;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(std::f32::consts::TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= std::f32::consts::TAU { 0.0 } else { wrapped }
}

/// Unit direction for a screen-space angle
#[inline]
pub fn heading_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
