//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One discrete tick per call, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (rocks keep insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod lidar;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{boxes_collide, overlapping, resolve_player_hits};
pub use geometry::{Aabb, Collidable, Positioned};
pub use lidar::{Beam, Lidar, LidarScan};
pub use spawn::{inward_heading, should_spawn, spawn_rock, spawn_rock_on_edge};
pub use state::{Player, PlayerView, Rock, RockView, Snapshot, SpawnEdge, World};
pub use tick::{Action, StepEvents};
