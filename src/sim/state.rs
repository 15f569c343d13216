//! World state and entity types
//!
//! The world owns exactly one player and the live rock set. Everything a
//! consumer may read between ticks is exposed through [`Snapshot`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Collidable, Positioned};
use super::tick::Action;
use crate::config::{ConfigError, GameConfig};

/// Playfield edge a rock enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnEdge {
    Top,
    Right,
    Bottom,
    Left,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 4] = [
        SpawnEdge::Top,
        SpawnEdge::Right,
        SpawnEdge::Bottom,
        SpawnEdge::Left,
    ];

    /// Angle of the inward normal. Each edge is the previous one rotated by
    /// a quarter turn, starting with straight down for the top edge.
    pub fn inward_angle(&self) -> f32 {
        use std::f32::consts::FRAC_PI_2;
        let index = match self {
            SpawnEdge::Top => 1.0,
            SpawnEdge::Right => 2.0,
            SpawnEdge::Bottom => 3.0,
            SpawnEdge::Left => 0.0,
        };
        index * FRAC_PI_2
    }

    /// Unit vector pointing from this edge into the field
    pub fn inward_normal(&self) -> Vec2 {
        match self {
            SpawnEdge::Top => Vec2::Y,
            SpawnEdge::Right => Vec2::NEG_X,
            SpawnEdge::Bottom => Vec2::NEG_Y,
            SpawnEdge::Left => Vec2::X,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Box centre
    pub position: Vec2,
    pub half_extents: Vec2,
    pub lives: u32,
    /// Displacement per tick along each moving axis
    pub speed: f32,
}

impl Player {
    /// Player centred on the field with the configured size and lives
    pub fn new(config: &GameConfig) -> Self {
        let centre = config.screen_size / 2.0;
        Self {
            position: Vec2::splat(centre),
            half_extents: Vec2::splat(config.player_extent() / 2.0),
            lives: config.lives_start,
            speed: config.player_step(),
        }
    }

    /// Move by the action's velocity, then keep the whole box on screen
    pub fn apply_action(&mut self, action: Action, screen_size: f32) {
        self.position += action.direction() * self.speed;
        self.clamp_to_field(screen_size);
    }

    /// Push the box back inside `[0, screen_size]²`. A box larger than the
    /// field is pinned to the field centre on that axis.
    pub fn clamp_to_field(&mut self, screen_size: f32) {
        let half_field = screen_size / 2.0;
        let lo = self.half_extents.min(Vec2::splat(half_field));
        let hi = (Vec2::splat(screen_size) - self.half_extents).max(Vec2::splat(half_field));
        self.position.x = self.position.x.clamp(lo.x, hi.x);
        self.position.y = self.position.y.clamp(lo.y, hi.y);
    }

    /// Remove one life. Returns true if that was the last one.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives == 0
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }
}

impl Positioned for Player {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Collidable for Player {
    fn half_extents(&self) -> Vec2 {
        self.half_extents
    }
}

/// An asteroid drifting across the field.
///
/// Heading and speed are fixed at creation; only the position advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rock {
    /// Assigned by the world on insertion
    pub id: u32,
    /// Box centre
    pub position: Vec2,
    /// Diameter (box edge)
    pub size: f32,
    speed: f32,
    heading: Vec2,
    pub spawn_edge: Option<SpawnEdge>,
}

impl Rock {
    /// New rock moving along `heading` (normalized here) at `speed` per tick
    pub fn new(position: Vec2, size: f32, speed: f32, heading: Vec2) -> Self {
        Self {
            id: 0,
            position,
            size: size.max(0.0),
            speed: speed.max(0.0),
            heading: heading.normalize_or_zero(),
            spawn_edge: None,
        }
    }

    /// A rock that never moves
    pub fn stationary(position: Vec2, size: f32) -> Self {
        Self::new(position, size, 0.0, Vec2::ZERO)
    }

    pub fn with_edge(mut self, edge: SpawnEdge) -> Self {
        self.spawn_edge = Some(edge);
        self
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.heading * self.speed
    }

    /// Advance one tick
    #[inline]
    pub fn advance(&mut self) {
        self.position += self.velocity();
    }
}

impl Positioned for Rock {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Collidable for Rock {
    fn half_extents(&self) -> Vec2 {
        Vec2::splat(self.size / 2.0)
    }
}

/// Read-only view of the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub lives: u32,
}

/// Read-only view of one rock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RockView {
    pub id: u32,
    pub position: Vec2,
    pub size: f32,
    pub speed: f32,
    pub heading: Vec2,
}

impl Positioned for RockView {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Collidable for RockView {
    fn half_extents(&self) -> Vec2 {
        Vec2::splat(self.size / 2.0)
    }
}

/// Everything an outside consumer may observe after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub player: PlayerView,
    pub obstacles: Vec<RockView>,
    /// Seconds survived
    pub score: f32,
    pub frame: u64,
    pub screen_size: f32,
}

/// The simulation: one player, the live rocks and the clock.
///
/// All randomness comes from `rng`, so a world built from the same config
/// and seed replays identically for the same action sequence.
#[derive(Debug, Clone)]
pub struct World<R = Pcg32> {
    pub(crate) config: GameConfig,
    pub(crate) player: Player,
    /// Live rocks, kept in insertion order
    pub(crate) rocks: Vec<Rock>,
    /// Completed ticks
    pub(crate) frame: u64,
    pub(crate) rng: R,
    next_id: u32,
}

impl World<Pcg32> {
    /// World seeded with a PCG stream
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        let world = Self::with_rng(config, Pcg32::seed_from_u64(seed))?;
        log::info!("World created with seed {}", seed);
        Ok(world)
    }
}

impl<R: Rng> World<R> {
    /// World drawing from a caller-supplied random source
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let player = Player::new(&config);
        Ok(Self {
            config,
            player,
            rocks: Vec::new(),
            frame: 0,
            rng,
            next_id: 1,
        })
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a rock to the field, returning its freshly assigned id
    pub fn insert_rock(&mut self, mut rock: Rock) -> u32 {
        rock.id = self.next_entity_id();
        log::debug!(
            "Rock {} at ({:.1}, {:.1}) size {:.1} speed {:.2}",
            rock.id,
            rock.position.x,
            rock.position.y,
            rock.size,
            rock.speed
        );
        let id = rock.id;
        self.rocks.push(rock);
        id
    }
}

impl<R> World<R> {
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Place the player, clamped onto the field
    pub fn set_player_position(&mut self, position: Vec2) {
        self.player.position = position;
        self.player.clamp_to_field(self.config.screen_size);
    }

    pub fn rocks(&self) -> &[Rock] {
        &self.rocks
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Seconds survived so far
    pub fn score(&self) -> f32 {
        self.frame as f32 * self.config.tick_seconds()
    }

    pub fn lives(&self) -> u32 {
        self.player.lives
    }

    /// Episode is finished once the last life is gone
    pub fn is_over(&self) -> bool {
        !self.player.is_alive()
    }

    /// Read-only copy of the observable state
    pub fn observe_raw(&self) -> Snapshot {
        Snapshot {
            player: PlayerView {
                position: self.player.position,
                half_extents: self.player.half_extents,
                lives: self.player.lives,
            },
            obstacles: self
                .rocks
                .iter()
                .map(|rock| RockView {
                    id: rock.id,
                    position: rock.position,
                    size: rock.size,
                    speed: rock.speed,
                    heading: rock.heading,
                })
                .collect(),
            score: self.score(),
            frame: self.frame,
            screen_size: self.config.screen_size,
        }
    }
}
