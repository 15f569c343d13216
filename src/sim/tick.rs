//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world deterministically. One call to
//! [`World::step`] runs, in order: spawn, player move, rock move, prune,
//! collision, clock.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::resolve_player_hits;
use super::geometry::Collidable;
use super::spawn;
use super::state::World;

/// Discrete player input for a single tick.
///
/// Index encoding: 0 none, 1 up, 2 right, 3 down, 4 left, 5 up-right,
/// 6 right-down, 7 down-left, 8 left-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Action {
    #[default]
    None,
    Up,
    Right,
    Down,
    Left,
    UpRight,
    RightDown,
    DownLeft,
    LeftUp,
}

impl Action {
    /// All actions in index order
    pub const ALL: [Action; 9] = [
        Action::None,
        Action::Up,
        Action::Right,
        Action::Down,
        Action::Left,
        Action::UpRight,
        Action::RightDown,
        Action::DownLeft,
        Action::LeftUp,
    ];

    /// Decode an action index. Anything unrecognised is `None`.
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Action::None)
    }

    pub fn index(&self) -> u8 {
        match self {
            Action::None => 0,
            Action::Up => 1,
            Action::Right => 2,
            Action::Down => 3,
            Action::Left => 4,
            Action::UpRight => 5,
            Action::RightDown => 6,
            Action::DownLeft => 7,
            Action::LeftUp => 8,
        }
    }

    /// Per-axis unit velocity in screen space (up is -y). Diagonals move a
    /// full step on both axes.
    pub fn direction(&self) -> Vec2 {
        match self {
            Action::None => Vec2::ZERO,
            Action::Up => Vec2::new(0.0, -1.0),
            Action::Right => Vec2::new(1.0, 0.0),
            Action::Down => Vec2::new(0.0, 1.0),
            Action::Left => Vec2::new(-1.0, 0.0),
            Action::UpRight => Vec2::new(1.0, -1.0),
            Action::RightDown => Vec2::new(1.0, 1.0),
            Action::DownLeft => Vec2::new(-1.0, 1.0),
            Action::LeftUp => Vec2::new(-1.0, -1.0),
        }
    }
}

impl From<i64> for Action {
    fn from(index: i64) -> Self {
        Action::from_index(index)
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvents {
    /// Id of the rock spawned this tick
    pub spawned: Option<u32>,
    /// Rocks removed for leaving the field
    pub pruned: usize,
    /// Ids of rocks that hit the player
    pub hits: Vec<u32>,
    /// Lives actually removed; fewer than `hits` once the player runs out
    pub lives_lost: u32,
}

impl<R: Rng> World<R> {
    /// Advance the world by one tick.
    ///
    /// The world never ends itself: once `lives` reaches zero it keeps
    /// ticking and only [`World::is_over`] reports the end.
    pub fn step(&mut self, action: Action) -> StepEvents {
        if self.is_over() {
            log::warn!("Stepping world at frame {} after the last life", self.frame);
        }

        let mut events = StepEvents::default();

        // Spawn
        let elapsed = self.score();
        if spawn::should_spawn(&mut self.rng, &self.config, self.frame, elapsed) {
            let rock = spawn::spawn_rock(&mut self.rng, &self.config);
            events.spawned = Some(self.insert_rock(rock));
        }

        // Move player, then rocks
        self.player.apply_action(action, self.config.screen_size);
        for rock in &mut self.rocks {
            rock.advance();
        }

        // Prune rocks that drifted off the field
        let screen_size = self.config.screen_size;
        let margin = self.config.despawn_margin;
        let before = self.rocks.len();
        self.rocks
            .retain(|rock| !rock.bounding_box().is_beyond_field(screen_size, margin));
        events.pruned = before - self.rocks.len();
        if events.pruned > 0 {
            log::debug!("Pruned {} rocks at frame {}", events.pruned, self.frame);
        }

        // Collisions
        let lives_before = self.player.lives;
        events.hits = resolve_player_hits(&mut self.player, &mut self.rocks);
        events.lives_lost = lives_before - self.player.lives;

        self.frame += 1;
        events
    }
}
