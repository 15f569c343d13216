//! Headless episode driver
//!
//! Plays one episode: observe, scan, ask a policy for an action, step.
//! Stops when the last life is gone or the tick cap is reached.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::consts::EPISODE_SECONDS;
use crate::sim::{Action, Lidar, LidarScan, Snapshot, World};

/// Picks an action from what the agent can observe
pub trait Policy {
    fn name(&self) -> &'static str;

    fn choose(&mut self, snapshot: &Snapshot, scan: &LidarScan) -> Action;
}

/// Never moves
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn name(&self) -> &'static str {
        "idle"
    }

    fn choose(&mut self, _snapshot: &Snapshot, _scan: &LidarScan) -> Action {
        Action::None
    }
}

/// Uniform over all nine actions
#[derive(Debug, Clone)]
pub struct RandomPolicy<R> {
    rng: R,
}

impl<R: Rng> RandomPolicy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Policy for RandomPolicy<R> {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, _snapshot: &Snapshot, _scan: &LidarScan) -> Action {
        Action::ALL[self.rng.random_range(0..Action::ALL.len())]
    }
}

/// Steers away from lidar hits, weighted by closeness, and drifts back to
/// the middle of the field when nothing is near
#[derive(Debug, Clone, Copy)]
pub struct EvadePolicy {
    /// Distance from the centre, as a fraction of the screen, tolerated
    /// before drifting back
    pub home_radius: f32,
}

impl Default for EvadePolicy {
    fn default() -> Self {
        Self { home_radius: 0.35 }
    }
}

impl EvadePolicy {
    /// Desired direction of travel (not normalized)
    fn steering(&self, snapshot: &Snapshot, scan: &LidarScan) -> Vec2 {
        let origin = snapshot.player.position;
        let radius = scan.max_radius.max(f32::EPSILON);

        let repulsion: Vec2 = scan
            .beams
            .iter()
            .filter(|beam| beam.hit)
            .map(|beam| {
                let away = (origin - beam.end).normalize_or_zero();
                away * (1.0 - beam.distance / radius).max(0.0)
            })
            .sum();
        if repulsion.length_squared() > 1e-6 {
            return repulsion;
        }

        let centre = Vec2::splat(snapshot.screen_size / 2.0);
        let to_centre = centre - origin;
        if to_centre.length() > self.home_radius * snapshot.screen_size {
            to_centre
        } else {
            Vec2::ZERO
        }
    }
}

impl Policy for EvadePolicy {
    fn name(&self) -> &'static str {
        "evade"
    }

    fn choose(&mut self, snapshot: &Snapshot, scan: &LidarScan) -> Action {
        let want = self.steering(snapshot, scan);
        if want == Vec2::ZERO {
            return Action::None;
        }
        let want = want.normalize();
        Action::ALL[1..]
            .iter()
            .copied()
            .max_by(|a, b| {
                let da = a.direction().normalize().dot(want);
                let db = b.direction().normalize().dot(want);
                da.total_cmp(&db)
            })
            .unwrap_or(Action::None)
    }
}

/// Outcome of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub policy: String,
    pub ticks: u64,
    pub frame: u64,
    /// Seconds survived
    pub score: f32,
    pub lives_left: u32,
    pub lives_lost: u32,
    pub rocks_spawned: u32,
    /// Ticks on which the policy moved the player
    pub moving_ticks: u64,
    pub game_over: bool,
}

/// Tick cap for a config: fifteen minutes of play
pub fn default_max_ticks(config: &GameConfig) -> u64 {
    u64::from(EPISODE_SECONDS) * u64::from(config.framerate)
}

/// Drive `world` with `policy` until the player is out of lives or
/// `max_ticks` ticks have run
pub fn run_episode<R: Rng, P: Policy + ?Sized>(
    world: &mut World<R>,
    lidar: &Lidar,
    policy: &mut P,
    max_ticks: u64,
) -> EpisodeSummary {
    let mut ticks = 0u64;
    let mut lives_lost = 0u32;
    let mut rocks_spawned = 0u32;
    let mut moving_ticks = 0u64;

    while ticks < max_ticks && !world.is_over() {
        let snapshot = world.observe_raw();
        let scan = lidar.scan(&snapshot);
        let action = policy.choose(&snapshot, &scan);
        if action != Action::None {
            moving_ticks += 1;
        }

        let events = world.step(action);
        lives_lost += events.lives_lost;
        if events.spawned.is_some() {
            rocks_spawned += 1;
        }
        ticks += 1;
    }

    let summary = EpisodeSummary {
        policy: policy.name().to_string(),
        ticks,
        frame: world.frame(),
        score: world.score(),
        lives_left: world.lives(),
        lives_lost,
        rocks_spawned,
        moving_ticks,
        game_over: world.is_over(),
    };
    log::info!(
        "Episode finished ({}): {} ticks, score {:.1}, lives left {}",
        summary.policy,
        summary.ticks,
        summary.score,
        summary.lives_left
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, LidarConfig};
    use crate::sim::{Aabb, Rock};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn lidar() -> Lidar {
        Lidar::new(LidarConfig::default()).unwrap()
    }

    #[test]
    fn test_episode_respects_tick_cap() {
        let config = GameConfig::from_difficulty(Difficulty::Easy);
        let mut world = World::new(config, 1).unwrap();
        let summary = run_episode(&mut world, &lidar(), &mut IdlePolicy, 50);
        assert_eq!(summary.ticks, 50);
        assert_eq!(summary.frame, 50);
        assert_eq!(summary.moving_ticks, 0);
        assert_eq!(summary.rocks_spawned, 5);
        assert_eq!(summary.policy, "idle");
    }

    #[test]
    fn test_episode_stops_when_out_of_lives() {
        let config = GameConfig {
            lives_start: 1,
            ..Default::default()
        };
        let mut world = World::new(config, 1).unwrap();
        let centre = world.player().position;
        world.insert_rock(Rock::stationary(centre, 40.0));

        let summary = run_episode(&mut world, &lidar(), &mut IdlePolicy, 1000);
        assert!(summary.game_over);
        assert_eq!(summary.ticks, 1);
        assert_eq!(summary.lives_left, 0);
        assert_eq!(summary.lives_lost, 1);
    }

    #[test]
    fn test_lives_accounting_adds_up() {
        let config = GameConfig::from_difficulty(Difficulty::Hard);
        let lives_start = config.lives_start;
        let mut world = World::new(config, 77).unwrap();
        let mut policy = RandomPolicy::new(Pcg32::seed_from_u64(77));
        let summary = run_episode(&mut world, &lidar(), &mut policy, 2000);
        assert_eq!(summary.lives_left + summary.lives_lost, lives_start);
    }

    #[test]
    fn test_lives_lost_never_exceeds_lives_held() {
        let config = GameConfig {
            lives_start: 1,
            ..Default::default()
        };
        let mut world = World::new(config, 2).unwrap();
        let centre = world.player().position;
        world.insert_rock(Rock::stationary(centre, 40.0));
        world.insert_rock(Rock::stationary(centre, 40.0));

        let summary = run_episode(&mut world, &lidar(), &mut IdlePolicy, 10);
        assert_eq!(summary.lives_left, 0);
        assert_eq!(summary.lives_lost, 1);
    }

    #[test]
    fn test_episodes_replay_with_same_seeds() {
        let run = || {
            let mut world = World::new(GameConfig::default(), 5).unwrap();
            let mut policy = RandomPolicy::new(Pcg32::seed_from_u64(6));
            run_episode(&mut world, &lidar(), &mut policy, 500)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_evade_moves_away_from_hit() {
        let config = GameConfig::default();
        let mut world = World::new(config, 3).unwrap();
        let centre = world.player().position;
        world.insert_rock(Rock::stationary(centre + Vec2::new(50.0, 0.0), 30.0));

        let snapshot = world.observe_raw();
        let scan = lidar().scan(&snapshot);
        let action = EvadePolicy::default().choose(&snapshot, &scan);
        assert!(action.direction().x < 0.0, "{action:?}");
    }

    #[test]
    fn test_evade_returns_home() {
        let mut world = World::new(GameConfig::default(), 3).unwrap();
        world.set_player_position(Vec2::new(30.0, 30.0));
        let snapshot = world.observe_raw();
        let scan = lidar().scan(&snapshot);
        assert!(scan.nearest_hit().is_none());
        assert_eq!(EvadePolicy::default().choose(&snapshot, &scan), Action::RightDown);

        world.set_player_position(Vec2::splat(256.0));
        let snapshot = world.observe_raw();
        let scan = lidar().scan(&snapshot);
        assert_eq!(EvadePolicy::default().choose(&snapshot, &scan), Action::None);
    }

    #[test]
    fn test_evade_with_hand_built_scan() {
        let lidar = Lidar::new(LidarConfig {
            beam_count: 8,
            ..Default::default()
        })
        .unwrap();
        let origin = Vec2::splat(256.0);
        // Obstacle straight above the player
        let rocks = [Aabb::square(Vec2::new(256.0, 200.0), 40.0)];
        let scan = lidar.cast(origin, &rocks, 512.0);
        let world = World::new(GameConfig::default(), 0).unwrap();
        let snapshot = world.observe_raw();
        let action = EvadePolicy::default().choose(&snapshot, &scan);
        assert!(action.direction().y > 0.0, "{action:?}");
    }

    #[test]
    fn test_default_cap_is_fifteen_minutes() {
        assert_eq!(default_max_ticks(&GameConfig::default()), 9000);
    }
}
