//! Virtual lidar built from fixed-step ray marching
//!
//! A scan fires `beam_count` beams from the player, evenly spaced over a full
//! turn starting at angle 0. Each beam advances in `step_size` increments and
//! stops on the first of, checked in this order after every step:
//!
//! 1. the step point lies inside an obstacle box (flag 1, unclamped distance)
//! 2. the distance travelled exceeds `max_radius` (end clamped to `max_radius`)
//! 3. the step point left the `[0, screen_size]²` field (end clamped onto it)
//!
//! Scans hold no state, so the same world always yields the same scan.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, Collidable};
use super::state::{Snapshot, World};
use crate::config::{ConfigError, LidarConfig};
use crate::heading_from_angle;

/// Result of one beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    /// Direction in screen space (radians, 0 = +x, π/2 = down)
    pub angle: f32,
    /// Distance from the origin to `end`
    pub distance: f32,
    /// Whether the beam stopped on an obstacle
    pub hit: bool,
    /// Where the beam stopped
    pub end: Vec2,
}

impl Beam {
    #[inline]
    pub fn collision_flag(&self) -> u8 {
        u8::from(self.hit)
    }

    /// `(distance, collision_flag)`
    #[inline]
    pub fn state(&self) -> (f32, u8) {
        (self.distance, self.collision_flag())
    }
}

/// One full sweep of beams, in angle order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LidarScan {
    pub origin: Vec2,
    pub max_radius: f32,
    pub beams: Vec<Beam>,
}

impl LidarScan {
    pub fn len(&self) -> usize {
        self.beams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    /// `(distance, collision_flag)` per beam
    pub fn pairs(&self) -> Vec<(f32, u8)> {
        self.beams.iter().map(Beam::state).collect()
    }

    /// Agent-facing vector: `distance / max_radius` followed by the flag,
    /// for each beam in turn
    pub fn flatten_normalized(&self) -> Vec<f32> {
        let scale = if self.max_radius > 0.0 {
            1.0 / self.max_radius
        } else {
            0.0
        };
        self.beams
            .iter()
            .flat_map(|beam| [beam.distance * scale, f32::from(beam.collision_flag())])
            .collect()
    }

    /// Closest beam that stopped on an obstacle
    pub fn nearest_hit(&self) -> Option<&Beam> {
        self.beams
            .iter()
            .filter(|beam| beam.hit)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Ray-casting sensor
#[derive(Debug, Clone)]
pub struct Lidar {
    config: LidarConfig,
    angles: Vec<f32>,
}

impl Lidar {
    pub fn new(config: LidarConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let n = config.beam_count;
        let angles = (0..n).map(|i| i as f32 * TAU / n as f32).collect();
        Ok(Self { config, angles })
    }

    pub fn config(&self) -> &LidarConfig {
        &self.config
    }

    /// Beam angles, starting at 0 and increasing
    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    pub fn step_size(&self, screen_size: f32) -> f32 {
        self.config.step_fraction * screen_size
    }

    pub fn max_radius(&self, screen_size: f32) -> f32 {
        self.config.radius_fraction * screen_size
    }

    /// Scan from the player's position in a snapshot
    pub fn scan(&self, snapshot: &Snapshot) -> LidarScan {
        self.cast(
            snapshot.player.position,
            &snapshot.obstacles,
            snapshot.screen_size,
        )
    }

    /// Scan a live world without building a snapshot
    pub fn scan_world<R>(&self, world: &World<R>) -> LidarScan {
        self.cast(
            world.player().position,
            world.rocks(),
            world.config().screen_size,
        )
    }

    /// Cast every beam from `origin` against `obstacles`
    pub fn cast<C: Collidable>(
        &self,
        origin: Vec2,
        obstacles: &[C],
        screen_size: f32,
    ) -> LidarScan {
        let step = self.step_size(screen_size);
        let max_radius = self.max_radius(screen_size);

        // Broad phase: no step point can land farther than one step past
        // max_radius, so boxes outside that square are never tested
        let reach = Aabb::from_center(origin, Vec2::splat(max_radius + 2.0 * step));
        let candidates: Vec<Aabb> = obstacles
            .iter()
            .map(Collidable::bounding_box)
            .filter(|bb| bb.overlaps(&reach))
            .collect();

        let beams = self
            .angles
            .iter()
            .map(|&angle| cast_beam(origin, angle, &candidates, screen_size, step, max_radius))
            .collect();

        LidarScan {
            origin,
            max_radius,
            beams,
        }
    }
}

/// March a single beam until it hits, runs out of range or leaves the field
fn cast_beam(
    origin: Vec2,
    angle: f32,
    obstacles: &[Aabb],
    screen_size: f32,
    step: f32,
    max_radius: f32,
) -> Beam {
    let dir = heading_from_angle(angle);
    let truncated = Beam {
        angle,
        distance: max_radius,
        hit: false,
        end: origin + dir * max_radius,
    };

    // Range is always exceeded by this step; the bound also stops a march
    // from a non-finite origin. `LidarConfig::validate` keeps it small.
    let max_steps = (max_radius / step).ceil() as u32 + 2;

    for k in 1..=max_steps {
        let point = origin + dir * (step * k as f32);
        let distance = (point - origin).length();

        if obstacles.iter().any(|bb| bb.contains_point(point)) {
            return Beam {
                angle,
                distance,
                hit: true,
                end: point,
            };
        }

        if distance > max_radius {
            return truncated;
        }

        let field_max = Vec2::splat(screen_size);
        if point.cmplt(Vec2::ZERO).any() || point.cmpgt(field_max).any() {
            let end = point.clamp(Vec2::ZERO, field_max);
            return Beam {
                angle,
                distance: (end - origin).length(),
                hit: false,
                end,
            };
        }
    }

    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::state::Rock;
    use std::f32::consts::{FRAC_PI_2, PI};

    const FIELD: f32 = 512.0;

    fn lidar(beam_count: usize, step: f32, max_radius: f32) -> Lidar {
        Lidar::new(LidarConfig {
            beam_count,
            step_fraction: step / FIELD,
            radius_fraction: max_radius / FIELD,
        })
        .unwrap()
    }

    #[test]
    fn test_angles_start_at_zero_and_increase() {
        let lidar = lidar(4, 5.0, 100.0);
        let expected = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];
        for (a, e) in lidar.angles().iter().zip(expected) {
            assert!((a - e).abs() < 1e-6);
        }
    }

    #[test]
    fn test_open_field_beams_reach_max_radius() {
        let lidar = lidar(4, 5.12, 100.0);
        let no_rocks: [Aabb; 0] = [];
        let scan = lidar.cast(Vec2::splat(256.0), &no_rocks, FIELD);

        assert_eq!(scan.len(), 4);
        for (distance, flag) in scan.pairs() {
            assert!((distance - 100.0).abs() < 1e-3, "distance {distance}");
            assert_eq!(flag, 0);
        }
    }

    #[test]
    fn test_beam_stops_at_boundary() {
        let step = 5.12;
        let lidar = lidar(4, step, FIELD);
        let no_rocks: [Aabb; 0] = [];
        let scan = lidar.cast(Vec2::new(100.0, 300.0), &no_rocks, FIELD);

        // Beam 2 points left (-x): 100 units to the wall
        let left = scan.beams[2];
        assert!(!left.hit);
        assert!((left.distance - 100.0).abs() <= step);
        assert!(left.end.x.abs() < 1e-4);

        // Beam 1 points down (+y): 212 units to the bottom edge
        let down = scan.beams[1];
        assert!(!down.hit);
        assert!((down.distance - 212.0).abs() <= step);
        assert!((down.end.y - FIELD).abs() < 1e-4);
    }

    #[test]
    fn test_hit_reports_unclamped_distance() {
        let lidar = lidar(1, 10.0, 200.0);
        // Box spans x in [346, 366]; the 9th step lands on x = 346
        let rocks = [Aabb::square(Vec2::new(356.0, 256.0), 20.0)];
        let scan = lidar.cast(Vec2::splat(256.0), &rocks, FIELD);

        let beam = scan.beams[0];
        assert!(beam.hit);
        assert_eq!(beam.collision_flag(), 1);
        assert!((beam.distance - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_obstacle_wins_over_radius_on_same_step() {
        let lidar = lidar(1, 10.0, 100.0);
        let origin = Vec2::splat(256.0);

        // Step 11 lands on x = 366: past max_radius and inside the box
        let rocks = [Aabb::new(Vec2::new(360.0, 250.0), Vec2::new(380.0, 262.0))];
        let beam = lidar.cast(origin, &rocks, FIELD).beams[0];
        assert!(beam.hit);
        assert!((beam.distance - 110.0).abs() < 1e-3);

        // Same step misses a box starting at x = 370: radius truncation
        let rocks = [Aabb::new(Vec2::new(370.0, 250.0), Vec2::new(380.0, 262.0))];
        let beam = lidar.cast(origin, &rocks, FIELD).beams[0];
        assert!(!beam.hit);
        assert!((beam.distance - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_obstacle_wins_over_boundary_on_same_step() {
        let lidar = lidar(1, 10.0, FIELD);
        // Step 5 lands on x = 515, outside the field but inside the box
        let rocks = [Aabb::new(Vec2::new(505.0, 250.0), Vec2::new(530.0, 262.0))];
        let beam = lidar.cast(Vec2::new(465.0, 256.0), &rocks, FIELD).beams[0];
        // Step 4 (x = 505) already touches the box edge
        assert!(beam.hit);
        assert!((beam.distance - 40.0).abs() < 1e-3);

        let rocks = [Aabb::new(Vec2::new(513.0, 250.0), Vec2::new(530.0, 262.0))];
        let beam = lidar.cast(Vec2::new(465.0, 256.0), &rocks, FIELD).beams[0];
        assert!(beam.hit);
        assert!((beam.distance - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_broad_phase_matches_brute_force() {
        let lidar = lidar(16, 5.0, 120.0);
        let origin = Vec2::new(200.0, 240.0);
        let rocks: Vec<Aabb> = [
            (250.0, 240.0, 20.0),
            (200.0, 150.0, 30.0),
            (20.0, 20.0, 40.0),
            (330.0, 260.0, 16.0),
            (480.0, 480.0, 25.0),
        ]
        .iter()
        .map(|&(x, y, s)| Aabb::square(Vec2::new(x, y), s))
        .collect();

        let scan = lidar.cast(origin, &rocks, FIELD);
        for (beam, &angle) in scan.beams.iter().zip(lidar.angles()) {
            let brute = cast_beam(origin, angle, &rocks, FIELD, 5.0, 120.0);
            assert_eq!(*beam, brute);
        }
        assert!(scan.nearest_hit().is_some());
    }

    #[test]
    fn test_scan_is_idempotent() {
        let mut world = World::new(GameConfig::default(), 21).unwrap();
        for _ in 0..40 {
            let _ = world.step(crate::sim::Action::None);
        }
        let centre = world.player().position;
        world.insert_rock(Rock::stationary(centre + Vec2::new(60.0, 0.0), 30.0));

        let lidar = Lidar::new(LidarConfig::default()).unwrap();
        let snapshot = world.observe_raw();
        let first = lidar.scan(&snapshot);
        let second = lidar.scan(&snapshot);
        assert_eq!(first, second);
        assert_eq!(first, lidar.scan_world(&world));
        assert_eq!(first.len(), 64);
        assert!(first.beams[0].hit);
    }

    #[test]
    fn test_flatten_normalized() {
        let lidar = lidar(2, 10.0, 100.0);
        let rocks = [Aabb::square(Vec2::new(306.0, 256.0), 20.0)];
        let flat = lidar.cast(Vec2::splat(256.0), &rocks, FIELD).flatten_normalized();
        assert_eq!(flat.len(), 4);
        // Beam 0 hits at x = 296 (4th step), beam 1 runs the full radius
        assert!((flat[0] - 0.4).abs() < 1e-4);
        assert_eq!(flat[1], 1.0);
        assert!((flat[2] - 1.0).abs() < 1e-4);
        assert_eq!(flat[3], 0.0);
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = LidarConfig {
            step_fraction: 0.0,
            ..Default::default()
        };
        assert!(Lidar::new(config).is_err());
    }
}
