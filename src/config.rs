//! Game and sensor configuration
//!
//! Speeds and sizes are expressed as fractions of the screen (per second for
//! speeds) so a config stays meaningful across screen sizes and framerates.
//! The world converts them to per-tick distances once, at construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Rejected configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be finite")]
    NotFinite { field: &'static str },
    #[error("{field}: min {min} is greater than max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("lidar needs {steps} steps per beam, more than the {limit} allowed")]
    TooManySteps { steps: f32, limit: f32 },
    #[error("unknown difficulty preset: {0}")]
    UnknownPreset(String),
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn require_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field })
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    require_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn require_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

/// How new rocks are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// Exactly one rock every `ceil(framerate / rock_rate)` ticks
    #[default]
    Cadence,
    /// Per-tick coin flip against a threshold that grows with time survived.
    /// Every `increment` seconds adds one rock/second to the base rate.
    Rate { increment: f32 },
}

impl SpawnPolicy {
    /// Rate mode with the classic 50-second ramp
    pub fn ramping() -> Self {
        SpawnPolicy::Rate {
            increment: ROCK_RATE_INCREMENT,
        }
    }
}

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "med" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

/// World configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Lives the player starts with
    pub lives_start: u32,
    /// Portion of the screen the player crosses per second
    pub player_speed: f32,
    /// Player box edge, fraction of the screen
    pub player_size: f32,
    /// Rocks per second
    pub rock_rate: f32,
    /// Rock diameter bounds, fraction of the screen
    pub rock_size_min: f32,
    pub rock_size_max: f32,
    /// Rock speed bounds, portion of the screen per second
    pub rock_speed_min: f32,
    pub rock_speed_max: f32,
    /// Ticks per second
    pub framerate: u32,
    /// Playfield edge length in world units
    pub screen_size: f32,
    /// How far past an edge a rock's box must be before it is pruned
    pub despawn_margin: f32,
    pub spawn_policy: SpawnPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lives_start: LIVES_START,
            player_speed: PLAYER_SPEED,
            player_size: PLAYER_SIZE,
            rock_rate: ROCK_RATE,
            rock_size_min: ROCK_SIZE_MIN,
            rock_size_max: ROCK_SIZE_MAX,
            rock_speed_min: ROCK_SPEED_MIN,
            rock_speed_max: ROCK_SPEED_MAX,
            framerate: FRAMERATE,
            screen_size: SCREEN_SIZE,
            despawn_margin: DESPAWN_MARGIN,
            spawn_policy: SpawnPolicy::Cadence,
        }
    }
}

impl GameConfig {
    /// Config for a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let base = Self::default();
        match difficulty {
            Difficulty::Easy => Self {
                lives_start: 10,
                rock_rate: 1.0,
                ..base
            },
            Difficulty::Medium => base,
            Difficulty::Hard => Self {
                lives_start: 1,
                rock_rate: 4.0,
                rock_speed_min: 0.2,
                rock_speed_max: 0.4,
                ..base
            },
        }
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded game config from {}", path.display());
        Ok(config)
    }

    /// Reject configurations no per-tick policy can recover from
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("framerate", self.framerate as f32)?;
        require_positive("screen_size", self.screen_size)?;
        require_positive("player_size", self.player_size)?;
        require_positive("rock_rate", self.rock_rate)?;
        require_non_negative("player_speed", self.player_speed)?;
        require_non_negative("rock_size_min", self.rock_size_min)?;
        require_non_negative("rock_size_max", self.rock_size_max)?;
        require_range("rock_size", self.rock_size_min, self.rock_size_max)?;
        require_non_negative("rock_speed_min", self.rock_speed_min)?;
        require_non_negative("rock_speed_max", self.rock_speed_max)?;
        require_range("rock_speed", self.rock_speed_min, self.rock_speed_max)?;
        require_non_negative("despawn_margin", self.despawn_margin)?;
        if let SpawnPolicy::Rate { increment } = self.spawn_policy {
            require_positive("rock_rate_increment", increment)?;
        }

        // Per-tick values can overflow even when every field is finite
        let (size_min, size_max) = self.rock_size_range();
        let (speed_min, speed_max) = self.rock_speed_range();
        require_finite("rock_size_min", size_min)?;
        require_finite("rock_size_max", size_max)?;
        require_finite("rock_speed_min", speed_min)?;
        require_finite("rock_speed_max", speed_max)?;
        require_finite("player_speed", self.player_step())?;
        require_finite("player_size", self.player_extent())?;
        Ok(())
    }

    /// Seconds per tick
    #[inline]
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.framerate as f32
    }

    /// Player displacement per tick along each moving axis
    pub fn player_step(&self) -> f32 {
        self.player_speed * self.screen_size * self.tick_seconds()
    }

    /// Player box edge in world units
    pub fn player_extent(&self) -> f32 {
        self.player_size * self.screen_size
    }

    /// Rock diameter bounds in world units
    pub fn rock_size_range(&self) -> (f32, f32) {
        (
            self.rock_size_min * self.screen_size,
            self.rock_size_max * self.screen_size,
        )
    }

    /// Rock speed bounds in world units per tick
    pub fn rock_speed_range(&self) -> (f32, f32) {
        let scale = self.screen_size * self.tick_seconds();
        (self.rock_speed_min * scale, self.rock_speed_max * scale)
    }

    /// Ticks between rocks in cadence mode (never less than one)
    pub fn frames_per_rock(&self) -> u64 {
        let frames = (self.framerate as f32 / self.rock_rate).ceil();
        if frames.is_finite() && frames >= 1.0 {
            frames as u64
        } else {
            1
        }
    }
}

/// Lidar sensor configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LidarConfig {
    /// Beams, evenly spread over a full turn starting at angle 0
    pub beam_count: usize,
    /// March step, fraction of the screen
    pub step_fraction: f32,
    /// Maximum beam length, fraction of the screen
    pub radius_fraction: f32,
}

impl Default for LidarConfig {
    fn default() -> Self {
        Self {
            beam_count: LIDAR_BEAMS,
            step_fraction: LIDAR_STEP_FRACTION,
            radius_fraction: LIDAR_RADIUS_FRACTION,
        }
    }
}

impl LidarConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.beam_count == 0 {
            return Err(ConfigError::NonPositive {
                field: "beam_count",
                value: 0.0,
            });
        }
        require_positive("step_fraction", self.step_fraction)?;
        require_positive("radius_fraction", self.radius_fraction)?;
        let steps = self.radius_fraction / self.step_fraction;
        if !steps.is_finite() || steps > LIDAR_MAX_STEPS {
            return Err(ConfigError::TooManySteps {
                steps,
                limit: LIDAR_MAX_STEPS,
            });
        }
        Ok(())
    }
}
