use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAP_WIDTH: i32 = 40;
pub const DEFAULT_MAP_HEIGHT: i32 = 12;
pub const DEFAULT_MAX_ENEMIES: usize = 25;
pub const DEFAULT_LEADERBOARD_CAPACITY: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tuning knobs and file locations for one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_width: i32,
    pub map_height: i32,
    pub max_enemies: usize,
    pub leaderboard_capacity: usize,
    pub obstacle_percent: i32,
    pub hazard_percent: i32,
    pub boss_interval: u32,
    pub boss_band_half_width: i32,
    pub spawn_interval: u32,
    pub wave_min: i32,
    pub wave_max: i32,
    pub spawn_exclusion: i32,
    pub chase_radius: i32,
    pub progress_divisor: f32,
    pub banner_millis: u64,
    pub save_path: PathBuf,
    pub leaderboard_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: DEFAULT_MAP_WIDTH,
            map_height: DEFAULT_MAP_HEIGHT,
            max_enemies: DEFAULT_MAX_ENEMIES,
            leaderboard_capacity: DEFAULT_LEADERBOARD_CAPACITY,
            obstacle_percent: 5,
            hazard_percent: 5,
            boss_interval: 200,
            boss_band_half_width: 5,
            spawn_interval: 20,
            wave_min: 3,
            wave_max: 5,
            spawn_exclusion: 5,
            chase_radius: 5,
            progress_divisor: 80.0,
            banner_millis: 1000,
            save_path: PathBuf::from("savegame.dat"),
            leaderboard_path: PathBuf::from("leaderboard.txt"),
        }
    }
}

impl GameConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_width < 5 {
            return Err(ConfigError::Invalid(format!(
                "map_width must be at least 5 (got {})",
                self.map_width
            )));
        }
        if self.map_height < 4 {
            return Err(ConfigError::Invalid(format!(
                "map_height must be at least 4 (got {})",
                self.map_height
            )));
        }
        if self.max_enemies == 0 || self.leaderboard_capacity == 0 {
            return Err(ConfigError::Invalid(
                "max_enemies and leaderboard_capacity must be non-zero".to_string(),
            ));
        }
        if self.boss_interval == 0 || self.spawn_interval == 0 {
            return Err(ConfigError::Invalid(
                "boss_interval and spawn_interval must be non-zero".to_string(),
            ));
        }
        if self.wave_min < 0 || self.wave_min > self.wave_max {
            return Err(ConfigError::Invalid(format!(
                "wave range {}..={} is empty",
                self.wave_min, self.wave_max
            )));
        }
        if self.obstacle_percent < 0
            || self.hazard_percent < 0
            || self.obstacle_percent + self.hazard_percent > 100
        {
            return Err(ConfigError::Invalid(
                "terrain percentages must be non-negative and sum to at most 100".to_string(),
            ));
        }
        if self.progress_divisor <= 0.0 {
            return Err(ConfigError::Invalid(
                "progress_divisor must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Most enemies a session can hold: full waves plus one boss-room guardian.
    pub fn enemy_capacity(&self) -> usize {
        self.max_enemies + 1
    }

    /// Rows above this line trigger a world shift on upward movement.
    pub fn shift_threshold(&self) -> i32 {
        self.map_height / 4
    }

    pub fn progress_factor(&self, world_offset: u32) -> f32 {
        1.0 + world_offset as f32 / self.progress_divisor
    }

    pub fn banner_hold(&self) -> Duration {
        Duration::from_millis(self.banner_millis)
    }
}
