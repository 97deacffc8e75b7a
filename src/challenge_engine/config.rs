//! Static challenge options, fixed at startup.
//!
//! Defaults reproduce the shipped game: a 4x4 grid with ten target cells,
//! eight correct picks to win and three wrong picks to fail.

use serde::{Deserialize, Serialize};

use crate::challenge_engine::{error::ConfigError, models::Category};

pub const DEFAULT_GRID_SIZE: usize = 16;
pub const DEFAULT_CORRECT_TO_WIN: u32 = 8;
pub const DEFAULT_WRONG_TO_FAIL: u32 = 3;
pub const DEFAULT_CYCLE_DELAY_MS: u64 = 800;
pub const DEFAULT_INITIAL_CORRECT_COUNT: usize = 10;
pub const DEFAULT_WIN_DELAY_MS: u64 = 500;
pub const DEFAULT_FAIL_DELAY_MS: u64 = 300;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    pub grid_size: usize,
    pub correct_to_win: u32,
    pub wrong_to_fail: u32,
    pub cycle_delay_ms: u64,
    /// Number of target cells in a freshly generated grid.
    pub initial_correct_count: usize,
    pub win_delay_ms: u64,
    pub fail_delay_ms: u64,
    pub retry_delay_ms: u64,
    pub target_pool: Vec<String>,
    pub decoy_pool: Vec<String>,
    /// `Some` makes every grid and draw reproducible.
    pub rng_seed: Option<u64>,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        ChallengeConfig {
            grid_size: DEFAULT_GRID_SIZE,
            correct_to_win: DEFAULT_CORRECT_TO_WIN,
            wrong_to_fail: DEFAULT_WRONG_TO_FAIL,
            cycle_delay_ms: DEFAULT_CYCLE_DELAY_MS,
            initial_correct_count: DEFAULT_INITIAL_CORRECT_COUNT,
            win_delay_ms: DEFAULT_WIN_DELAY_MS,
            fail_delay_ms: DEFAULT_FAIL_DELAY_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            target_pool: (1..=11).map(|i| format!("images/me/{i:02}.jpg")).collect(),
            decoy_pool: (1..=6).map(|i| format!("images/decoys/{i:02}.jpg")).collect(),
            rng_seed: None,
        }
    }
}

impl ChallengeConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ChallengeConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Check thresholds, grid composition and that every pool the grid can
    /// draw from has at least one item.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.correct_to_win == 0 {
            return Err(ConfigError::ZeroWinThreshold);
        }
        if self.wrong_to_fail == 0 {
            return Err(ConfigError::ZeroFailThreshold);
        }
        if self.initial_correct_count > self.grid_size {
            return Err(ConfigError::TargetCountOutOfRange {
                count: self.initial_correct_count,
                grid_size: self.grid_size,
            });
        }
        if self.initial_correct_count > 0 && self.target_pool.is_empty() {
            return Err(ConfigError::EmptyPool(Category::Target));
        }
        if self.initial_correct_count < self.grid_size && self.decoy_pool.is_empty() {
            return Err(ConfigError::EmptyPool(Category::Decoy));
        }
        Ok(())
    }
}
