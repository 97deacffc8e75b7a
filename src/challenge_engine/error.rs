use thiserror::Error;

use crate::challenge_engine::models::Category;

/// Fatal problems with a [`ChallengeConfig`](crate::ChallengeConfig).
///
/// Raised before the first grid is built; a session never starts with an
/// invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid size must be at least 1")]
    EmptyGrid,
    #[error("correct_to_win must be at least 1")]
    ZeroWinThreshold,
    #[error("wrong_to_fail must be at least 1")]
    ZeroFailThreshold,
    #[error("initial_correct_count {count} is outside [0, {grid_size}]")]
    TargetCountOutOfRange { count: usize, grid_size: usize },
    #[error("the {0} pool is empty but the grid needs {0} content")]
    EmptyPool(Category),
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}
