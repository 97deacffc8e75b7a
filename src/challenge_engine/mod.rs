//! Core challenge engine: content sampling, grid generation, selection
//! evaluation and the session controller.
//!
//! ## Module overview
//!
//! | Module        | Purpose |
//! |---------------|---------|
//! | `models`      | Shared types: content items, cells, phases, screens, deferred tasks |
//! | `config`      | Static options with defaults and validation |
//! | `error`       | Configuration errors |
//! | `pool`        | Per-category sampler that avoids repeats until a pool is exhausted |
//! | `grid`        | Fisher-Yates target placement and initial grid content |
//! | `timer`       | Timer service trait and a deterministic virtual clock |
//! | `surface`     | Rendering / presenter observer traits |
//! | `session`     | Selection evaluator and attempt lifecycle |
//! | `client_view` | JSON snapshot for a front end, without the answer key |

pub mod client_view;
pub mod config;
pub mod error;
pub mod grid;
pub mod models;
pub mod pool;
pub mod session;
pub mod surface;
pub mod timer;

// Re-export the public API surface so callers can use
// `challenge_engine::ChallengeSession` without reaching into sub-modules.
pub use client_view::to_client_view;
pub use config::ChallengeConfig;
pub use error::ConfigError;
pub use models::{
    Category, Cell, CellOutcome, ChallengePhase, ContentItem, DeferredAction, DeferredTask,
    Screen, SelectionOutcome,
};
pub use pool::{ImagePool, PoolSampler};
pub use session::{ChallengeSession, ChallengeState};
pub use surface::{NullSurface, OutcomePresenter, RecordingSurface, RenderSurface, SurfaceEvent};
pub use timer::{ManualTimer, TimerHandle, TimerService};
