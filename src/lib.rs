//! # captcha_gate
//!
//! A playful "select all images of me" challenge that guards a reveal screen.
//!
//! The user lands on an intro screen, solves a grid of target and decoy
//! images, and is shown the reveal once enough targets were picked. Too many
//! wrong picks show a failure message and, once dismissed, a fresh grid.
//!
//! ## How it works
//!
//! 1. Build a [`ChallengeConfig`] (or load one with
//!    [`ChallengeConfig::from_json_str`]). Pools and thresholds are checked
//!    up front; a bad config is a [`ConfigError`].
//! 2. Create a [`ChallengeSession`] with a rendering surface and a timer
//!    service, then call [`ChallengeSession::start`].
//! 3. Forward clicks to [`ChallengeSession::select_cell`] and fired timer
//!    tasks to [`ChallengeSession::on_timer`] (or use [`ManualTimer`] and
//!    [`ChallengeSession::advance`]).
//!
//! ## Key features
//!
//! - **Never the same picture twice in a row**: each pool is sampled without
//!   repetition until it is exhausted.
//! - **Endless targets**: a correctly picked cell is refreshed with new target
//!   content after a short delay and becomes clickable again.
//! - **Stale-proof timers**: every deferred effect carries the attempt's
//!   generation, so callbacks from a discarded grid are ignored.
//! - **Deterministic**: `rng_seed: Some(u64)` reproduces every grid and draw.
//!
//! ## Quick start
//!
//! ```rust
//! use captcha_gate::{
//!     ChallengeConfig, ChallengePhase, ChallengeSession, ManualTimer, NullSurface,
//! };
//!
//! let config = ChallengeConfig::default().with_seed(42);
//! let mut session = ChallengeSession::new(config, NullSurface, ManualTimer::new())
//!     .expect("default config is valid");
//! session.start();
//!
//! // Keep picking target cells until the challenge is won.
//! while session.phase() != ChallengePhase::Won {
//!     let next = session
//!         .state()
//!         .target_positions()
//!         .into_iter()
//!         .find(|&p| session.is_clickable(p));
//!     match next {
//!         Some(p) => { session.select_cell(p); }
//!         None => session.advance(800),
//!     }
//! }
//! session.advance(500);
//! println!("revealed: {}", session.screen());
//! ```

pub mod challenge_engine;

// Convenience re-exports so callers can use `captcha_gate::ChallengeSession`
// directly without reaching into `challenge_engine::`.
pub use challenge_engine::{
    to_client_view, Category, Cell, CellOutcome, ChallengeConfig, ChallengePhase,
    ChallengeSession, ChallengeState, ConfigError, ContentItem, DeferredAction, DeferredTask,
    ManualTimer, NullSurface, OutcomePresenter, RecordingSurface, RenderSurface, Screen,
    SelectionOutcome, SurfaceEvent, TimerHandle, TimerService,
};

#[cfg(test)]
mod tests;
