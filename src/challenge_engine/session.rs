//! Challenge session: owns the grid state, evaluates selections and drives
//! every deferred effect.
//!
//! ## Attempts and generations
//!
//! Each call to [`ChallengeSession::new_attempt`] bumps a generation counter.
//! Every task handed to the timer carries the generation that scheduled it;
//! [`ChallengeSession::on_timer`] drops tasks from older generations, so a
//! late cycle or outcome callback can never touch a newer grid. Pending
//! handles are also cancelled on reset.
//!
//! ## Selection rules
//!
//! - A position already in the selected set, out of range, or clicked after
//!   the attempt ended is ignored.
//! - A target pick counts as correct. Unless it wins, the cell is cycled after
//!   `cycle_delay_ms`: released from the selected set and given new target
//!   content.
//! - A decoy pick counts as wrong and stays selected for the rest of the
//!   attempt.

use std::collections::{BTreeSet, HashMap};

use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::challenge_engine::{
    config::ChallengeConfig,
    error::ConfigError,
    grid,
    models::{
        Category, Cell, CellOutcome, ChallengePhase, DeferredAction, DeferredTask, Screen,
        SelectionOutcome,
    },
    pool::PoolSampler,
    surface::{OutcomePresenter, RenderSurface},
    timer::{ManualTimer, TimerHandle, TimerService},
};

/// Mutable state of one attempt.
///
/// `correct_count + wrong_count == selected.len() + cycled_count`: every
/// counted pick is either still selected or was released by a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChallengeState {
    grid: Vec<Cell>,
    selected: BTreeSet<usize>,
    correct_count: u32,
    wrong_count: u32,
    cycled_count: u32,
}

impl ChallengeState {
    fn fresh(grid: Vec<Cell>) -> Self {
        ChallengeState { grid, ..Default::default() }
    }

    pub fn grid(&self) -> &[Cell] {
        &self.grid
    }

    pub fn cell(&self, position: usize) -> Option<&Cell> {
        self.grid.get(position)
    }

    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    /// Correct picks whose cell has since been released.
    pub fn cycled_count(&self) -> u32 {
        self.cycled_count
    }

    pub fn target_positions(&self) -> Vec<usize> {
        self.positions_where(|c| c.is_target)
    }

    pub fn decoy_positions(&self) -> Vec<usize> {
        self.positions_where(|c| !c.is_target)
    }

    fn positions_where(&self, pred: impl Fn(&Cell) -> bool) -> Vec<usize> {
        self.grid
            .iter()
            .enumerate()
            .filter(|(_, c)| pred(*c))
            .map(|(i, _)| i)
            .collect()
    }
}

pub struct ChallengeSession<S, T> {
    config: ChallengeConfig,
    rng: StdRng,
    sampler: PoolSampler,
    state: ChallengeState,
    /// Only `Idle`, `Won` or `Failed`; `Cycling` is derived from `pending_cycles`.
    phase: ChallengePhase,
    screen: Screen,
    generation: u64,
    pending_cycles: HashMap<usize, TimerHandle>,
    outcome_timer: Option<TimerHandle>,
    failure_shown: bool,
    surface: S,
    timer: T,
}

impl<S, T> ChallengeSession<S, T>
where
    S: RenderSurface + OutcomePresenter,
    T: TimerService,
{
    /// Validate `config` and build a session on the landing screen. No grid
    /// exists until [`start`](Self::start).
    pub fn new(config: ChallengeConfig, surface: S, timer: T) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let sampler = PoolSampler::new(config.target_pool.clone(), config.decoy_pool.clone());

        Ok(ChallengeSession {
            config,
            rng,
            sampler,
            state: ChallengeState::default(),
            phase: ChallengePhase::Idle,
            screen: Screen::Landing,
            generation: 0,
            pending_cycles: HashMap::new(),
            outcome_timer: None,
            failure_shown: false,
            surface,
            timer,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    pub fn state(&self) -> &ChallengeState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> ChallengePhase {
        if self.phase.is_terminal() || self.pending_cycles.is_empty() {
            self.phase
        } else {
            ChallengePhase::Cycling
        }
    }

    /// True while the failure outcome is on screen and can be dismissed.
    pub fn failure_shown(&self) -> bool {
        self.failure_shown
    }

    pub fn is_clickable(&self, position: usize) -> bool {
        self.accepts_input()
            && position < self.state.grid.len()
            && !self.state.selected.contains(&position)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    // -----------------------------------------------------------------------
    // Controller operations
    // -----------------------------------------------------------------------

    /// Leave the landing screen and show the first grid.
    pub fn start(&mut self) {
        if self.screen != Screen::Landing {
            return;
        }
        self.screen = Screen::Challenge;
        self.surface.show_screen(Screen::Challenge);
        self.new_attempt();
    }

    /// Discard the current attempt and build a new grid.
    pub fn new_attempt(&mut self) {
        self.generation += 1;
        self.cancel_pending_cycles();
        if let Some(handle) = self.outcome_timer.take() {
            self.timer.cancel(handle);
        }

        self.sampler.reset();
        let grid = grid::generate(
            &mut self.rng,
            &mut self.sampler,
            self.config.grid_size,
            self.config.initial_correct_count,
        );
        self.state = ChallengeState::fresh(grid);
        self.phase = ChallengePhase::Idle;
        self.failure_shown = false;

        for (position, cell) in self.state.grid.iter().enumerate() {
            self.surface.render_cell(position, &cell.content, cell.is_target);
        }
        info!(generation = self.generation, "challenge attempt started");
    }

    /// The refresh button: a new grid, unless the attempt already ended.
    pub fn refresh(&mut self) -> bool {
        if !self.accepts_input() {
            debug!(phase = %self.phase, "refresh ignored");
            return false;
        }
        self.new_attempt();
        true
    }

    /// Evaluate one click.
    pub fn select_cell(&mut self, position: usize) -> SelectionOutcome {
        if !self.is_clickable(position) {
            debug!(position, phase = %self.phase, "selection ignored");
            return SelectionOutcome::Ignored;
        }

        self.state.selected.insert(position);
        self.surface.update_cell_visual(position, CellOutcome::Selected);

        if self.state.grid[position].is_target {
            self.state.correct_count += 1;
            self.mark(position, CellOutcome::Correct);
            debug!(position, correct = self.state.correct_count, "correct selection");

            if self.state.correct_count >= self.config.correct_to_win {
                self.enter_won();
                return SelectionOutcome::Won;
            }

            let task = self.task(DeferredAction::Cycle { position });
            let handle = self.timer.schedule_once(self.config.cycle_delay_ms, task);
            self.pending_cycles.insert(position, handle);
            SelectionOutcome::Correct
        } else {
            self.state.wrong_count += 1;
            self.mark(position, CellOutcome::Wrong);
            debug!(position, wrong = self.state.wrong_count, "wrong selection");

            if self.state.wrong_count >= self.config.wrong_to_fail {
                self.enter_failed();
                return SelectionOutcome::Failed;
            }
            SelectionOutcome::Wrong
        }
    }

    /// The verify button. With enough correct picks the reveal is shown at
    /// once, skipping whatever is left of the win delay.
    pub fn verify(&mut self) -> bool {
        if self.screen != Screen::Challenge {
            return false;
        }
        match self.phase {
            ChallengePhase::Won => {}
            ChallengePhase::Failed => return false,
            _ => {
                if self.state.correct_count < self.config.correct_to_win {
                    return false;
                }
                self.enter_won();
            }
        }
        if let Some(handle) = self.outcome_timer.take() {
            self.timer.cancel(handle);
        }
        self.reveal();
        true
    }

    /// Acknowledge the failure outcome; a new attempt follows after
    /// `retry_delay_ms`.
    pub fn dismiss_failure(&mut self) -> bool {
        if self.phase != ChallengePhase::Failed || !self.failure_shown {
            return false;
        }
        self.failure_shown = false;
        self.surface.notify_failure_dismissed();
        self.schedule_outcome(self.config.retry_delay_ms, DeferredAction::Retry);
        true
    }

    /// Apply a fired timer task. Tasks from an older generation are dropped.
    pub fn on_timer(&mut self, task: DeferredTask) {
        if task.generation != self.generation {
            debug!(
                task_generation = task.generation,
                generation = self.generation,
                action = ?task.action,
                "stale task discarded"
            );
            return;
        }

        match task.action {
            DeferredAction::Cycle { position } => {
                self.pending_cycles.remove(&position);
                if self.phase.is_terminal() {
                    return;
                }
                self.cycle_cell(position);
            }
            DeferredAction::ShowWin => {
                self.outcome_timer = None;
                if self.phase != ChallengePhase::Won || self.screen != Screen::Challenge {
                    return;
                }
                self.reveal();
            }
            DeferredAction::ShowFailure => {
                self.outcome_timer = None;
                if self.phase != ChallengePhase::Failed {
                    return;
                }
                self.failure_shown = true;
                self.surface.notify_failed();
            }
            DeferredAction::Retry => {
                self.outcome_timer = None;
                if self.phase == ChallengePhase::Failed {
                    self.new_attempt();
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn accepts_input(&self) -> bool {
        self.screen == Screen::Challenge && !self.phase.is_terminal()
    }

    fn task(&self, action: DeferredAction) -> DeferredTask {
        DeferredTask { generation: self.generation, action }
    }

    fn mark(&mut self, position: usize, outcome: CellOutcome) {
        self.state.grid[position].outcome = outcome;
        self.surface.update_cell_visual(position, outcome);
    }

    fn reveal(&mut self) {
        self.screen = Screen::Reveal;
        self.surface.show_screen(Screen::Reveal);
        self.surface.notify_won();
    }

    fn cycle_cell(&mut self, position: usize) {
        if !self.state.selected.remove(&position) {
            return;
        }
        self.state.cycled_count += 1;

        let content = self.sampler.draw(&mut self.rng, Category::Target);
        let cell = &mut self.state.grid[position];
        cell.content = content;
        cell.outcome = CellOutcome::None;

        self.surface.update_cell_visual(position, CellOutcome::None);
        self.surface.render_cell(position, &cell.content, cell.is_target);
        debug!(position, content = %cell.content, "cell cycled");
    }

    fn enter_won(&mut self) {
        self.phase = ChallengePhase::Won;
        self.cancel_pending_cycles();
        self.schedule_outcome(self.config.win_delay_ms, DeferredAction::ShowWin);
        info!(
            generation = self.generation,
            correct = self.state.correct_count,
            wrong = self.state.wrong_count,
            "challenge won"
        );
    }

    fn enter_failed(&mut self) {
        self.phase = ChallengePhase::Failed;
        self.cancel_pending_cycles();
        self.schedule_outcome(self.config.fail_delay_ms, DeferredAction::ShowFailure);
        info!(
            generation = self.generation,
            correct = self.state.correct_count,
            wrong = self.state.wrong_count,
            "challenge failed"
        );
    }

    fn schedule_outcome(&mut self, delay_ms: u64, action: DeferredAction) {
        let task = self.task(action);
        self.outcome_timer = Some(self.timer.schedule_once(delay_ms, task));
    }

    fn cancel_pending_cycles(&mut self) {
        for (_, handle) in self.pending_cycles.drain() {
            self.timer.cancel(handle);
        }
    }
}

impl<S> ChallengeSession<S, ManualTimer>
where
    S: RenderSurface + OutcomePresenter,
{
    /// Move the virtual clock forward by `ms`, firing every task that comes
    /// due in deadline order (including tasks scheduled along the way).
    pub fn advance(&mut self, ms: u64) {
        let until = self.timer.now_ms().saturating_add(ms);
        while let Some(task) = self.timer.pop_due(until) {
            self.on_timer(task);
        }
        self.timer.set_now(until);
    }
}
