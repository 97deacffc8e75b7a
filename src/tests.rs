//! Session-level tests for the `captcha_gate` crate.
//!
//! Included from `lib.rs` under `#[cfg(test)]`.
//!
//! | Group | What is tested |
//! |-------|----------------|
//! | Grid | Exact target count, positions unique and in range, seed determinism |
//! | Counters | `correct + wrong == selected + cycled` after every click |
//! | Idempotence | Duplicate and out-of-range clicks leave state untouched |
//! | Win / fail | Thresholds hit exactly on the Nth pick; no mutation afterwards |
//! | Cycling | Released cells stay target, get new content, become clickable |
//! | Stale tasks | Tasks from a discarded attempt never touch the new grid |
//! | Outcome flow | Reveal after the win delay; failure shown, dismissed, retried |
//! | Config | Invalid configurations never produce a session |

use std::collections::HashSet;

use crate::challenge_engine::{
    ChallengeConfig, ChallengePhase, ChallengeSession, ConfigError, DeferredAction,
    DeferredTask, ManualTimer, RecordingSurface, Screen, SelectionOutcome, SurfaceEvent,
    TimerHandle, TimerService,
};

// ── helpers ──────────────────────────────────────────────────────────────────

type TestSession = ChallengeSession<RecordingSurface, ManualTimer>;

/// 16 cells, 8 to win, 3 to fail, 10 initial targets.
fn config(seed: u64) -> ChallengeConfig {
    ChallengeConfig::default().with_seed(seed)
}

fn started(seed: u64) -> TestSession {
    let mut session = ChallengeSession::new(config(seed), RecordingSurface::new(), ManualTimer::new())
        .expect("default config is valid");
    session.start();
    session
}

fn assert_counters_consistent(session: &TestSession) {
    let state = session.state();
    assert_eq!(
        state.correct_count() + state.wrong_count(),
        state.selected().len() as u32 + state.cycled_count(),
        "counter invariant broken"
    );
}

const SEEDS: [u64; 5] = [1, 42, 999, 0xDEAD_BEEF, 7];

// ── grid ─────────────────────────────────────────────────────────────────────

#[test]
fn fresh_grid_has_exactly_the_initial_target_count() {
    for seed in SEEDS {
        let session = started(seed);
        let targets = session.state().target_positions();
        assert_eq!(targets.len(), 10, "seed {seed}");
        let unique: HashSet<usize> = targets.iter().copied().collect();
        assert_eq!(unique.len(), targets.len());
        assert!(targets.iter().all(|&p| p < 16));
        assert_eq!(session.state().grid().len(), 16);
    }
}

#[test]
fn same_seed_produces_identical_grid() {
    let a = started(12345);
    let b = started(12345);
    assert_eq!(a.state(), b.state());
}

#[test]
fn start_renders_every_cell_once() {
    let session = started(3);
    let rendered = session
        .surface()
        .count(|e| matches!(e, SurfaceEvent::RenderCell { .. }));
    assert_eq!(rendered, 16);
    assert_eq!(session.surface().events[0], SurfaceEvent::Screen(Screen::Challenge));
}

// ── counters and idempotence ─────────────────────────────────────────────────

#[test]
fn counters_match_selected_set_without_cycles() {
    for seed in SEEDS {
        let mut session = started(seed);
        // Stay below both thresholds: two decoys, then targets up to seven.
        let decoys = session.state().decoy_positions();
        let targets = session.state().target_positions();
        for &p in decoys.iter().take(2).chain(targets.iter().take(7)) {
            session.select_cell(p);
            let state = session.state();
            assert_eq!(
                state.correct_count() + state.wrong_count(),
                state.selected().len() as u32
            );
        }
    }
}

#[test]
fn counters_stay_consistent_across_cycles() {
    let mut session = started(21);
    let targets = session.state().target_positions();
    for &p in targets.iter().take(4) {
        session.select_cell(p);
        assert_counters_consistent(&session);
        session.advance(400);
        assert_counters_consistent(&session);
    }
    session.advance(800);
    assert_counters_consistent(&session);
    assert_eq!(session.state().cycled_count(), 4);
    assert!(session.state().selected().is_empty());
}

#[test]
fn duplicate_click_is_a_no_op() {
    let mut session = started(5);
    let decoy = session.state().decoy_positions()[0];
    let target = session.state().target_positions()[0];
    session.select_cell(decoy);
    session.select_cell(target);

    let before = session.state().clone();
    let events_before = session.surface().events.len();
    assert_eq!(session.select_cell(decoy), SelectionOutcome::Ignored);
    assert_eq!(session.select_cell(target), SelectionOutcome::Ignored);
    assert_eq!(session.state(), &before);
    assert_eq!(session.surface().events.len(), events_before);
}

#[test]
fn out_of_range_click_is_ignored() {
    let mut session = started(5);
    let before = session.state().clone();
    assert_eq!(session.select_cell(16), SelectionOutcome::Ignored);
    assert_eq!(session.state(), &before);
}

#[test]
fn clicks_on_the_landing_screen_are_ignored() {
    let mut session = ChallengeSession::new(config(1), RecordingSurface::new(), ManualTimer::new())
        .expect("default config is valid");
    assert_eq!(session.screen(), Screen::Landing);
    assert_eq!(session.select_cell(0), SelectionOutcome::Ignored);
    assert!(session.state().grid().is_empty());
}

// ── win ──────────────────────────────────────────────────────────────────────

#[test]
fn eighth_correct_click_wins() {
    for seed in SEEDS {
        let mut session = started(seed);
        let targets = session.state().target_positions();
        for (i, &p) in targets.iter().take(8).enumerate() {
            let outcome = session.select_cell(p);
            if i < 7 {
                assert_eq!(outcome, SelectionOutcome::Correct);
                assert_ne!(session.phase(), ChallengePhase::Won);
                // Let the cycle run before the next pick.
                session.advance(800);
            } else {
                assert_eq!(outcome, SelectionOutcome::Won);
            }
        }
        assert_eq!(session.phase(), ChallengePhase::Won);
        assert_eq!(session.state().correct_count(), 8);
        assert_eq!(session.state().wrong_count(), 0);
    }
}

#[test]
fn one_cell_can_be_picked_repeatedly_through_cycles() {
    let mut session = started(77);
    let p = session.state().target_positions()[0];
    for _ in 0..7 {
        assert_eq!(session.select_cell(p), SelectionOutcome::Correct);
        session.advance(800);
        assert!(session.state().grid()[p].is_target);
    }
    assert_eq!(session.select_cell(p), SelectionOutcome::Won);
}

#[test]
fn nothing_changes_after_winning() {
    let mut session = started(9);
    for p in session.state().target_positions().into_iter().take(8) {
        session.select_cell(p);
    }
    assert_eq!(session.phase(), ChallengePhase::Won);

    let before = session.state().clone();
    for p in 0..16 {
        assert_eq!(session.select_cell(p), SelectionOutcome::Ignored);
    }
    assert!(!session.refresh());
    assert_eq!(session.state(), &before);
}

#[test]
fn winning_cancels_pending_cycles() {
    let mut session = started(31);
    let targets = session.state().target_positions();
    for &p in targets.iter().take(8) {
        session.select_cell(p);
    }
    session.advance(5_000);
    // None of the first seven cells were released.
    assert_eq!(session.state().cycled_count(), 0);
    assert_eq!(session.state().selected().len(), 8);
}

#[test]
fn reveal_follows_the_win_after_the_delay() {
    let mut session = started(4);
    for p in session.state().target_positions().into_iter().take(8) {
        session.select_cell(p);
    }
    assert_eq!(session.screen(), Screen::Challenge);
    session.advance(499);
    assert_eq!(session.screen(), Screen::Challenge);
    session.advance(1);
    assert_eq!(session.screen(), Screen::Reveal);
    assert_eq!(session.surface().count(|e| *e == SurfaceEvent::Won), 1);
}

#[test]
fn verify_below_threshold_does_nothing() {
    let mut session = started(2);
    let p = session.state().target_positions()[0];
    session.select_cell(p);
    assert!(!session.verify());
    assert_ne!(session.phase(), ChallengePhase::Won);
}

#[test]
fn verify_after_a_win_reveals_immediately() {
    let mut session = started(8);
    for p in session.state().target_positions().into_iter().take(8) {
        session.select_cell(p);
    }
    assert_eq!(session.screen(), Screen::Challenge);

    assert!(session.verify());
    assert_eq!(session.screen(), Screen::Reveal);
    assert_eq!(session.surface().count(|e| *e == SurfaceEvent::Won), 1);

    // The pending delayed reveal and a second press change nothing.
    assert!(!session.verify());
    session.advance(1_000);
    assert_eq!(session.surface().count(|e| *e == SurfaceEvent::Won), 1);
    assert_eq!(session.timer().pending(), 0);
}

#[test]
fn verify_after_failing_does_nothing() {
    let mut session = started(10);
    for p in session.state().decoy_positions().into_iter().take(3) {
        session.select_cell(p);
    }
    assert!(!session.verify());
    assert_eq!(session.screen(), Screen::Challenge);
}

#[test]
fn huge_cycle_delay_does_not_wrap_around() {
    let cfg = ChallengeConfig { cycle_delay_ms: u64::MAX, ..config(11) };
    let mut session = ChallengeSession::new(cfg, RecordingSurface::new(), ManualTimer::new())
        .expect("valid config");
    session.start();
    session.advance(1);
    let p = session.state().target_positions()[0];
    assert_eq!(session.select_cell(p), SelectionOutcome::Correct);
    session.advance(10_000_000);
    assert_eq!(session.phase(), ChallengePhase::Cycling);
    assert!(!session.is_clickable(p));
}

// ── fail ─────────────────────────────────────────────────────────────────────

#[test]
fn third_wrong_click_fails_regardless_of_correct_picks() {
    for seed in SEEDS {
        let mut session = started(seed);
        let decoys = session.state().decoy_positions();
        let targets = session.state().target_positions();

        assert_eq!(session.select_cell(decoys[0]), SelectionOutcome::Wrong);
        assert_eq!(session.select_cell(targets[0]), SelectionOutcome::Correct);
        assert_eq!(session.select_cell(decoys[1]), SelectionOutcome::Wrong);
        assert_eq!(session.select_cell(targets[1]), SelectionOutcome::Correct);
        session.advance(800);
        assert_eq!(session.select_cell(decoys[2]), SelectionOutcome::Failed);

        assert_eq!(session.phase(), ChallengePhase::Failed);
        assert_eq!(session.state().wrong_count(), 3);
        assert_eq!(session.state().correct_count(), 2);
    }
}

#[test]
fn wrong_picks_are_never_released() {
    let mut session = started(12);
    let decoy = session.state().decoy_positions()[0];
    session.select_cell(decoy);
    session.advance(10_000);
    assert!(session.state().selected().contains(&decoy));
    assert!(!session.is_clickable(decoy));
}

#[test]
fn nothing_changes_after_failing() {
    let mut session = started(13);
    for p in session.state().decoy_positions().into_iter().take(3) {
        session.select_cell(p);
    }
    let before = session.state().clone();
    for p in 0..16 {
        assert_eq!(session.select_cell(p), SelectionOutcome::Ignored);
    }
    assert_eq!(session.state(), &before);
}

#[test]
fn failure_is_shown_dismissed_and_retried() {
    let mut session = started(14);
    for p in session.state().decoy_positions().into_iter().take(3) {
        session.select_cell(p);
    }
    let generation = session.generation();

    // Not dismissible before it is on screen.
    assert!(!session.dismiss_failure());
    session.advance(300);
    assert!(session.failure_shown());
    assert_eq!(session.surface().count(|e| *e == SurfaceEvent::Failed), 1);

    assert!(session.dismiss_failure());
    assert!(!session.dismiss_failure());
    assert_eq!(session.generation(), generation);

    session.advance(300);
    assert_eq!(session.generation(), generation + 1);
    assert_eq!(session.phase(), ChallengePhase::Idle);
    assert_eq!(session.state().wrong_count(), 0);
    assert!(session.state().selected().is_empty());
    assert_eq!(session.surface().count(|e| *e == SurfaceEvent::FailureDismissed), 1);
}

// ── cycling ──────────────────────────────────────────────────────────────────

#[test]
fn correct_cell_is_cycled_after_the_delay() {
    let mut session = started(15);
    let p = session.state().target_positions()[0];
    session.select_cell(p);
    assert_eq!(session.phase(), ChallengePhase::Cycling);
    assert!(!session.is_clickable(p));

    session.advance(799);
    assert!(session.state().selected().contains(&p));
    session.advance(1);

    assert_eq!(session.phase(), ChallengePhase::Idle);
    assert!(session.is_clickable(p));
    assert!(session.state().grid()[p].is_target);
    assert_eq!(session.state().correct_count(), 1);
    assert_eq!(session.state().cycled_count(), 1);
}

#[test]
fn cycled_cell_gets_fresh_target_content() {
    let mut session = started(16);
    let targets = session.state().target_positions();
    let p = targets[0];
    let before: HashSet<usize> = targets
        .iter()
        .map(|&t| session.state().grid()[t].content.index)
        .collect();

    session.select_cell(p);
    session.advance(800);

    // Ten of eleven target items were dispensed for the grid; the cycle
    // draws the remaining one.
    let after = session.state().grid()[p].content.index;
    assert!(!before.contains(&after));

    let renders = session.surface().events.iter().rev().take(2).collect::<Vec<_>>();
    assert!(matches!(renders[0], SurfaceEvent::RenderCell { position, is_target: true, .. } if *position == p));
}

// ── stale tasks ──────────────────────────────────────────────────────────────

#[test]
fn new_attempt_discards_pending_cycle() {
    let mut session = started(17);
    let p = session.state().target_positions()[0];
    session.select_cell(p);
    let stale = DeferredTask {
        generation: session.generation(),
        action: DeferredAction::Cycle { position: p },
    };

    session.new_attempt();
    let before = session.state().clone();

    // Fired by the clock (cancelled) and replayed by hand (stale generation).
    session.advance(2_000);
    session.on_timer(stale);
    assert_eq!(session.state(), &before);
    assert_eq!(session.timer().pending(), 0);
}

#[test]
fn stale_outcome_tasks_are_ignored() {
    let mut session = started(18);
    let old = session.generation();
    session.refresh();
    let before = session.state().clone();
    for action in [DeferredAction::ShowWin, DeferredAction::ShowFailure, DeferredAction::Retry] {
        session.on_timer(DeferredTask { generation: old, action });
    }
    assert_eq!(session.state(), &before);
    assert_eq!(session.generation(), old + 1);
    assert_eq!(session.screen(), Screen::Challenge);
}

#[test]
fn refresh_resets_counters_and_regenerates() {
    let mut session = started(19);
    let decoy = session.state().decoy_positions()[0];
    session.select_cell(decoy);
    assert!(session.refresh());
    assert_eq!(session.state().wrong_count(), 0);
    assert!(session.state().selected().is_empty());
    assert_eq!(session.state().target_positions().len(), 10);
}

// ── external timer ───────────────────────────────────────────────────────────

/// Timer owned by a host event loop: records what the session asks for.
#[derive(Default)]
struct HostTimer {
    next: u64,
    scheduled: Vec<(TimerHandle, u64, DeferredTask)>,
    cancelled: Vec<TimerHandle>,
}

impl TimerService for HostTimer {
    fn schedule_once(&mut self, delay_ms: u64, task: DeferredTask) -> TimerHandle {
        let handle = TimerHandle(self.next);
        self.next += 1;
        self.scheduled.push((handle, delay_ms, task));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.cancelled.push(handle);
    }
}

#[test]
fn host_timer_receives_delays_and_cancellations() {
    let mut session = ChallengeSession::new(config(20), RecordingSurface::new(), HostTimer::default())
        .expect("default config is valid");
    session.start();
    let p = session.state().target_positions()[0];
    session.select_cell(p);

    let (handle, delay, task) = session.timer().scheduled[0];
    assert_eq!(delay, 800);
    assert_eq!(task.action, DeferredAction::Cycle { position: p });

    // The host fires it: the cell is released.
    session.on_timer(task);
    assert!(session.is_clickable(p));

    session.select_cell(p);
    session.new_attempt();
    let (second, _, _) = session.timer().scheduled[1];
    assert_ne!(second, handle);
    assert!(session.timer().cancelled.contains(&second));
}

// ── config ───────────────────────────────────────────────────────────────────

#[test]
fn invalid_config_never_starts() {
    let cfg = ChallengeConfig { target_pool: vec![], ..config(1) };
    let result = ChallengeSession::new(cfg, RecordingSurface::new(), ManualTimer::new());
    assert!(matches!(result, Err(ConfigError::EmptyPool(_))));

    let cfg = ChallengeConfig { initial_correct_count: 20, ..config(1) };
    let result = ChallengeSession::new(cfg, RecordingSurface::new(), ManualTimer::new());
    assert!(matches!(result, Err(ConfigError::TargetCountOutOfRange { .. })));
}

#[test]
fn entropy_seed_produces_a_valid_session() {
    let cfg = ChallengeConfig { rng_seed: None, ..ChallengeConfig::default() };
    let mut session = ChallengeSession::new(cfg, RecordingSurface::new(), ManualTimer::new())
        .expect("default config is valid");
    session.start();
    assert_eq!(session.state().target_positions().len(), 10);
}
