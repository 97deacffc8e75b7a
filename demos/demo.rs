//! Full walk-through of a challenge session in the terminal.
//!
//! Run with: `cargo run --example demo`
//! (set `RUST_LOG`-style filtering through the default `tracing_subscriber`
//! formatter; debug events are hidden by default).
//!
//! 1. **Landing → challenge**: `start()` renders a seeded 4x4 grid.
//! 2. **Failure**: three decoy picks fail the attempt; the failure is shown
//!    after its delay, dismissed, and a new grid follows.
//! 3. **Win**: target picks (with cycles in between) win the second attempt,
//!    and the reveal screen follows after the win delay.
//!
//! A virtual clock (`ManualTimer`) stands in for real time, so the output is
//! identical on every run.

use captcha_gate::{
    to_client_view, CellOutcome, ChallengeConfig, ChallengeSession, ContentItem, ManualTimer,
    OutcomePresenter, RenderSurface, Screen,
};

/// Keeps placeholder labels for the grid and prints visual changes and
/// screen / outcome notifications.
struct TerminalSurface {
    cells: Vec<String>,
}

impl RenderSurface for TerminalSurface {
    fn render_cell(&mut self, position: usize, content: &ContentItem, _is_target: bool) {
        if self.cells.len() <= position {
            self.cells.resize(position + 1, String::new());
        }
        self.cells[position] = content.placeholder_label();
    }

    fn update_cell_visual(&mut self, position: usize, outcome: CellOutcome) {
        if outcome != CellOutcome::Selected {
            println!("    cell {position:>2} → {outcome}");
        }
    }
}

impl OutcomePresenter for TerminalSurface {
    fn show_screen(&mut self, screen: Screen) {
        println!("  [screen] {screen}");
    }

    fn notify_won(&mut self) {
        println!("  [outcome] you picked me. ♥");
    }

    fn notify_failed(&mut self) {
        println!("  [outcome] How could you?!");
    }

    fn notify_failure_dismissed(&mut self) {
        println!("  [outcome] try again...");
    }
}

fn print_grid(surface: &TerminalSurface) {
    for row in surface.cells.chunks(4) {
        let line: Vec<String> = row.iter().map(|c| format!("{c:<10}")).collect();
        println!("    {}", line.join(" "));
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let config = ChallengeConfig::default().with_seed(2015);
    let surface = TerminalSurface { cells: Vec::new() };
    let mut session = match ChallengeSession::new(config, surface, ManualTimer::new()) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("cannot start challenge: {err}");
            return;
        }
    };

    // ── Landing → challenge ────────────────────────────────────────────────
    println!();
    println!("══ Select all images of me ══");
    session.start();
    print_grid(session.surface());

    // ── A failed attempt ───────────────────────────────────────────────────
    println!();
    println!("══ Attempt 1: picking strangers ══");
    for p in session.state().decoy_positions().into_iter().take(3) {
        println!("  click {p:>2}: {:?}", session.select_cell(p));
    }
    session.advance(300);
    session.dismiss_failure();
    session.advance(300);
    println!();
    println!("══ Attempt 2 (generation {}) ══", session.generation());
    print_grid(session.surface());

    // ── A winning attempt ──────────────────────────────────────────────────
    println!();
    while session.screen() == Screen::Challenge && !session.phase().is_terminal() {
        let next = session
            .state()
            .target_positions()
            .into_iter()
            .find(|&p| session.is_clickable(p));
        match next {
            Some(p) => println!("  click {p:>2}: {:?}", session.select_cell(p)),
            None => session.advance(session.config().cycle_delay_ms),
        }
        // Give every correct pick time to cycle before the next one.
        session.advance(session.config().cycle_delay_ms);
    }
    session.advance(session.config().win_delay_ms);

    println!();
    println!("══ Client view ══");
    match serde_json::to_string_pretty(&to_client_view(&session)) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("cannot render client view: {err}"),
    }
}
