use serde_json::{json, Value};
use crate::challenge_engine::{
    models::Cell,
    session::ChallengeSession,
    surface::{OutcomePresenter, RenderSurface},
    timer::TimerService,
};

/// Build one cell entry. The target flag is never included.
fn cell_entry(position: usize, cell: &Cell, clickable: bool) -> Value {
    json!({
        "position":  position,
        "content":   cell.content.id,
        "outcome":   cell.outcome.to_string(),
        "clickable": clickable,
    })
}

/// Map a session to the JSON object a front end renders from.
///
/// Includes counters and thresholds and no target flag. The `content` field
/// is the raw pool id, so pools whose ids encode their category (such as the
/// default `images/me/..` and `images/decoys/..` paths) still reveal it.
pub fn to_client_view<S, T>(session: &ChallengeSession<S, T>) -> Value
where
    S: RenderSurface + OutcomePresenter,
    T: TimerService,
{
    let state = session.state();
    let config = session.config();

    let cells: Vec<Value> = state
        .grid()
        .iter()
        .enumerate()
        .map(|(i, c)| cell_entry(i, c, session.is_clickable(i)))
        .collect();

    json!({
        "screen":     session.screen().to_string(),
        "phase":      session.phase().to_string(),
        "generation": session.generation(),
        "progress": {
            "correct":        state.correct_count(),
            "wrong":          state.wrong_count(),
            "correct_to_win": config.correct_to_win,
            "wrong_to_fail":  config.wrong_to_fail,
        },
        "failure_shown": session.failure_shown(),
        "cells": cells,
    })
}
