use std::fmt;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Content primitives
// ---------------------------------------------------------------------------

/// Which pool a piece of content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Target,
    Decoy,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Target => write!(f, "target"),
            Category::Decoy  => write!(f, "decoy"),
        }
    }
}

/// One item drawn from a pool: the opaque id plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub category: Category,
    /// Index into the pool this item was drawn from.
    pub index: usize,
    pub id: String,
}

impl ContentItem {
    /// Text shown when real images are unavailable.
    pub fn placeholder_label(&self) -> String {
        match self.category {
            Category::Target => format!("TARGET {}", self.index + 1),
            Category::Decoy  => "OTHER".to_string(),
        }
    }
}

impl fmt::Display for ContentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

// ---------------------------------------------------------------------------
// Grid / cell state
// ---------------------------------------------------------------------------

/// Visual marker of a cell, pushed to the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellOutcome {
    None,
    Selected,
    Correct,
    Wrong,
}

impl fmt::Display for CellOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CellOutcome::None     => "none",
            CellOutcome::Selected => "selected",
            CellOutcome::Correct  => "correct",
            CellOutcome::Wrong    => "wrong",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub content: ContentItem,
    pub is_target: bool,
    pub outcome: CellOutcome,
}

impl Cell {
    pub fn new(content: ContentItem) -> Self {
        let is_target = content.category == Category::Target;
        Cell { content, is_target, outcome: CellOutcome::None }
    }
}

// ---------------------------------------------------------------------------
// Session-level enums
// ---------------------------------------------------------------------------

/// Evaluator state. `Cycling` is reported while at least one correct cell
/// is waiting to be refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengePhase {
    Idle,
    Cycling,
    Won,
    Failed,
}

impl ChallengePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ChallengePhase::Won | ChallengePhase::Failed)
    }
}

impl fmt::Display for ChallengePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengePhase::Idle    => write!(f, "Idle"),
            ChallengePhase::Cycling => write!(f, "Cycling"),
            ChallengePhase::Won     => write!(f, "Won"),
            ChallengePhase::Failed  => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Landing,
    Challenge,
    Reveal,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Landing   => write!(f, "Landing"),
            Screen::Challenge => write!(f, "Challenge"),
            Screen::Reveal    => write!(f, "Reveal"),
        }
    }
}

/// What a single `select_cell` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionOutcome {
    /// Duplicate click, out-of-range position, terminal phase or wrong screen.
    Ignored,
    Correct,
    Wrong,
    Won,
    Failed,
}

// ---------------------------------------------------------------------------
// Deferred effects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Release a correctly picked cell and give it fresh target content.
    Cycle { position: usize },
    ShowWin,
    ShowFailure,
    /// Start a new attempt after the failure was dismissed.
    Retry,
}

/// A scheduled effect tagged with the attempt that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredTask {
    pub generation: u64,
    pub action: DeferredAction,
}
