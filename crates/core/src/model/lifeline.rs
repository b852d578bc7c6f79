use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-question assistance actions a player may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifelineKind {
    Skip,
    Eliminate,
    Hint,
}

impl fmt::Display for LifelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LifelineKind::Skip => "skip",
            LifelineKind::Eliminate => "eliminate",
            LifelineKind::Hint => "hint",
        };
        f.write_str(label)
    }
}

/// Which lifelines have been spent on the current question.
///
/// A fresh question starts with all three available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct LifelineUsage {
    pub skip_used: bool,
    pub eliminate_used: bool,
    pub hint_used: bool,
}

impl LifelineUsage {
    #[must_use]
    pub fn is_used(&self, kind: LifelineKind) -> bool {
        match kind {
            LifelineKind::Skip => self.skip_used,
            LifelineKind::Eliminate => self.eliminate_used,
            LifelineKind::Hint => self.hint_used,
        }
    }

    pub fn mark_used(&mut self, kind: LifelineKind) {
        match kind {
            LifelineKind::Skip => self.skip_used = true,
            LifelineKind::Eliminate => self.eliminate_used = true,
            LifelineKind::Hint => self.hint_used = true,
        }
    }
}

/// What a successful lifeline activation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifelineEffect {
    /// The question was forfeited without penalty and the session moved on.
    Skipped,
    /// Two wrong options were removed; indices are in ascending order.
    Eliminated { removed: [usize; 2] },
    /// The question's hint text.
    Hint(String),
}
