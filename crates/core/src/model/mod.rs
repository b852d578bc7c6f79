mod difficulty;
mod ids;
mod lifeline;
mod question;
mod result;
mod settings;

pub use ids::{ParseIdError, PlayerId, QuestionId};

pub use difficulty::{DifficultyMode, DifficultyTierMap, Tier};
pub use lifeline::{LifelineEffect, LifelineKind, LifelineUsage};
pub use question::{OPTION_COUNT, QuestionError, QuestionRecord};
pub use result::{Outcome, SessionResult};
pub use settings::{QuizSettings, SettingsError};
