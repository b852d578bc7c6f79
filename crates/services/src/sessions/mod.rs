mod plan;
mod view;
mod workflow;

// Public API of the quiz session subsystem.
pub use crate::error::QuizServiceError;
pub use plan::{QuestionPlan, QuestionPlanner};
pub use view::{GameHistoryItem, GameHistoryService};
pub use workflow::{ActiveQuiz, QuizLoopService, QuizRequest};
