mod plan;
mod progress;
mod registry;
mod session;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use plan::{RosterMode, RosterPlan, select, select_with_rng};
pub use progress::{Outcome, QuestionReview, QuizProgress, QuizSummary, Score, SubmitResult};
pub use registry::SessionRegistry;
pub use session::{Advance, Lifecycle, Operation, QuizSession};
pub use workflow::QuizLoopService;
