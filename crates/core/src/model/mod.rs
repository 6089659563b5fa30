mod bank;
mod ids;
mod letter;
mod question;
mod raw;

pub use bank::{BankLoad, QuestionBank, RecordRejection, RejectedRecord, eligible};
pub use ids::{BankId, ParseIdError, QuestionId, SessionId};
pub use letter::{ChoiceLetter, LetterError, MAX_CHOICES};
pub use question::{Ineligible, Question, QuestionError, VoteRecord};
pub use raw::{RawQuestionRecord, RawVote};
