mod participant;
pub use participant::Participant;

mod category;
pub use category::{Category, CategoryWithExamCount};

mod exam;
pub use exam::{Exam, ExamDefaults, ExamOverviewRow};

mod topic;
pub use topic::Topic;

mod question;
pub use question::{Difficulty, Question, QuestionType, QuestionUpsert, QuestionWithChoicesRow};

mod choice;
pub use choice::{Choice, NewChoice};

mod quiz_session;
pub use quiz_session::QuizSession;

mod user_answer;
pub use user_answer::{SessionAnswerRow, UserAnswer, selection_matches};
