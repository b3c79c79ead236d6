#[derive(Debug, Clone)]
pub enum ResourceType {
    Participant,
    Category,
    Exam,
    Topic,
    Question,
    Choice,
    QuizSession,
    UserAnswer,
}

pub trait ResourceTyped {
    fn get_resource_type() -> ResourceType;
}
