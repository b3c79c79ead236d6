use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{QuizSession, SessionAnswerRow};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SessionStartRequest {
    pub exam_id: Uuid,
    pub username: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AnswerSubmitRequest {
    pub question_id: Uuid,
    pub choice_ids: Vec<Uuid>,
}

/// A choice in the results view, correctness included.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct GradedChoice {
    pub id: Uuid,
    pub choice_text: String,
    pub is_correct: bool,
    pub order_index: i32,
}

/// Per-question breakdown of a finished session.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AnswerDetail {
    pub question_id: Uuid,
    pub question_text: String,
    pub question_type: String,
    pub difficulty: String,
    pub points: i32,
    pub explanation: String,
    pub is_correct: bool,
    pub choices: Vec<GradedChoice>,
    pub selected_choice_ids: Vec<Uuid>,
}

impl AnswerDetail {
    pub fn from_row(row: SessionAnswerRow) -> Result<Self, serde_json::Error> {
        Ok(Self {
            question_id: row.question_id,
            question_text: row.question_text,
            question_type: row.question_type,
            difficulty: row.difficulty,
            points: row.points,
            explanation: row.explanation,
            is_correct: row.is_correct,
            choices: serde_json::from_value(row.choices)?,
            selected_choice_ids: serde_json::from_value(row.selected_choice_ids)?,
        })
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SessionResultsResponse {
    pub session: QuizSession,
    pub answers: Vec<AnswerDetail>,
    pub total_answered: usize,
    pub correct_count: usize,
    pub score: f64,
}
