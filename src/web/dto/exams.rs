use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{ExamOverviewRow, QuestionWithChoicesRow};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct TopicResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub order_index: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ExamResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub total_questions: i32,
    pub passing_score: i32,
    pub question_count: i64,
    pub topics: Vec<TopicResponse>,
}

impl ExamResponse {
    pub fn from_row(row: ExamOverviewRow) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: row.id,
            category_id: row.category_id,
            category_name: row.category_name,
            name: row.name,
            description: row.description,
            duration_minutes: row.duration_minutes,
            total_questions: row.total_questions,
            passing_score: row.passing_score,
            question_count: row.question_count,
            topics: serde_json::from_value(row.topics)?,
        })
    }
}

/// A choice as shown while taking a quiz; correctness stays server-side.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct PublicChoice {
    pub id: Uuid,
    pub choice_text: String,
    pub order_index: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub topic_id: Option<Uuid>,
    pub question_text: String,
    pub question_type: String,
    pub difficulty: String,
    pub explanation: String,
    pub points: i32,
    pub order_index: i32,
    pub choices: Vec<PublicChoice>,
}

impl QuestionResponse {
    pub fn from_row(row: QuestionWithChoicesRow) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: row.id,
            topic_id: row.topic_id,
            question_text: row.question_text,
            question_type: row.question_type,
            difficulty: row.difficulty,
            explanation: row.explanation,
            points: row.points,
            order_index: row.order_index,
            choices: serde_json::from_value(row.choices)?,
        })
    }
}
