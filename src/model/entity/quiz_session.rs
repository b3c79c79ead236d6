use crate::model::entity::Exam;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizSession {
    id: Uuid,
    participant_id: Uuid,
    exam_id: Uuid,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    is_completed: bool,
    score: f64,
    total_questions: i32,
    correct_answers: i32,
    time_taken_seconds: Option<i32>,
}

impl ResourceTyped for QuizSession {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::QuizSession
    }
}

impl QuizSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn participant_id(&self) -> Uuid {
        self.participant_id
    }

    pub fn exam_id(&self) -> Uuid {
        self.exam_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn correct_answers(&self) -> i32 {
        self.correct_answers
    }

    pub async fn create(
        mm: &ModelManager,
        participant_id: Uuid,
        exam_id: Uuid,
    ) -> DatabaseResult<Self> {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO quiz_sessions (id, participant_id, exam_id, started_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(participant_id)
        .bind(exam_id)
        .bind(started_at)
        .execute(mm.executor())
        .await?;

        Ok(QuizSession {
            id,
            participant_id,
            exam_id,
            started_at,
            completed_at: None,
            is_completed: false,
            score: 0.0,
            total_questions: 0,
            correct_answers: 0,
            time_taken_seconds: None,
        })
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let found = sqlx::query_as("SELECT * FROM quiz_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(found)
    }

    /// Finalizes the attempt: counts correct answers, scores against every
    /// active question of the exam (not just the attempted ones) and stamps
    /// the completion time.
    pub async fn complete(mut self, mm: &ModelManager) -> DatabaseResult<Self> {
        let total = Exam::count_active_questions(mm, self.exam_id).await?;
        let correct: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_answers WHERE session_id = $1 AND is_correct",
        )
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        let completed_at = Utc::now();
        let time_taken = (completed_at - self.started_at).num_seconds() as i32;
        let score = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };

        sqlx::query(
            r#"
            UPDATE quiz_sessions
            SET is_completed = true, completed_at = $1, score = $2,
                total_questions = $3, correct_answers = $4, time_taken_seconds = $5
            WHERE id = $6
            "#,
        )
        .bind(completed_at)
        .bind(score)
        .bind(total as i32)
        .bind(correct as i32)
        .bind(time_taken)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.is_completed = true;
        self.completed_at = Some(completed_at);
        self.score = score;
        self.total_questions = total as i32;
        self.correct_answers = correct as i32;
        self.time_taken_seconds = Some(time_taken);
        Ok(self)
    }
}
