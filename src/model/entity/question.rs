use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// How many correct choices a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Single,
    Multiple,
    TrueFalse,
}

impl QuestionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "single" => Some(Self::Single),
            "multiple" => Some(Self::Multiple),
            "true_false" => Some(Self::TrueFalse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
            Self::TrueFalse => "true_false",
        }
    }

    /// True for types that take exactly one correct choice.
    pub fn single_answer(&self) -> bool {
        matches!(self, Self::Single | Self::TrueFalse)
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Question {
    id: Uuid,
    exam_id: Uuid,
    topic_id: Option<Uuid>,
    question_text: String,
    question_type: String,
    difficulty: String,
    explanation: String,
    points: i32,
    order_index: i32,
    is_active: bool,
}

impl ResourceTyped for Question {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Question
    }
}

/// Scalar fields written on both creation and in-place update of a question.
#[derive(Debug, Clone)]
pub struct QuestionUpsert {
    pub topic_id: Option<Uuid>,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub explanation: String,
    pub points: i32,
    pub order_index: i32,
    pub is_active: bool,
}

impl Question {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exam_id(&self) -> Uuid {
        self.exam_id
    }

    pub fn topic_id(&self) -> Option<Uuid> {
        self.topic_id
    }

    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    pub fn question_type(&self) -> QuestionType {
        QuestionType::parse(&self.question_type).unwrap_or(QuestionType::Single)
    }

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Lookup by the natural key (exam, question text).
    pub async fn find_by_exam_and_text(
        conn: &mut PgConnection,
        exam_id: Uuid,
        question_text: &str,
    ) -> DatabaseResult<Option<Self>> {
        let found = sqlx::query_as(
            "SELECT * FROM questions WHERE exam_id = $1 AND question_text = $2",
        )
        .bind(exam_id)
        .bind(question_text)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(found)
    }

    pub async fn create(
        conn: &mut PgConnection,
        exam_id: Uuid,
        question_text: &str,
        data: &QuestionUpsert,
    ) -> DatabaseResult<Self> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO questions (id, exam_id, topic_id, question_text, question_type,
                                   difficulty, explanation, points, order_index, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(exam_id)
        .bind(data.topic_id)
        .bind(question_text)
        .bind(data.question_type.as_str())
        .bind(data.difficulty.as_str())
        .bind(&data.explanation)
        .bind(data.points)
        .bind(data.order_index)
        .bind(data.is_active)
        .execute(&mut *conn)
        .await?;

        Ok(Question {
            id,
            exam_id,
            topic_id: data.topic_id,
            question_text: question_text.to_string(),
            question_type: data.question_type.as_str().to_string(),
            difficulty: data.difficulty.as_str().to_string(),
            explanation: data.explanation.clone(),
            points: data.points,
            order_index: data.order_index,
            is_active: data.is_active,
        })
    }

    /// Overwrites every scalar field; the (exam, question text) key stays.
    pub async fn update_in_place(
        &mut self,
        conn: &mut PgConnection,
        data: &QuestionUpsert,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE questions
            SET topic_id = $1, question_type = $2, difficulty = $3,
                explanation = $4, points = $5, order_index = $6, is_active = $7
            WHERE id = $8
            "#,
        )
        .bind(data.topic_id)
        .bind(data.question_type.as_str())
        .bind(data.difficulty.as_str())
        .bind(&data.explanation)
        .bind(data.points)
        .bind(data.order_index)
        .bind(data.is_active)
        .bind(self.id)
        .execute(&mut *conn)
        .await?;

        self.topic_id = data.topic_id;
        self.question_type = data.question_type.as_str().to_string();
        self.difficulty = data.difficulty.as_str().to_string();
        self.explanation = data.explanation.clone();
        self.points = data.points;
        self.order_index = data.order_index;
        self.is_active = data.is_active;
        Ok(())
    }

    /// Fetch a question, requiring it to belong to the given exam.
    pub async fn find_in_exam(
        mm: &ModelManager,
        id: Uuid,
        exam_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let found = sqlx::query_as("SELECT * FROM questions WHERE id = $1 AND exam_id = $2")
            .bind(id)
            .bind(exam_id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(found)
    }
}

// Utils

/// Question plus its choices as a JSON array, for the public questions
/// endpoint. Correctness flags are deliberately absent from the choice
/// objects.
#[derive(Debug, FromRow)]
pub struct QuestionWithChoicesRow {
    pub id: Uuid,
    pub topic_id: Option<Uuid>,
    pub question_text: String,
    pub question_type: String,
    pub difficulty: String,
    pub explanation: String,
    pub points: i32,
    pub order_index: i32,
    pub choices: serde_json::Value,
}

impl QuestionWithChoicesRow {
    pub async fn fetch_active_for_exam(
        mm: &ModelManager,
        exam_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<Self> = sqlx::query_as(
            r#"
            SELECT
                q.id,
                q.topic_id,
                q.question_text,
                q.question_type,
                q.difficulty,
                q.explanation,
                q.points,
                q.order_index,
                COALESCE(
                    (SELECT json_agg(
                        json_build_object(
                            'id', c.id,
                            'choice_text', c.choice_text,
                            'order_index', c.order_index
                        ) ORDER BY c.order_index)
                     FROM choices c WHERE c.question_id = q.id),
                    '[]'::json
                ) AS choices
            FROM questions q
            WHERE q.exam_id = $1 AND q.is_active
            ORDER BY q.order_index, q.id
            "#,
        )
        .bind(exam_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
