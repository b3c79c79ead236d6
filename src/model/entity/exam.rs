use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Exam {
    id: Uuid,
    category_id: Uuid,
    name: String,
    description: String,
    duration_minutes: i32,
    total_questions: i32,
    passing_score: i32,
    is_active: bool,
}

/// Exam metadata applied when an exam row is first created. Re-specifying
/// metadata for an existing exam leaves the stored row untouched.
#[derive(Debug, Clone)]
pub struct ExamDefaults {
    pub description: String,
    pub duration_minutes: i32,
    pub total_questions: i32,
    pub passing_score: i32,
}

impl Default for ExamDefaults {
    fn default() -> Self {
        Self {
            description: String::new(),
            duration_minutes: 60,
            total_questions: 10,
            passing_score: 60,
        }
    }
}

impl ResourceTyped for Exam {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Exam
    }
}

impl Exam {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn category_id(&self) -> Uuid {
        self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration_minutes(&self) -> i32 {
        self.duration_minutes
    }

    pub fn passing_score(&self) -> i32 {
        self.passing_score
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Lookup-or-create by the natural key (category, name).
    pub async fn find_or_create(
        conn: &mut PgConnection,
        category_id: Uuid,
        name: &str,
        defaults: &ExamDefaults,
    ) -> DatabaseResult<Self> {
        let found: Option<Self> = sqlx::query_as(
            "SELECT * FROM exams WHERE category_id = $1 AND name = $2",
        )
        .bind(category_id)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(exam) = found {
            return Ok(exam);
        }

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO exams (id, category_id, name, description,
                               duration_minutes, total_questions, passing_score, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, true)
            "#,
        )
        .bind(id)
        .bind(category_id)
        .bind(name)
        .bind(&defaults.description)
        .bind(defaults.duration_minutes)
        .bind(defaults.total_questions)
        .bind(defaults.passing_score)
        .execute(&mut *conn)
        .await?;

        Ok(Exam {
            id,
            category_id,
            name: name.to_string(),
            description: defaults.description.clone(),
            duration_minutes: defaults.duration_minutes,
            total_questions: defaults.total_questions,
            passing_score: defaults.passing_score,
            is_active: true,
        })
    }

    pub async fn find_active(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM exams WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    pub async fn count_active_questions(mm: &ModelManager, exam_id: Uuid) -> DatabaseResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE exam_id = $1 AND is_active")
                .bind(exam_id)
                .fetch_one(mm.executor())
                .await?;

        Ok(count)
    }
}

// Utils

/// Listing row for the exam catalogue: active exams that have at least one
/// active question, with their category name, question count and topics.
#[derive(Debug, FromRow)]
pub struct ExamOverviewRow {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub total_questions: i32,
    pub passing_score: i32,
    pub question_count: i64,
    pub topics: serde_json::Value,
}

impl ExamOverviewRow {
    pub async fn fetch_all(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<Self> = sqlx::query_as(
            r#"
            SELECT
                e.id,
                e.category_id,
                c.name AS category_name,
                e.name,
                e.description,
                e.duration_minutes,
                e.total_questions,
                e.passing_score,
                (SELECT COUNT(*) FROM questions q
                 WHERE q.exam_id = e.id AND q.is_active) AS question_count,
                COALESCE(
                    (SELECT json_agg(
                        json_build_object(
                            'id', t.id,
                            'name', t.name,
                            'description', t.description,
                            'order_index', t.order_index
                        ) ORDER BY t.order_index, t.name)
                     FROM topics t WHERE t.exam_id = e.id),
                    '[]'::json
                ) AS topics
            FROM exams e
            JOIN categories c ON c.id = e.category_id
            WHERE e.is_active
              AND EXISTS (SELECT 1 FROM questions q
                          WHERE q.exam_id = e.id AND q.is_active)
            ORDER BY c.name, e.name
            "#,
        )
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
