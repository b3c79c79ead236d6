use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Choice {
    id: Uuid,
    question_id: Uuid,
    choice_text: String,
    is_correct: bool,
    order_index: i32,
}

/// A choice row about to be written for a question.
#[derive(Debug, Clone)]
pub struct NewChoice {
    pub text: String,
    pub is_correct: bool,
}

impl ResourceTyped for Choice {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Choice
    }
}

impl Choice {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question_id(&self) -> Uuid {
        self.question_id
    }

    pub fn choice_text(&self) -> &str {
        &self.choice_text
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    /// Drops every stored choice of the question and writes the given set in
    /// order. Old rows are never merged with the new ones.
    pub async fn replace_for_question(
        conn: &mut PgConnection,
        question_id: Uuid,
        choices: &[NewChoice],
    ) -> DatabaseResult<u64> {
        sqlx::query("DELETE FROM choices WHERE question_id = $1")
            .bind(question_id)
            .execute(&mut *conn)
            .await?;

        for (index, choice) in choices.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO choices (id, question_id, choice_text, is_correct, order_index)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(question_id)
            .bind(&choice.text)
            .bind(choice.is_correct)
            .bind(index as i32)
            .execute(&mut *conn)
            .await?;
        }

        Ok(choices.len() as u64)
    }

    /// Ids of the correct choices of a question.
    pub async fn correct_ids(mm: &ModelManager, question_id: Uuid) -> DatabaseResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM choices WHERE question_id = $1 AND is_correct",
        )
        .bind(question_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(ids)
    }

    /// Filters the submitted ids down to those that actually belong to the
    /// question.
    pub async fn ids_belonging_to_question(
        mm: &ModelManager,
        question_id: Uuid,
        candidate_ids: &[Uuid],
    ) -> DatabaseResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM choices WHERE question_id = $1 AND id = ANY($2)",
        )
        .bind(question_id)
        .bind(candidate_ids)
        .fetch_all(mm.executor())
        .await?;

        Ok(ids)
    }
}
