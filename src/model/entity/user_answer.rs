use std::collections::BTreeSet;

use crate::model::entity::QuestionType;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserAnswer {
    id: Uuid,
    session_id: Uuid,
    question_id: Uuid,
    is_correct: bool,
    answered_at: DateTime<Utc>,
}

impl ResourceTyped for UserAnswer {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::UserAnswer
    }
}

/// Whether a selection answers the question correctly: the selected set must
/// equal the correct set, and single-answer types accept exactly one pick.
pub fn selection_matches(
    question_type: QuestionType,
    selected: &BTreeSet<Uuid>,
    correct: &BTreeSet<Uuid>,
) -> bool {
    if correct.is_empty() {
        return false;
    }
    if question_type.single_answer() && selected.len() != 1 {
        return false;
    }
    selected == correct
}

impl UserAnswer {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question_id(&self) -> Uuid {
        self.question_id
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    /// Stores (or replaces) the participant's selection for a question
    /// within a session. The previous selection, if any, is dropped whole.
    pub async fn upsert_selection(
        mm: &ModelManager,
        session_id: Uuid,
        question_id: Uuid,
        choice_ids: &[Uuid],
        is_correct: bool,
    ) -> DatabaseResult<Self> {
        let mut tx = mm.executor().begin().await?;

        let answer: UserAnswer = sqlx::query_as(
            r#"
            INSERT INTO user_answers (id, session_id, question_id, is_correct, answered_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id, question_id)
            DO UPDATE SET is_correct = EXCLUDED.is_correct, answered_at = EXCLUDED.answered_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session_id)
        .bind(question_id)
        .bind(is_correct)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM user_answer_choices WHERE user_answer_id = $1")
            .bind(answer.id)
            .execute(&mut *tx)
            .await?;

        for choice_id in choice_ids {
            sqlx::query(
                "INSERT INTO user_answer_choices (user_answer_id, choice_id) VALUES ($1, $2)",
            )
            .bind(answer.id)
            .bind(choice_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(answer)
    }

    pub async fn count_for_session(mm: &ModelManager, session_id: Uuid) -> DatabaseResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_answers WHERE session_id = $1")
                .bind(session_id)
                .fetch_one(mm.executor())
                .await?;

        Ok(count)
    }
}

// Utils

/// One graded question of a finished session, with the full choice set
/// (including correctness) and the ids the participant picked.
#[derive(Debug, FromRow)]
pub struct SessionAnswerRow {
    pub question_id: Uuid,
    pub question_text: String,
    pub question_type: String,
    pub difficulty: String,
    pub points: i32,
    pub explanation: String,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
    pub choices: serde_json::Value,
    pub selected_choice_ids: serde_json::Value,
}

impl SessionAnswerRow {
    pub async fn fetch_for_session(
        mm: &ModelManager,
        session_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<Self> = sqlx::query_as(
            r#"
            SELECT
                q.id AS question_id,
                q.question_text,
                q.question_type,
                q.difficulty,
                q.points,
                q.explanation,
                ua.is_correct,
                ua.answered_at,
                COALESCE(
                    (SELECT json_agg(
                        json_build_object(
                            'id', c.id,
                            'choice_text', c.choice_text,
                            'is_correct', c.is_correct,
                            'order_index', c.order_index
                        ) ORDER BY c.order_index)
                     FROM choices c WHERE c.question_id = q.id),
                    '[]'::json
                ) AS choices,
                COALESCE(
                    (SELECT json_agg(uac.choice_id)
                     FROM user_answer_choices uac WHERE uac.user_answer_id = ua.id),
                    '[]'::json
                ) AS selected_choice_ids
            FROM user_answers ua
            JOIN questions q ON q.id = ua.question_id
            WHERE ua.session_id = $1
            ORDER BY ua.answered_at
            "#,
        )
        .bind(session_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn single_requires_exactly_one_matching_pick() {
        let all = ids(4);
        let correct: BTreeSet<Uuid> = [all[2]].into();

        let picked: BTreeSet<Uuid> = [all[2]].into();
        assert!(selection_matches(QuestionType::Single, &picked, &correct));

        let wrong: BTreeSet<Uuid> = [all[0]].into();
        assert!(!selection_matches(QuestionType::Single, &wrong, &correct));

        let both: BTreeSet<Uuid> = [all[0], all[2]].into();
        assert!(!selection_matches(QuestionType::Single, &both, &correct));
    }

    #[test]
    fn true_false_behaves_like_single() {
        let all = ids(2);
        let correct: BTreeSet<Uuid> = [all[0]].into();
        let picked: BTreeSet<Uuid> = [all[0]].into();
        assert!(selection_matches(QuestionType::TrueFalse, &picked, &correct));

        let empty = BTreeSet::new();
        assert!(!selection_matches(QuestionType::TrueFalse, &empty, &correct));
    }

    #[test]
    fn multiple_requires_exact_set_equality() {
        let all = ids(4);
        let correct: BTreeSet<Uuid> = [all[0], all[2]].into();

        let exact: BTreeSet<Uuid> = [all[2], all[0]].into();
        assert!(selection_matches(QuestionType::Multiple, &exact, &correct));

        let subset: BTreeSet<Uuid> = [all[0]].into();
        assert!(!selection_matches(QuestionType::Multiple, &subset, &correct));

        let superset: BTreeSet<Uuid> = [all[0], all[1], all[2]].into();
        assert!(!selection_matches(QuestionType::Multiple, &superset, &correct));
    }

    #[test]
    fn no_correct_choices_never_matches() {
        let all = ids(2);
        let correct = BTreeSet::new();
        let picked: BTreeSet<Uuid> = [all[0]].into();
        assert!(!selection_matches(QuestionType::Multiple, &picked, &correct));
    }
}
