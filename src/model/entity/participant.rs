use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Minimal quiz-taker record. There is no credential handling here; a
/// participant is identified by username alone.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Participant {
    id: Uuid,
    username: String,
}

impl ResourceTyped for Participant {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Participant
    }
}

impl Participant {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub async fn find_or_create(mm: &ModelManager, username: &str) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO participants (id, username) VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
            RETURNING id, username
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }
}
