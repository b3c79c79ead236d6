use crate::model::repo::ResourceTyped;
use crate::model::error::DatabaseResult;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Topic {
    id: Uuid,
    exam_id: Uuid,
    name: String,
    description: String,
    order_index: i32,
}

impl ResourceTyped for Topic {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Topic
    }
}

impl Topic {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exam_id(&self) -> Uuid {
        self.exam_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lookup-or-create by the natural key (exam, name); description and
    /// order only apply on creation.
    pub async fn find_or_create(
        conn: &mut PgConnection,
        exam_id: Uuid,
        name: &str,
        description: &str,
        order_index: i32,
    ) -> DatabaseResult<Self> {
        let found: Option<Self> =
            sqlx::query_as("SELECT * FROM topics WHERE exam_id = $1 AND name = $2")
                .bind(exam_id)
                .bind(name)
                .fetch_optional(&mut *conn)
                .await?;

        if let Some(topic) = found {
            return Ok(topic);
        }

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO topics (id, exam_id, name, description, order_index) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(exam_id)
        .bind(name)
        .bind(description)
        .bind(order_index)
        .execute(&mut *conn)
        .await?;

        Ok(Topic {
            id,
            exam_id,
            name: name.to_string(),
            description: description.to_string(),
            order_index,
        })
    }
}
