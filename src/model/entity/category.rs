use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Category {
    id: Uuid,
    name: String,
    description: String,
}

impl ResourceTyped for Category {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Category
    }
}

impl Category {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Lookup-or-create by the natural key (name). The description is only
    /// applied when the row is created.
    pub async fn find_or_create(
        conn: &mut PgConnection,
        name: &str,
        description: &str,
    ) -> DatabaseResult<Self> {
        let found: Option<Self> =
            sqlx::query_as("SELECT id, name, description FROM categories WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut *conn)
                .await?;

        if let Some(category) = found {
            return Ok(category);
        }

        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO categories (id, name, description) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(description)
            .execute(&mut *conn)
            .await?;

        Ok(Category {
            id,
            name: name.to_string(),
            description: description.to_string(),
        })
    }
}

// Utils

/// Category plus the number of exams under it; categories without exams are
/// not listed.
#[derive(Debug, FromRow)]
pub struct CategoryWithExamCount {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub exam_count: i64,
}

impl CategoryWithExamCount {
    pub async fn fetch_all(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        let rows: Vec<Self> = sqlx::query_as(
            r#"
            SELECT c.id, c.name, c.description, COUNT(e.id) AS exam_count
            FROM categories c
            JOIN exams e ON e.category_id = c.id
            GROUP BY c.id, c.name, c.description
            ORDER BY c.name
            "#,
        )
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
