use serde::Serialize;
use uuid::Uuid;

use crate::model::entity::CategoryWithExamCount;

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub exam_count: i64,
}

impl CategoryResponse {
    pub fn from_row(row: CategoryWithExamCount) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            exam_count: row.exam_count,
        }
    }
}
