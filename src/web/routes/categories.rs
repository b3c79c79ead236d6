use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};

use crate::{
    model::{
        ResourceTyped,
        entity::{Category, CategoryWithExamCount},
    },
    web::{AppState, WebError, WebResult, dto::categories::CategoryResponse, error::ErrorResponse},
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(categories_list_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/",
    description = "List categories that contain at least one exam",
    responses(
        (status = 200, description = "Successfully collected categories", body = Vec<CategoryResponse>),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "categories"
)]
pub(crate) async fn categories_list_handler(
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let rows = CategoryWithExamCount::fetch_all(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Category::get_resource_type(), e))?;

    let categories: Vec<CategoryResponse> =
        rows.into_iter().map(CategoryResponse::from_row).collect();

    Ok((StatusCode::OK, Json(categories)))
}
