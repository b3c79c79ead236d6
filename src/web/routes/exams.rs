use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        DatabaseError, ResourceTyped,
        entity::{Exam, ExamOverviewRow, Question, QuestionWithChoicesRow},
    },
    web::{
        AppState, WebError, WebResult,
        dto::exams::{ExamResponse, QuestionResponse},
        error::ErrorResponse,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(exams_list_handler))
        .route("/{id}/questions", get(exam_questions_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/exams/",
    description = "List active exams that have at least one active question",
    responses(
        (status = 200, description = "Successfully collected exams", body = Vec<ExamResponse>),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "exams"
)]
pub(crate) async fn exams_list_handler(
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let rows = ExamOverviewRow::fetch_all(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(Exam::get_resource_type(), e))?;

    let exams: Vec<ExamResponse> = rows
        .into_iter()
        .map(ExamResponse::from_row)
        .collect::<Result<_, _>>()
        .map_err(|e| {
            WebError::resource_fetch_error(Exam::get_resource_type(), DatabaseError::from(e))
        })?;

    Ok((StatusCode::OK, Json(exams)))
}

#[utoipa::path(
    get,
    path = "/api/v1/exams/{id}/questions",
    description = "Active questions of an exam, with choices. Correctness flags are hidden.",
    responses(
        (status = 200, description = "Successfully collected questions", body = Vec<QuestionResponse>),
        (status = 404, description = "Exam not found or inactive", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "exams"
)]
pub(crate) async fn exam_questions_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let exam = Exam::find_active(state.pool(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Exam::get_resource_type(), e))?;

    if exam.is_none() {
        return Err(WebError::resource_not_found(Exam::get_resource_type()));
    }

    let rows = QuestionWithChoicesRow::fetch_active_for_exam(state.pool(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    let questions: Vec<QuestionResponse> = rows
        .into_iter()
        .map(QuestionResponse::from_row)
        .collect::<Result<_, _>>()
        .map_err(|e| {
            WebError::resource_fetch_error(Question::get_resource_type(), DatabaseError::from(e))
        })?;

    Ok((StatusCode::OK, Json(questions)))
}
