use std::collections::BTreeSet;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    model::{
        DatabaseError, ResourceTyped,
        entity::{
            Choice, Exam, Participant, Question, QuizSession, SessionAnswerRow, UserAnswer,
            selection_matches,
        },
    },
    web::{
        AppState, WebError, WebResult,
        dto::sessions::{
            AnswerDetail, AnswerSubmitRequest, SessionResultsResponse, SessionStartRequest,
        },
        error::ErrorResponse,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(session_start_handler))
        .route("/{id}/answers", post(session_answer_handler))
        .route("/{id}/complete", post(session_complete_handler))
        .route("/{id}/results", get(session_results_handler))
        .with_state(state)
}

async fn fetch_session(state: &AppState, id: Uuid) -> WebResult<QuizSession> {
    let session = QuizSession::find_by_id(state.pool(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizSession::get_resource_type(), e))?;

    session.ok_or_else(|| WebError::resource_not_found(QuizSession::get_resource_type()))
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions/",
    description = "Start a quiz session for an exam. The participant record is created on first use.",
    request_body = SessionStartRequest,
    responses(
        (status = 201, description = "Session started", body = QuizSession),
        (status = 400, description = "The exam has no questions available", body = ErrorResponse),
        (status = 404, description = "Exam not found or inactive", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "sessions"
)]
pub(crate) async fn session_start_handler(
    State(state): State<AppState>,
    Json(req): Json<SessionStartRequest>,
) -> WebResult<impl IntoResponse> {
    let exam = Exam::find_active(state.pool(), req.exam_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Exam::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Exam::get_resource_type()))?;

    let question_count = Exam::count_active_questions(state.pool(), exam.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Exam::get_resource_type(), e))?;
    if question_count == 0 {
        return Err(WebError::quiz_has_no_questions());
    }

    let participant = Participant::find_or_create(state.pool(), req.username.trim())
        .await
        .map_err(|e| WebError::resource_fetch_error(Participant::get_resource_type(), e))?;

    let session = QuizSession::create(state.pool(), participant.id(), exam.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizSession::get_resource_type(), e))?;

    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/answers",
    description = "Submit the selected choice(s) for one question. Re-submitting replaces the previous selection.",
    request_body = AnswerSubmitRequest,
    responses(
        (status = 200, description = "Answer recorded and graded", body = UserAnswer),
        (status = 400, description = "Session completed, empty selection or foreign choices", body = ErrorResponse),
        (status = 404, description = "Session or question not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "sessions"
)]
pub(crate) async fn session_answer_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerSubmitRequest>,
) -> WebResult<impl IntoResponse> {
    let session = fetch_session(&state, id).await?;
    if session.is_completed() {
        return Err(WebError::quiz_already_completed());
    }

    if req.choice_ids.is_empty() {
        return Err(WebError::quiz_invalid_selection("no choices submitted"));
    }

    let question = Question::find_in_exam(state.pool(), req.question_id, session.exam_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Question::get_resource_type()))?;

    let selected: BTreeSet<Uuid> = req.choice_ids.iter().copied().collect();
    let owned =
        Choice::ids_belonging_to_question(state.pool(), question.id(), &req.choice_ids)
            .await
            .map_err(|e| WebError::resource_fetch_error(Choice::get_resource_type(), e))?;

    if owned.len() != selected.len() {
        return Err(WebError::quiz_invalid_selection(
            "choices do not belong to this question",
        ));
    }

    let correct: BTreeSet<Uuid> = Choice::correct_ids(state.pool(), question.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Choice::get_resource_type(), e))?
        .into_iter()
        .collect();

    let is_correct = selection_matches(question.question_type(), &selected, &correct);

    let selected_ids: Vec<Uuid> = selected.into_iter().collect();
    let answer = UserAnswer::upsert_selection(
        state.pool(),
        session.id(),
        question.id(),
        &selected_ids,
        is_correct,
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(UserAnswer::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(answer)))
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/complete",
    description = "Finalize a session: score it against all active exam questions and stamp timing.",
    responses(
        (status = 200, description = "Session completed", body = QuizSession),
        (status = 400, description = "Session already completed", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "sessions"
)]
pub(crate) async fn session_complete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let session = fetch_session(&state, id).await?;
    if session.is_completed() {
        return Err(WebError::quiz_already_completed());
    }

    let session = session
        .complete(state.pool())
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizSession::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(session)))
}

#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/results",
    description = "Detailed results with a per-question breakdown. Completes the session if it is still open.",
    responses(
        (status = 200, description = "Session results", body = SessionResultsResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "sessions"
)]
pub(crate) async fn session_results_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let mut session = fetch_session(&state, id).await?;
    if !session.is_completed() {
        session = session
            .complete(state.pool())
            .await
            .map_err(|e| WebError::resource_fetch_error(QuizSession::get_resource_type(), e))?;
    }

    let rows = SessionAnswerRow::fetch_for_session(state.pool(), session.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserAnswer::get_resource_type(), e))?;

    let answers: Vec<AnswerDetail> = rows
        .into_iter()
        .map(AnswerDetail::from_row)
        .collect::<Result<_, _>>()
        .map_err(|e| {
            WebError::resource_fetch_error(
                UserAnswer::get_resource_type(),
                DatabaseError::from(e),
            )
        })?;

    let correct_count = answers.iter().filter(|answer| answer.is_correct).count();
    let response = SessionResultsResponse {
        total_answered: answers.len(),
        correct_count,
        score: session.score(),
        session,
        answers,
    };

    Ok((StatusCode::OK, Json(response)))
}
