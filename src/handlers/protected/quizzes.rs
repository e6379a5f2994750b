// Quiz routes; the caller is always the authenticated user

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{AttemptAnswer, QuizAttempt, QuizSummary};
use crate::error::ApiError;
use crate::handlers::required;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::services::quiz::{QuizView, SubmissionResult, SubmittedAnswer};
use crate::services::QuizService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuery {
    pub include_correct_answers: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    pub answers: Option<Vec<SubmittedAnswer>>,
}

/// GET /api/courses/:courseId/quizzes
pub async fn course_quizzes(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<i64>,
) -> Result<Json<Vec<QuizSummary>>, ApiError> {
    let quizzes = QuizService::new(state.pool()).list_course_quizzes(course_id).await?;
    Ok(Json(quizzes))
}

/// GET /api/quizzes/:quizId
pub async fn quiz_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(quiz_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<QuizQuery>,
) -> Result<Json<QuizView>, ApiError> {
    let reveal = query.include_correct_answers.unwrap_or(false) && user.role.can_author();
    let quiz = QuizService::new(state.pool()).get_quiz(quiz_id, reveal).await?;
    Ok(Json(quiz))
}

/// POST /api/quizzes/:quizId/attempts
pub async fn attempt_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(quiz_id): ApiPath<i64>,
) -> Result<(StatusCode, Json<QuizAttempt>), ApiError> {
    let attempt = QuizService::new(state.pool())
        .create_attempt(quiz_id, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(attempt)))
}

/// GET /api/quizzes/:quizId/attempts
pub async fn attempt_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(quiz_id): ApiPath<i64>,
) -> Result<Json<Vec<QuizAttempt>>, ApiError> {
    let attempts = QuizService::new(state.pool())
        .list_attempts(quiz_id, user.user_id)
        .await?;
    Ok(Json(attempts))
}

/// POST /api/quizzes/:quizId/attempts/:attemptId/submit
pub async fn attempt_submit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath((quiz_id, attempt_id)): ApiPath<(i64, i64)>,
    ApiJson(body): ApiJson<SubmitBody>,
) -> Result<Json<SubmissionResult>, ApiError> {
    let answers = required(body.answers, "answers")?;
    let result = QuizService::new(state.pool())
        .submit_attempt(quiz_id, attempt_id, user.user_id, &answers)
        .await?;
    Ok(Json(result))
}

/// GET /api/quizzes/:quizId/attempts/:attemptId/answers
pub async fn attempt_answers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath((quiz_id, attempt_id)): ApiPath<(i64, i64)>,
) -> Result<Json<Vec<AttemptAnswer>>, ApiError> {
    let answers = QuizService::new(state.pool())
        .attempt_answers(quiz_id, attempt_id, user.user_id)
        .await?;
    Ok(Json(answers))
}
