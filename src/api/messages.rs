use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use crate::error::AppError;
use crate::models::*;
use crate::services::MessageService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(send_message))
        .route("/user/{email}", get(messages_for_user))
        .route("/course/{course_id}", get(messages_by_course))
        .route("/enrolled-students/{instructor_id}", get(enrolled_students))
        .route("/enrolled-instructors/{student_id}", get(enrolled_instructors))
}

async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let message = MessageService::new(state.db.clone()).send_message(req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn messages_for_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = MessageService::new(state.db.clone()).messages_for_user(&email).await?;
    Ok(Json(messages))
}

async fn messages_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = MessageService::new(state.db.clone()).messages_by_course(&course_id).await?;
    Ok(Json(messages))
}

async fn enrolled_students(
    State(state): State<AppState>,
    Path(instructor_id): Path<String>,
) -> Result<Json<Vec<EnrolledStudent>>, AppError> {
    let students = MessageService::new(state.db.clone())
        .enrolled_students_for_instructor(&instructor_id)
        .await?;
    Ok(Json(students))
}

async fn enrolled_instructors(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<EnrolledInstructor>>, AppError> {
    let instructors = MessageService::new(state.db.clone())
        .enrolled_instructors_for_student(&student_id)
        .await?;
    Ok(Json(instructors))
}
