//! HTTP request handlers

use super::types::{
    DiaryOpenedResponse, DiaryResponse, EntryOutcome, EntryRequest, EntryResponse, ErrorResponse,
    StoryRequest, StoryResponse, SuccessResponse,
};
use super::AppState;
use crate::diary::{Admission, SessionController};
use crate::prompts::DIARY_GREETING;
use crate::story::generate_story;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Diary lifecycle
        .route("/api/diaries", post(open_diary))
        .route("/api/diaries/:id", get(get_diary).delete(close_diary))
        // Diary actions
        .route("/api/diaries/:id/entries", post(write_entry))
        .route("/api/diaries/:id/clear", post(clear_diary))
        // Storybook
        .route("/api/story", post(tell_story))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Diary
// ============================================================

async fn open_diary(State(state): State<AppState>) -> Json<DiaryOpenedResponse> {
    let diary = state.diaries.open().await;
    Json(DiaryOpenedResponse {
        id: diary.session_id().to_string(),
        greeting: DIARY_GREETING,
    })
}

async fn get_diary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DiaryResponse>, AppError> {
    let diary = find_diary(&state, &id).await?;
    Ok(Json(DiaryResponse {
        id,
        turns: diary.snapshot(),
        pending: diary.is_pending(),
    }))
}

/// Accepts the entry and lets the reply arrive in the background; the
/// front end polls the diary to see it.
async fn write_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EntryRequest>,
) -> Result<Json<EntryResponse>, AppError> {
    let diary = find_diary(&state, &id).await?;

    let outcome = match diary.submit(&req.text) {
        Admission::Ignored => EntryOutcome::Ignored,
        Admission::Busy => EntryOutcome::Busy,
        Admission::Accepted => EntryOutcome::Accepted,
    };

    Ok(Json(EntryResponse { outcome }))
}

async fn clear_diary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    find_diary(&state, &id).await?.clear();
    Ok(Json(SuccessResponse { success: true }))
}

async fn close_diary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.diaries.close(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Diary not found: {id}")))
    }
}

async fn find_diary(state: &AppState, id: &str) -> Result<SessionController, AppError> {
    state
        .diaries
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Diary not found: {id}")))
}

// ============================================================
// Storybook
// ============================================================

async fn tell_story(
    State(state): State<AppState>,
    Json(req): Json<StoryRequest>,
) -> Result<Json<StoryResponse>, AppError> {
    if req.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("A tale needs a prompt".to_string()));
    }

    let story = generate_story(
        &req.prompt,
        req.house,
        state.llm_service.as_ref(),
        state.story_timeout,
    )
    .await;

    Ok(Json(StoryResponse { story }))
}

async fn get_version() -> &'static str {
    concat!("marauders-compendium ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
