use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use common::types::CountBody;
use models::notification::Notification;
use service::NotificationGateway;

use crate::errors::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/read-all", post(mark_all_as_read))
        .route("/unread-count", get(unread_count))
        .route("/:id/read", post(mark_as_read))
}

async fn mark_as_read(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Notification>, ApiError> {
    Ok(Json(state.notifications.mark_as_read(&id).await?))
}

async fn mark_all_as_read(State(state): State<AppState>) -> Result<Json<CountBody>, ApiError> {
    let count = state.notifications.mark_all_as_read().await?;
    Ok(Json(CountBody { count }))
}

async fn unread_count(State(state): State<AppState>) -> Result<Json<CountBody>, ApiError> {
    let count = state.notifications.unread_count().await?;
    Ok(Json(CountBody { count }))
}
