use axum::{
    extract::{Path, State},
    routing::patch,
    Json, Router,
};

use models::order::{Order, OrderStatusUpdate};
use service::OrderGateway;

use crate::errors::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/:id/status", patch(update_status))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(update): Json<OrderStatusUpdate>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.update_status(id, update).await?))
}
