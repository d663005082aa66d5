use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::AppState;

pub mod account;
pub mod auth;
pub mod dashboard;
pub mod entities;
pub mod notifications;
pub mod orders;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public health/login routes plus the
/// token-guarded `/api` tree and `/auth/me`.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let listing = state.listing.clone();

    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let api: Router<AppState> = Router::new()
        .nest("/users", entities::collection_routes(state.users.clone(), listing.clone()))
        .nest("/products", entities::collection_routes(state.products.clone(), listing.clone()))
        .nest(
            "/orders",
            entities::collection_routes(state.orders.clone(), listing.clone()).merge(orders::routes()),
        )
        .nest(
            "/notifications",
            entities::collection_routes(state.notifications.clone(), listing).merge(notifications::routes()),
        )
        .nest("/dashboard", dashboard::routes())
        .merge(account::routes());

    let protected = Router::new()
        .nest("/api", api)
        .route("/auth/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    public
        .merge(protected)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                        .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
                )
                .layer(cors),
        )
}
