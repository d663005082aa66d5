use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use models::dashboard::{DashboardStats, ProductStats, SalesData};

use crate::state::AppState;

const DEFAULT_SALES_DAYS: u32 = 7;
const MAX_SALES_DAYS: u32 = 90;
const DEFAULT_TOP_PRODUCTS: usize = 5;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/sales", get(sales))
        .route("/top-products", get(top_products))
}

#[derive(Debug, Deserialize)]
pub struct SalesParams {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
    pub limit: Option<usize>,
}

async fn stats(State(state): State<AppState>) -> Json<DashboardStats> {
    Json(state.dashboard.stats().await)
}

async fn sales(State(state): State<AppState>, Query(p): Query<SalesParams>) -> Json<Vec<SalesData>> {
    let days = p.days.unwrap_or(DEFAULT_SALES_DAYS).clamp(1, MAX_SALES_DAYS);
    Json(state.dashboard.sales(days, Utc::now().date_naive()).await)
}

async fn top_products(State(state): State<AppState>, Query(p): Query<TopParams>) -> Json<Vec<ProductStats>> {
    Json(state.dashboard.top_products(p.limit.unwrap_or(DEFAULT_TOP_PRODUCTS)).await)
}
