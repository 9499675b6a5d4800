use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;

use crate::engine::dashboard::{self, DashboardMetrics};
use crate::error::AppError;
use crate::models::actor::Actor;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/seller/dashboard/metrics", get(seller_metrics))
}

#[derive(Serialize)]
struct MetricsResponse {
    metrics: DashboardMetrics,
}

async fn seller_metrics(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<MetricsResponse>, AppError> {
    let seller_id = actor.as_seller()?;
    let metrics = dashboard::seller_metrics(&state, seller_id);
    Ok(Json(MetricsResponse { metrics }))
}
