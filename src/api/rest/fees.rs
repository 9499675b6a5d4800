use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::engine::fees;
use crate::error::AppError;
use crate::models::actor::Actor;
use crate::models::fee::{DeliveryFeeConfig, FeeQuote, FeeSlab};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/ops/delivery-fee/config",
            get(get_active_config).post(create_config),
        )
        .route("/ops/delivery-fee/config/:id", put(update_config))
        .route("/ops/delivery-fee/calculate", get(calculate_fee))
        .route("/ops/delivery-fee/history", get(config_history))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfigRequest {
    pub slabs: Vec<FeeSlab>,
    pub partner_earnings_percentage: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    pub slabs: Vec<FeeSlab>,
    pub partner_earnings_percentage: f64,
    pub is_active: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateQuery {
    pub order_value: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub configs: Vec<DeliveryFeeConfig>,
    pub total: usize,
}

async fn get_active_config(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
) -> Result<Json<DeliveryFeeConfig>, AppError> {
    let config = state.fee_configs.active().ok_or_else(|| {
        AppError::NotFound("no active delivery fee configuration found".to_string())
    })?;
    Ok(Json(config))
}

async fn create_config(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(payload): Json<CreateConfigRequest>,
) -> Result<(StatusCode, Json<DeliveryFeeConfig>), AppError> {
    let admin_id = actor.as_admin()?;

    let config = DeliveryFeeConfig {
        id: Uuid::new_v4(),
        slabs: payload.slabs,
        partner_earnings_percentage: payload.partner_earnings_percentage.unwrap_or(0.8),
        is_active: payload.is_active.unwrap_or(true),
        created_by: admin_id.to_string(),
        created_at: Utc::now(),
    };
    fees::validate_config(&config)?;

    state.fee_configs.insert(config.clone());
    info!(config_id = %config.id, created_by = %config.created_by, "delivery fee configuration created");
    Ok((StatusCode::CREATED, Json(config)))
}

async fn update_config(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateConfigRequest>,
) -> Result<Json<DeliveryFeeConfig>, AppError> {
    actor.as_admin()?;

    let existing = state.fee_configs.get(id).ok_or_else(|| {
        AppError::NotFound(format!("delivery fee configuration {id} not found"))
    })?;

    let updated = DeliveryFeeConfig {
        slabs: payload.slabs,
        partner_earnings_percentage: payload.partner_earnings_percentage,
        is_active: payload.is_active,
        ..existing
    };
    fees::validate_config(&updated)?;

    let committed = state.fee_configs.replace(updated)?;
    info!(config_id = %id, "delivery fee configuration updated");
    Ok(Json(committed))
}

async fn calculate_fee(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
    Query(params): Query<CalculateQuery>,
) -> Result<Json<FeeQuote>, AppError> {
    let config = state.fee_configs.active().ok_or_else(|| {
        AppError::Validation("no active delivery fee configuration found".to_string())
    })?;
    let quote = fees::calculate(params.order_value, &config)?;
    Ok(Json(quote))
}

async fn config_history(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<Json<HistoryResponse>, AppError> {
    actor.as_admin()?;
    let configs = state.fee_configs.history();
    let total = configs.len();
    Ok(Json(HistoryResponse { configs, total }))
}
