use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::assignment;
use crate::engine::transitions::{self, NewOrder};
use crate::error::AppError;
use crate::models::actor::Actor;
use crate::models::order::{GeoLocation, Order, OrderItem, OrderStatus};
use crate::state::AppState;
use crate::store::orders::OrderQuery;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/accept", post(accept_order))
        .route("/orders/:id/reject", post(reject_order))
        .route("/orders/:id/confirm", post(confirm_order))
        .route("/orders/:id/status", patch(update_order_status))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub branch: Uuid,
    pub total_price: f64,
    pub delivery_location: GeoLocation,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectOrderRequest {
    pub rejection_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderRequest {
    pub delivery_person_location: GeoLocation,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub delivery_person_location: Option<GeoLocation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
    pub delivery_partner_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let customer_id = actor.as_customer()?;
    let order = transitions::create_order(
        &state,
        customer_id,
        NewOrder {
            branch: payload.branch,
            items: payload.items,
            total_price: payload.total_price,
            delivery_location: payload.delivery_location,
        },
    )?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
    Query(params): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let statuses = match &params.status {
        Some(raw) => {
            let parsed: Result<Vec<OrderStatus>, _> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect();
            Some(parsed.map_err(AppError::Validation)?)
        }
        // Partner listings without an explicit filter never see orders the
        // seller has not yet released.
        None if params.delivery_partner_id.is_some() => Some(vec![
            OrderStatus::Available,
            OrderStatus::Confirmed,
            OrderStatus::Arriving,
            OrderStatus::Delivered,
        ]),
        None => None,
    };

    let orders = state.orders.find(&OrderQuery {
        statuses,
        customer: params.customer_id,
        delivery_partner: params.delivery_partner_id,
        branch: params.branch_id,
        seller: None,
    });
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    _actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;
    Ok(Json(order))
}

async fn accept_order(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let seller_id = actor.as_seller()?;
    let order = transitions::accept_order(&state, id, seller_id)?;
    Ok(Json(order))
}

async fn reject_order(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let seller_id = actor.as_seller()?;
    let order = transitions::reject_order(&state, id, seller_id, payload.rejection_reason)?;
    Ok(Json(order))
}

async fn confirm_order(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let partner_id = actor.as_delivery_partner()?;
    let order = assignment::confirm(&state, id, partner_id, payload.delivery_person_location)?;
    Ok(Json(order))
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let partner_id = actor.as_delivery_partner()?;
    let order = transitions::update_status(
        &state,
        id,
        partner_id,
        payload.status,
        payload.delivery_person_location,
    )?;
    Ok(Json(order))
}
