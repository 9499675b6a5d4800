use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{
    GeoLocation, Order, OrderItem, OrderStatus, SellerResponse, SellerResponseStatus,
};
use crate::realtime::{order_room, seller_room, OrderEvent};
use crate::state::AppState;

/// Customer-supplied part of a new order. The seller is never taken from the
/// client; it is derived from the branch.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub branch: Uuid,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub delivery_location: GeoLocation,
}

fn outcome<T>(result: &Result<T, AppError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(_) => "error",
    }
}

fn tracked<T>(
    state: &AppState,
    event: &str,
    run: impl FnOnce() -> Result<T, AppError>,
) -> Result<T, AppError> {
    let timer = state
        .metrics
        .transition_latency_seconds
        .with_label_values(&[event])
        .start_timer();
    let result = run();
    timer.observe_duration();
    state
        .metrics
        .transitions_total
        .with_label_values(&[event, outcome(&result)])
        .inc();
    result
}

/// Creates an order in `pending_seller_approval` and notifies the seller's
/// room.
pub fn create_order(
    state: &AppState,
    customer_id: Uuid,
    input: NewOrder,
) -> Result<Order, AppError> {
    tracked(state, "create", || {
        let customer = state
            .directory
            .customer(customer_id)
            .ok_or_else(|| AppError::NotFound("customer not found".to_string()))?;
        let branch = state
            .directory
            .branch(input.branch)
            .ok_or_else(|| AppError::NotFound("branch not found".to_string()))?;

        let seller = branch.seller.ok_or_else(|| {
            AppError::Validation("branch does not have a seller assigned".to_string())
        })?;
        let branch_location = branch.location.clone().ok_or_else(|| {
            AppError::Validation("branch location is not configured properly".to_string())
        })?;

        if input.items.is_empty() {
            return Err(AppError::Validation(
                "order must contain at least one item".to_string(),
            ));
        }
        if input.items.iter().any(|item| item.count < 1) {
            return Err(AppError::Validation(
                "item count must be at least 1".to_string(),
            ));
        }
        if !input.total_price.is_finite() || input.total_price < 0.0 {
            return Err(AppError::Validation(
                "totalPrice must be non-negative".to_string(),
            ));
        }
        if !input.delivery_location.latitude.is_finite()
            || !input.delivery_location.longitude.is_finite()
        {
            return Err(AppError::Validation(
                "delivery location with latitude and longitude is required".to_string(),
            ));
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            order_number: state.orders.next_order_number(),
            customer: customer_id,
            seller,
            branch: branch.id,
            delivery_partner: None,
            items: input.items,
            total_price: input.total_price,
            status: OrderStatus::PendingSellerApproval,
            seller_response: SellerResponse::default(),
            pickup_location: GeoLocation {
                latitude: branch_location.latitude,
                longitude: branch_location.longitude,
                address: branch.address.clone().or(branch_location.address),
            },
            delivery_location: GeoLocation {
                address: input.delivery_location.address.or(customer.address),
                ..input.delivery_location
            },
            delivery_person_location: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        state.orders.insert(order.clone());
        info!(order_id = %order.id, order_number = %order.order_number, "order created");
        state.emit(&seller_room(seller), OrderEvent::NewOrderPending(order.clone()));
        Ok(order)
    })
}

fn seller_guard(order: &Order, seller_id: Uuid) -> Result<(), AppError> {
    if order.seller != seller_id {
        return Err(AppError::Authorization(
            "order does not belong to this seller".to_string(),
        ));
    }
    if order.status != OrderStatus::PendingSellerApproval {
        return Err(AppError::Conflict(
            "order is not pending approval".to_string(),
        ));
    }
    Ok(())
}

/// Seller approves a pending order, making it claimable by delivery
/// partners.
pub fn accept_order(state: &AppState, order_id: Uuid, seller_id: Uuid) -> Result<Order, AppError> {
    tracked(state, "accept", || {
        let order = state.orders.update_if(
            order_id,
            |order| seller_guard(order, seller_id),
            |order| {
                order.status = OrderStatus::Available;
                order.seller_response.status = SellerResponseStatus::Accepted;
                order.seller_response.response_time = Some(Utc::now());
            },
        )?;

        info!(order_id = %order.id, "order accepted by seller");
        state.emit(&order_room(order.id), OrderEvent::OrderAccepted(order.clone()));
        Ok(order)
    })
}

/// Seller rejects a pending order. Terminal.
pub fn reject_order(
    state: &AppState,
    order_id: Uuid,
    seller_id: Uuid,
    reason: Option<String>,
) -> Result<Order, AppError> {
    tracked(state, "reject", || {
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "No reason provided".to_string());

        let order = state.orders.update_if(
            order_id,
            |order| seller_guard(order, seller_id),
            |order| {
                order.status = OrderStatus::SellerRejected;
                order.seller_response.status = SellerResponseStatus::Rejected;
                order.seller_response.response_time = Some(Utc::now());
                order.seller_response.rejection_reason = Some(reason.clone());
            },
        )?;

        info!(order_id = %order.id, reason = %reason, "order rejected by seller");
        state.emit(
            &order_room(order.id),
            OrderEvent::OrderRejected {
                order: order.clone(),
                reason,
            },
        );
        Ok(order)
    })
}

/// Delivery partner pushes a status/location update on an order it owns.
/// Only `arriving`, `delivered` and `cancelled` are client-settable, and
/// only along the `confirmed -> arriving -> delivered` path (cancellation is
/// allowed from `confirmed` and `arriving`).
pub fn update_status(
    state: &AppState,
    order_id: Uuid,
    partner_id: Uuid,
    new_status: OrderStatus,
    location: Option<GeoLocation>,
) -> Result<Order, AppError> {
    tracked(state, "update_status", || {
        if !matches!(
            new_status,
            OrderStatus::Arriving | OrderStatus::Delivered | OrderStatus::Cancelled
        ) {
            return Err(AppError::Validation(format!(
                "status {} cannot be set by a delivery partner",
                new_status.as_str()
            )));
        }

        let order = state.orders.update_if(
            order_id,
            |order| {
                if order.status.is_terminal() {
                    return Err(AppError::Conflict("order cannot be updated".to_string()));
                }
                if order.delivery_partner != Some(partner_id) {
                    return Err(AppError::Authorization("unauthorized".to_string()));
                }
                let legal = matches!(
                    (order.status, new_status),
                    (
                        OrderStatus::Confirmed,
                        OrderStatus::Arriving | OrderStatus::Delivered | OrderStatus::Cancelled
                    ) | (
                        OrderStatus::Arriving,
                        OrderStatus::Delivered | OrderStatus::Cancelled
                    )
                );
                if !legal {
                    return Err(AppError::Conflict(format!(
                        "cannot move from {} to {}",
                        order.status.as_str(),
                        new_status.as_str()
                    )));
                }
                Ok(())
            },
            |order| {
                order.status = new_status;
                if let Some(location) = location {
                    order.delivery_person_location = Some(location);
                }
                match new_status {
                    OrderStatus::Delivered => order.completed_at = Some(Utc::now()),
                    // Keeps "partner set iff confirmed/arriving/delivered".
                    OrderStatus::Cancelled => order.delivery_partner = None,
                    _ => {}
                }
            },
        )?;

        info!(order_id = %order.id, status = order.status.as_str(), "order status updated");
        state.emit(
            &order_room(order.id),
            OrderEvent::LiveTrackingUpdates(order.clone()),
        );
        Ok(order)
    })
}
