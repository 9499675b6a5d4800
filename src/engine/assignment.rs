use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{GeoLocation, Order, OrderStatus};
use crate::realtime::{order_room, OrderEvent};
use crate::state::AppState;

/// Resolves the claim race: exactly one delivery partner moves an order from
/// `available` to `confirmed`. The `status == available` check and the write
/// happen inside the store's single conditional update, never as a separate
/// read followed by a write, so N racing partners produce one winner and
/// N-1 `Conflict`s even across independent tasks.
pub fn confirm(
    state: &AppState,
    order_id: Uuid,
    partner_id: Uuid,
    partner_location: GeoLocation,
) -> Result<Order, AppError> {
    if !partner_location.latitude.is_finite() || !partner_location.longitude.is_finite() {
        return Err(AppError::Validation(
            "deliveryPersonLocation with latitude and longitude is required".to_string(),
        ));
    }

    let timer = state
        .metrics
        .transition_latency_seconds
        .with_label_values(&["confirm"])
        .start_timer();

    let result = state.orders.update_if(
        order_id,
        |order| {
            if order.status != OrderStatus::Available {
                return Err(AppError::Conflict("order no longer available".to_string()));
            }
            Ok(())
        },
        |order| {
            order.status = OrderStatus::Confirmed;
            order.delivery_partner = Some(partner_id);
            order.delivery_person_location = Some(partner_location);
        },
    );

    timer.observe_duration();
    match &result {
        Ok(order) => {
            state
                .metrics
                .transitions_total
                .with_label_values(&["confirm", "success"])
                .inc();
            info!(order_id = %order.id, partner_id = %partner_id, "order confirmed");
            state.emit(&order_room(order.id), OrderEvent::OrderConfirmed(order.clone()));
        }
        Err(err) => {
            state
                .metrics
                .transitions_total
                .with_label_values(&["confirm", "error"])
                .inc();
            if matches!(err, AppError::Conflict(_)) {
                state.metrics.confirm_conflicts_total.inc();
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::confirm;
    use crate::engine::transitions::{accept_order, create_order, NewOrder};
    use crate::error::AppError;
    use crate::models::directory::{Branch, Customer};
    use crate::models::order::{GeoLocation, OrderItem, OrderStatus};
    use crate::state::AppState;

    fn point() -> GeoLocation {
        GeoLocation {
            latitude: 28.6139,
            longitude: 77.209,
            address: None,
        }
    }

    fn available_order(state: &AppState) -> Uuid {
        let customer_id = Uuid::new_v4();
        let seller_id = Uuid::new_v4();
        let branch_id = Uuid::new_v4();
        state.directory.upsert_customer(Customer {
            id: customer_id,
            name: "Ravi".to_string(),
            address: None,
        });
        state.directory.upsert_branch(Branch {
            id: branch_id,
            name: "North".to_string(),
            seller: Some(seller_id),
            location: Some(point()),
            address: None,
        });
        let order = create_order(
            state,
            customer_id,
            NewOrder {
                branch: branch_id,
                items: vec![OrderItem {
                    item: Uuid::new_v4(),
                    count: 1,
                }],
                total_price: 120.0,
                delivery_location: point(),
            },
        )
        .unwrap();
        accept_order(state, order.id, seller_id).unwrap();
        order.id
    }

    #[test]
    fn confirm_assigns_partner_and_location() {
        let state = AppState::new(16);
        let order_id = available_order(&state);
        let partner_id = Uuid::new_v4();

        let order = confirm(&state, order_id, partner_id, point()).unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.delivery_partner, Some(partner_id));
        assert!(order.delivery_person_location.is_some());
    }

    #[test]
    fn confirm_on_pending_order_is_conflict() {
        let state = AppState::new(16);
        let customer_id = Uuid::new_v4();
        let branch_id = Uuid::new_v4();
        state.directory.upsert_customer(Customer {
            id: customer_id,
            name: "Ravi".to_string(),
            address: None,
        });
        state.directory.upsert_branch(Branch {
            id: branch_id,
            name: "North".to_string(),
            seller: Some(Uuid::new_v4()),
            location: Some(point()),
            address: None,
        });
        let order = create_order(
            &state,
            customer_id,
            NewOrder {
                branch: branch_id,
                items: vec![OrderItem {
                    item: Uuid::new_v4(),
                    count: 1,
                }],
                total_price: 80.0,
                delivery_location: point(),
            },
        )
        .unwrap();

        let result = confirm(&state, order.id, Uuid::new_v4(), point());
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn confirm_unknown_order_is_not_found() {
        let state = AppState::new(16);
        let result = confirm(&state, Uuid::new_v4(), Uuid::new_v4(), point());
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn exactly_one_of_many_racing_partners_wins() {
        let state = Arc::new(AppState::new(64));
        let order_id = available_order(&state);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let state = state.clone();
                tokio::task::spawn_blocking(move || {
                    confirm(&state, order_id, Uuid::new_v4(), point())
                })
            })
            .collect();

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(AppError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(conflicts, 15);

        let order = state.orders.get(order_id).unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(order.delivery_partner.is_some());
    }
}
