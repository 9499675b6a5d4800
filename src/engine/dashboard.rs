use std::collections::HashMap;

use chrono::{Datelike, Local};
use serde::Serialize;
use uuid::Uuid;

use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;
use crate::store::orders::OrderQuery;

/// Point-in-time seller snapshot. Computed in one pass over the seller's
/// orders; there is no transactional consistency with concurrent writes and
/// momentary skew between the numbers is acceptable.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_orders: usize,
    pub pending_orders: usize,
    pub today_orders: usize,
    pub today_revenue: f64,
    pub monthly_revenue: f64,
    pub order_status_breakdown: HashMap<&'static str, usize>,
    pub recent_orders: Vec<Order>,
}

/// Aggregates a seller's dashboard. Date windows use server-local day and
/// month boundaries.
pub fn seller_metrics(state: &AppState, seller_id: Uuid) -> DashboardMetrics {
    let orders = state.orders.find(&OrderQuery {
        seller: Some(seller_id),
        ..Default::default()
    });

    let today = Local::now().date_naive();
    let mut pending_orders = 0;
    let mut today_orders = 0;
    let mut today_revenue = 0.0;
    let mut monthly_revenue = 0.0;
    let mut order_status_breakdown: HashMap<&'static str, usize> = HashMap::new();

    for order in &orders {
        *order_status_breakdown
            .entry(order.status.as_str())
            .or_insert(0) += 1;

        if order.status == OrderStatus::PendingSellerApproval {
            pending_orders += 1;
        }

        let created = order.created_at.with_timezone(&Local).date_naive();
        if created == today {
            today_orders += 1;
        }
        if order.status == OrderStatus::Delivered {
            if created == today {
                today_revenue += order.total_price;
            }
            if created.year() == today.year() && created.month() == today.month() {
                monthly_revenue += order.total_price;
            }
        }
    }

    DashboardMetrics {
        total_orders: orders.len(),
        pending_orders,
        today_orders,
        today_revenue,
        monthly_revenue,
        order_status_breakdown,
        // `find` already returns newest first.
        recent_orders: orders.into_iter().take(5).collect(),
    }
}
