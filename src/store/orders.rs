use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};

/// Filter for [`OrderStore::find`]. Empty filter matches everything.
#[derive(Debug, Default, Clone)]
pub struct OrderQuery {
    pub statuses: Option<Vec<OrderStatus>>,
    pub customer: Option<Uuid>,
    pub delivery_partner: Option<Uuid>,
    pub branch: Option<Uuid>,
    pub seller: Option<Uuid>,
}

impl OrderQuery {
    fn matches(&self, order: &Order) -> bool {
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&order.status) {
                return false;
            }
        }
        if let Some(customer) = self.customer {
            if order.customer != customer {
                return false;
            }
        }
        if let Some(partner) = self.delivery_partner {
            if order.delivery_partner != Some(partner) {
                return false;
            }
        }
        if let Some(branch) = self.branch {
            if order.branch != branch {
                return false;
            }
        }
        if let Some(seller) = self.seller {
            if order.seller != seller {
                return false;
            }
        }
        true
    }
}

/// Order persistence. Every mutation after insert goes through
/// [`OrderStore::update_if`], whose guard and mutation run under the map's
/// entry lock: a single conditional write, so concurrent transitions can
/// never interleave between check and apply.
pub struct OrderStore {
    orders: DashMap<Uuid, Order>,
    sequence: AtomicU64,
}

impl OrderStore {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Next human-readable order number, e.g. `ORDR00042`.
    pub fn next_order_number(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("ORDR{seq:05}")
    }

    pub fn insert(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn get(&self, id: Uuid) -> Option<Order> {
        self.orders.get(&id).map(|entry| entry.value().clone())
    }

    /// Matching orders, newest first.
    pub fn find(&self, query: &OrderQuery) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Precondition-guarded write. `guard` inspects the current document and
    /// may veto with any error; on `Ok(())` the mutation is applied,
    /// `updated_at` is stamped, and the committed document is returned.
    pub fn update_if<G, F>(&self, id: Uuid, guard: G, apply: F) -> Result<Order, AppError>
    where
        G: FnOnce(&Order) -> Result<(), AppError>,
        F: FnOnce(&mut Order),
    {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

        guard(entry.value())?;
        let order = entry.value_mut();
        apply(order);
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}
