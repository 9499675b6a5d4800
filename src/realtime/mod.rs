use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::order::Order;

/// Events fanned out to rooms after a committed transition. Each carries the
/// full committed order document; rejection additionally carries the reason.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum OrderEvent {
    NewOrderPending(Order),
    OrderAccepted(Order),
    OrderRejected { order: Order, reason: String },
    OrderConfirmed(Order),
    LiveTrackingUpdates(Order),
}

impl OrderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::NewOrderPending(_) => "newOrderPending",
            OrderEvent::OrderAccepted(_) => "orderAccepted",
            OrderEvent::OrderRejected { .. } => "orderRejected",
            OrderEvent::OrderConfirmed(_) => "orderConfirmed",
            OrderEvent::LiveTrackingUpdates(_) => "liveTrackingUpdates",
        }
    }
}

/// Room an order's watchers (customer, assigned partner) subscribe to.
pub fn order_room(order_id: Uuid) -> String {
    order_id.to_string()
}

/// Room a seller subscribes to for new-order notifications.
pub fn seller_room(seller_id: Uuid) -> String {
    format!("seller_{seller_id}")
}

/// Room-keyed fan-out over tokio broadcast channels. Emission is
/// fire-and-forget: delivery is not guaranteed, and an event published to a
/// room nobody has joined is silently dropped. Within one room, a subscriber
/// receives events in emission order.
pub struct EventBroadcaster {
    rooms: DashMap<String, broadcast::Sender<OrderEvent>>,
    buffer_size: usize,
}

impl EventBroadcaster {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            buffer_size,
        }
    }

    /// Publishes into a room without awaiting delivery. Rooms only exist
    /// while someone has subscribed; otherwise the event is dropped.
    pub fn emit(&self, room: &str, event: OrderEvent) {
        if let Some(tx) = self.rooms.get(room) {
            // A send error just means every subscriber has gone away.
            let _ = tx.send(event);
        }
    }

    /// Joins a room, creating its channel on first subscription.
    pub fn subscribe(&self, room: &str) -> broadcast::Receiver<OrderEvent> {
        self.rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .subscribe()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{order_room, seller_room, EventBroadcaster, OrderEvent};
    use crate::models::order::{GeoLocation, Order, OrderStatus, SellerResponse};

    fn order() -> Order {
        let point = GeoLocation {
            latitude: 0.0,
            longitude: 0.0,
            address: None,
        };
        Order {
            id: Uuid::new_v4(),
            order_number: "ORDR00001".to_string(),
            customer: Uuid::new_v4(),
            seller: Uuid::new_v4(),
            branch: Uuid::new_v4(),
            delivery_partner: None,
            items: vec![],
            total_price: 50.0,
            status: OrderStatus::PendingSellerApproval,
            seller_response: SellerResponse::default(),
            pickup_location: point.clone(),
            delivery_location: point,
            delivery_person_location: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_events_in_emission_order() {
        let broadcaster = EventBroadcaster::new(16);
        let room = order_room(Uuid::new_v4());
        let mut rx = broadcaster.subscribe(&room);

        broadcaster.emit(&room, OrderEvent::OrderAccepted(order()));
        broadcaster.emit(&room, OrderEvent::OrderConfirmed(order()));

        assert_eq!(rx.recv().await.unwrap().name(), "orderAccepted");
        assert_eq!(rx.recv().await.unwrap().name(), "orderConfirmed");
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_dropped() {
        let broadcaster = EventBroadcaster::new(16);
        broadcaster.emit(&seller_room(Uuid::new_v4()), OrderEvent::NewOrderPending(order()));
        assert_eq!(broadcaster.room_count(), 0);
    }

    #[tokio::test]
    async fn rooms_are_isolated() {
        let broadcaster = EventBroadcaster::new(16);
        let room_a = order_room(Uuid::new_v4());
        let room_b = order_room(Uuid::new_v4());
        let mut rx_a = broadcaster.subscribe(&room_a);
        let _rx_b = broadcaster.subscribe(&room_b);

        broadcaster.emit(&room_b, OrderEvent::OrderAccepted(order()));
        assert!(matches!(
            rx_a.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }
}
