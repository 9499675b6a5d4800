use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingSellerApproval,
    Available,
    SellerRejected,
    Confirmed,
    Arriving,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::SellerRejected
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::PendingSellerApproval => "pending_seller_approval",
            OrderStatus::Available => "available",
            OrderStatus::SellerRejected => "seller_rejected",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Arriving => "arriving",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_seller_approval" => Ok(OrderStatus::PendingSellerApproval),
            "available" => Ok(OrderStatus::Available),
            "seller_rejected" => Ok(OrderStatus::SellerRejected),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "arriving" => Ok(OrderStatus::Arriving),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SellerResponseStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerResponse {
    pub status: SellerResponseStatus,
    pub response_time: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl Default for SellerResponse {
    fn default() -> Self {
        Self {
            status: SellerResponseStatus::Pending,
            response_time: None,
            rejection_reason: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub item: Uuid,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    /// Human-readable sequence number, e.g. `ORDR00042`.
    pub order_number: String,
    pub customer: Uuid,
    /// Always derived from the branch's seller, never client-supplied.
    pub seller: Uuid,
    pub branch: Uuid,
    /// Set exactly when the order is confirmed; cleared on cancellation.
    pub delivery_partner: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub status: OrderStatus,
    pub seller_response: SellerResponse,
    pub pickup_location: GeoLocation,
    pub delivery_location: GeoLocation,
    pub delivery_person_location: Option<GeoLocation>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
