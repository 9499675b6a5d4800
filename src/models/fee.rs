use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One contiguous order-value range with its own fee formula.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeSlab {
    pub min_order_value: f64,
    /// `None` means the slab is open-ended; only legal on the last slab.
    pub max_order_value: Option<f64>,
    pub base_fee: f64,
    pub percentage_fee: f64,
    pub description: String,
}

impl FeeSlab {
    pub fn applies_to(&self, order_value: f64) -> bool {
        order_value >= self.min_order_value
            && self.max_order_value.is_none_or(|max| order_value <= max)
    }
}

/// A versioned pricing policy. At most one config is active at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFeeConfig {
    pub id: Uuid,
    pub slabs: Vec<FeeSlab>,
    pub partner_earnings_percentage: f64,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Output of the fee engine for one order value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub order_value: f64,
    pub delivery_fee: f64,
    pub partner_earnings: f64,
    pub platform_commission: f64,
    pub applied_slab: FeeSlab,
}
