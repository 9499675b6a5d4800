use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::GeoLocation;

/// Customer record as seen by this service. Account management lives in the
/// auth subsystem; we only need existence and a fallback address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// A seller's physical branch. Orders pick up from here, so a branch must
/// carry a seller reference and configured coordinates before it can take
/// orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub seller: Option<Uuid>,
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub address: Option<String>,
}
