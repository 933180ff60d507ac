//! Shipping records and the values used to create and query them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a shipment. The only transition is `Pending → Cancelled`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingStatus {
    #[default]
    Pending,
    Cancelled,
}

impl ShippingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending   => "pending",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for ShippingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending"   => Ok(Self::Pending),
            "cancelled" => Ok(Self::Cancelled),
            other       => Err(format!("unknown shipping status `{other}`")),
        }
    }
}

impl fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted shipment.
///
/// Serialized with camelCase keys: `{"id", "userId", "productId", "count",
/// "status", "createdAt"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRecord {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub count: i32,
    pub status: ShippingStatus,
    pub created_at: DateTime<Utc>,
}

impl ShippingRecord {
    /// Marks the record cancelled. Cancelling twice is a no-op.
    pub fn cancel(&mut self) {
        self.status = ShippingStatus::Cancelled;
    }
}

/// Fields supplied by the caller when creating a shipment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NewShipping {
    pub user_id: i32,
    pub product_id: i32,
    pub count: i32,
}

/// Narrows a listing. The default filter matches every record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ShippingFilter {
    pub user_id: Option<i32>,
}

impl ShippingFilter {
    pub fn for_user(user_id: i32) -> Self {
        Self { user_id: Some(user_id) }
    }

    pub fn matches(&self, record: &ShippingRecord) -> bool {
        self.user_id.is_none_or(|id| id == record.user_id)
    }
}
