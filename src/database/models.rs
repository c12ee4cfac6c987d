//! Database models
//!
//! Rust structs representing the five tables, the nested order shape the
//! UI consumes, and the request types for order creation. Column names in
//! the database are camelCase for compatibility with the data already on
//! devices, so every row struct maps with `rename_all = "camelCase"`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Order lifecycle status.
///
/// Stored lowercase. Older revisions of the app wrote `progress` and `done`;
/// [`OrderStatus::from_db`] maps those onto the canonical values so the drift
/// never escapes the read boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    InProgress,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// Normalize a raw status column value.
    pub fn from_db(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "new" => OrderStatus::New,
            "in_progress" | "progress" => OrderStatus::InProgress,
            "delivered" | "done" => OrderStatus::Delivered,
            other => {
                tracing::warn!("Unknown order status {:?}, treating as new", other);
                OrderStatus::New
            }
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client row. One row is created per order; repeat customers are not
/// deduplicated by phone number.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    /// Reserved for future server reconciliation; never read back today.
    pub synced: bool,
}

/// A raw order row, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub client_id: String,
    pub last_reminder_date: Option<DateTime<Utc>>,
    pub synced: bool,
}

/// A garment within an order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub cloth_type: String,
    pub model_image: Option<String>,
    pub fabric_image: Option<String>,
    pub order_id: String,
}

/// A named numeric dimension tied to one garment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub order_item_id: String,
}

/// A persisted notification history row. Weakly references its order:
/// deleting the order leaves the row behind.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub order_id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub read: bool,
}

/// An order joined with its client and nested items, the shape list and
/// detail screens consume.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub id: String,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub client_name: String,
    pub client_phone: String,
    pub order_items: Vec<OrderItemDetails>,
}

/// One garment of an [`OrderDetails`], with its measurements nested.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetails {
    pub id: String,
    pub cloth_type: String,
    pub model_image: Option<String>,
    pub fabric_image: Option<String>,
    pub measurements: Vec<Measurement>,
}

/// An open order eligible for the delivery reminder sweep.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct ReminderCandidate {
    pub id: String,
    pub client_name: String,
    pub delivery_date: DateTime<Utc>,
    pub last_reminder_date: Option<DateTime<Utc>>,
}

/// Create order request: the whole graph saved in one call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub client: ClientInput,
    pub delivery_date: DateTime<Utc>,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub order_items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub cloth_type: String,
    #[serde(default)]
    pub model_image: Option<String>,
    #[serde(default)]
    pub fabric_image: Option<String>,
    pub measurements: Vec<MeasurementInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementInput {
    pub label: String,
    pub value: f64,
}
