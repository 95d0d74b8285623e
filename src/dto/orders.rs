use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, Payment, User};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    pub address: String,
    pub payment_method: String,
}

/// Seller order action. Every field is checked before the engine runs.
#[derive(Debug, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrderForm {
    pub intent: Option<String>,
    pub order_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct UpdateOrderStatusForm {
    pub status: Option<String>,
}

/// An order with its customer, payment and the line items the viewer may see.
#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order: Order,
    pub customer: Option<User>,
    pub payment: Option<Payment>,
    pub items: Vec<OrderItem>,
    /// Sum of the visible line items.
    pub total_label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderView>,
}
