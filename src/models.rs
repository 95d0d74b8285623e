use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{order_items, orders, payments, products, seller_profiles, users},
    format::{format_currency, format_list, title_case},
};

pub use crate::entity::sea_orm_active_enums::{AccountType, OrderStatus, Role};

/// Fixed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Category {
    Books,
    Electronics,
    Transport,
    Supplies,
    Kitchen,
    Furniture,
    Clothing,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Books,
        Category::Electronics,
        Category::Transport,
        Category::Supplies,
        Category::Kitchen,
        Category::Furniture,
        Category::Clothing,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Books => "Books",
            Category::Electronics => "Electronics",
            Category::Transport => "Transport",
            Category::Supplies => "Supplies",
            Category::Kitchen => "Kitchen",
            Category::Furniture => "Furniture",
            Category::Clothing => "Clothing",
            Category::Other => "Other",
        }
    }

    /// Split a comma-joined form value into known categories.
    ///
    /// Blank entries are skipped and duplicates dropped, keeping the first
    /// occurrence. At least one category is required.
    pub fn parse_list(raw: &str) -> Result<Vec<Category>, String> {
        let mut categories = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let category = entry.parse::<Category>()?;
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        if categories.is_empty() {
            return Err("Category is required".to_string());
        }
        Ok(categories)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category {}", s.trim()))
    }
}

/// A user as returned to clients; the password hash never leaves the service.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
    pub address: String,
    pub phone_no: String,
    pub has_reset_password: bool,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            approved: model.approved,
            address: model.address,
            phone_no: model.phone_no,
            has_reset_password: model.has_reset_password,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    #[serde(flatten)]
    pub user: User,
    pub account_type: Option<AccountType>,
    pub account_type_label: Option<String>,
}

impl Seller {
    pub fn from_entities(user: users::Model, profile: Option<seller_profiles::Model>) -> Self {
        let account_type = profile.map(|p| p.account_type);
        Self {
            user: user.into(),
            account_type,
            account_type_label: account_type.map(|t| title_case(&t.to_value())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub commission: Decimal,
    pub quantity: i32,
    pub image: String,
    pub category: Vec<String>,
    pub category_label: String,
    pub approved: bool,
    pub slug: String,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            category_label: format_list(&model.category),
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            commission: model.commission,
            quantity: model.quantity,
            image: model.image,
            category: model.category,
            approved: model.approved,
            slug: model.slug,
            seller_id: model.seller_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithSeller {
    #[serde(flatten)]
    pub product: Product,
    pub seller: Option<User>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub status_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            status: model.status,
            status_label: model.status.label().to_string(),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// One line item joined with the product it refers to.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
    pub seller_id: Option<Uuid>,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn from_entities(item: order_items::Model, product: Option<products::Model>) -> Self {
        Self {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            product_name: product.as_ref().map(|p| p.name.clone()),
            product_image: product.as_ref().map(|p| p.image.clone()),
            seller_id: product.as_ref().map(|p| p.seller_id),
            quantity: item.quantity,
            price: item.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub amount_label: String,
    pub address: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

impl From<payments::Model> for Payment {
    fn from(model: payments::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            amount: model.amount,
            amount_label: format_currency(model.amount),
            address: model.address,
            payment_method: model.payment_method,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_comma_joined_categories() {
        let parsed = Category::parse_list("Books,Electronics").unwrap();
        assert_eq!(parsed, vec![Category::Books, Category::Electronics]);

        let parsed = Category::parse_list(" books , Books,kitchen,").unwrap();
        assert_eq!(parsed, vec![Category::Books, Category::Kitchen]);
    }

    #[test]
    fn rejects_empty_and_unknown_categories() {
        assert_eq!(
            Category::parse_list(" , ").unwrap_err(),
            "Category is required"
        );
        assert_eq!(
            Category::parse_list("Books,Spaceships").unwrap_err(),
            "Unknown category Spaceships"
        );
    }
}
