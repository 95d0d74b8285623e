use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, ProductWithSeller, Seller};

/// Product management form shared by the seller and admin pages.
///
/// Numbers arrive as strings and `category` is comma-joined.
#[derive(Debug, Deserialize, Default, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub commission: Option<String>,
    pub quantity: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub approved: Option<String>,
    pub seller_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct AdminProductList {
    #[schema(value_type = Vec<ProductWithSeller>)]
    pub items: Vec<ProductWithSeller>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct SellerList {
    #[schema(value_type = Vec<Seller>)]
    pub items: Vec<Seller>,
}
