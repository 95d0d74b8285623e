use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        orders::{OrderList, OrderView, SellerOrderForm},
        products::{ProductForm, ProductList},
    },
    error::AppResult,
    middleware::auth::SellerUser,
    models::{Order, Product},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{
        order_service::{self, SellerOverview},
        product_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/seller", get(overview))
        .route("/seller/products", get(list_products).post(save_product))
        .route("/seller/orders", get(list_orders).post(order_action))
        .route("/seller/orders/{id}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/seller",
    responses(
        (status = 200, description = "Seller dashboard counts", body = ApiResponse<SellerOverview>),
        (status = 403, description = "Account not approved")
    ),
    security(("session_cookie" = [])),
    tag = "Seller"
)]
pub async fn overview(
    State(state): State<AppState>,
    SellerUser(seller): SellerUser,
) -> AppResult<Json<ApiResponse<SellerOverview>>> {
    let resp = order_service::seller_overview(&state, &seller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/seller/products",
    responses(
        (status = 200, description = "Own products", body = ApiResponse<ProductList>)
    ),
    security(("session_cookie" = [])),
    tag = "Seller"
)]
pub async fn list_products(
    State(state): State<AppState>,
    SellerUser(seller): SellerUser,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_seller_products(&state, &seller).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/seller/products",
    request_body(content = ProductForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Product created or updated", body = ApiResponse<Product>),
        (status = 400, description = "Field errors"),
        (status = 403, description = "Not the owner, or tried to approve")
    ),
    security(("session_cookie" = [])),
    tag = "Seller"
)]
pub async fn save_product(
    State(state): State<AppState>,
    SellerUser(seller): SellerUser,
    Form(form): Form<ProductForm>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::upsert_product(&state, &seller, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/seller/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders with the seller's line items", body = ApiResponse<OrderList>)
    ),
    security(("session_cookie" = [])),
    tag = "Seller"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    SellerUser(seller): SellerUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_seller_orders(&state, &seller, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/seller/orders",
    request_body(content = SellerOrderForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Order>),
        (status = 400, description = "Missing field or unknown intent"),
        (status = 403, description = "Seller owns no line item in the order"),
        (status = 409, description = "Order is delivered or cancelled")
    ),
    security(("session_cookie" = [])),
    tag = "Seller"
)]
pub async fn order_action(
    State(state): State<AppState>,
    SellerUser(seller): SellerUser,
    Form(form): Form<SellerOrderForm>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let action = order_service::parse_seller_order_action(&form)?;
    let resp = order_service::advance_status(&state, &seller, action.order_id, action.status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/seller/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with only the seller's line items", body = ApiResponse<OrderView>),
        (status = 404, description = "No line item of this seller in the order")
    ),
    security(("session_cookie" = [])),
    tag = "Seller"
)]
pub async fn get_order(
    State(state): State<AppState>,
    SellerUser(seller): SellerUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::get_seller_order(&state, &seller, id).await?;
    Ok(Json(resp))
}
