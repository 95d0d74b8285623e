use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        auth::ApproveSellerForm,
        orders::{OrderList, UpdateOrderStatusForm},
        products::{AdminProductList, ProductForm, SellerList},
    },
    error::{AppError, AppResult},
    middleware::auth::AdminUser,
    models::{Order, Product, Seller},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::{
        admin_service::{self, AdminOverview},
        order_service, product_service,
    },
    state::AppState,
    validation::present,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(overview))
        .route("/admin/products", get(list_products).post(save_product))
        .route("/admin/sellers", get(list_sellers).post(approve_seller))
        .route("/admin/orders", get(list_all_orders))
        .route("/admin/orders/{id}/status", post(update_order_status))
        .route("/admin/orders/{id}/cancel", post(cancel_order))
}

#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Admin dashboard counts", body = ApiResponse<AdminOverview>)
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn overview(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<AdminOverview>>> {
    let resp = admin_service::overview(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/products",
    responses(
        (status = 200, description = "All products with their seller", body = ApiResponse<AdminProductList>),
        (status = 303, description = "Not an admin")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_products(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<AdminProductList>>> {
    let resp = product_service::list_products_admin(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/admin/products",
    request_body(content = ProductForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Product created or updated", body = ApiResponse<Product>),
        (status = 400, description = "Field errors"),
        (status = 404, description = "Unknown productId")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn save_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(form): Form<ProductForm>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::upsert_product(&state, &admin, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/sellers",
    responses(
        (status = 200, description = "All seller accounts", body = ApiResponse<SellerList>)
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_sellers(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<SellerList>>> {
    let resp = admin_service::list_sellers(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/admin/sellers",
    request_body(content = ApproveSellerForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Seller approved", body = ApiResponse<Seller>),
        (status = 400, description = "Missing sellerId"),
        (status = 404, description = "Unknown seller")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn approve_seller(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Form(form): Form<ApproveSellerForm>,
) -> AppResult<Json<ApiResponse<Seller>>> {
    let resp = admin_service::approve_seller(&state, &admin, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/admin/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Every order", body = ApiResponse<OrderList>)
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_all_orders(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body(content = UpdateOrderStatusForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Order>),
        (status = 400, description = "Missing or invalid status"),
        (status = 409, description = "Order is delivered or cancelled")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Form(form): Form<UpdateOrderStatusForm>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let raw = present(&form.status).ok_or_else(|| AppError::BadRequest("Invalid status".into()))?;
    let status = order_service::parse_requested_status(raw)?;
    let resp = order_service::advance_status(&state, &admin, id, status).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/admin/orders/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<Order>),
        (status = 409, description = "Order already shipped or finished")
    ),
    security(("session_cookie" = [])),
    tag = "Admin"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::cancel_order(&state, &admin, id).await?;
    Ok(Json(resp))
}
