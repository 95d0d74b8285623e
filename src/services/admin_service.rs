use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{auth::ApproveSellerForm, products::SellerList},
    entity::{Orders, Products, SellerProfiles, Users, orders, products, users},
    error::{AppError, AppResult},
    middleware::policy::Identity,
    models::{OrderStatus, Role, Seller},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::present,
};

/// Counts shown on the admin landing page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub pending_sellers: u64,
    pub pending_products: u64,
    pub open_orders: u64,
}

pub async fn overview(state: &AppState) -> AppResult<ApiResponse<AdminOverview>> {
    let pending_sellers = Users::find()
        .filter(users::Column::Role.eq(Role::Seller))
        .filter(users::Column::Approved.eq(false))
        .count(&*state.orm)
        .await?;
    let pending_products = Products::find()
        .filter(products::Column::Approved.eq(false))
        .count(&*state.orm)
        .await?;
    let open_orders = Orders::find()
        .filter(orders::Column::Status.is_not_in([OrderStatus::Delivered, OrderStatus::Cancelled]))
        .count(&*state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Overview",
        AdminOverview {
            pending_sellers,
            pending_products,
            open_orders,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_sellers(state: &AppState) -> AppResult<ApiResponse<SellerList>> {
    let items: Vec<Seller> = Users::find()
        .filter(users::Column::Role.eq(Role::Seller))
        .order_by_desc(users::Column::CreatedAt)
        .find_also_related(SellerProfiles)
        .all(&*state.orm)
        .await?
        .into_iter()
        .map(|(user, profile)| Seller::from_entities(user, profile))
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Sellers",
        SellerList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn approve_seller(
    state: &AppState,
    admin: &Identity,
    form: ApproveSellerForm,
) -> AppResult<ApiResponse<Seller>> {
    let seller_id = present(&form.seller_id)
        .ok_or_else(|| AppError::field("sellerId", "Seller is required"))?;
    let seller_id = Uuid::parse_str(seller_id).map_err(|_| AppError::NotFound)?;

    let (user, profile) = Users::find_by_id(seller_id)
        .filter(users::Column::Role.eq(Role::Seller))
        .find_also_related(SellerProfiles)
        .one(&*state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let user = if user.approved {
        user
    } else {
        let mut active = user.into_active_model();
        active.approved = Set(true);
        active.update(&*state.orm).await?
    };

    tracing::info!(seller_id = %user.id, admin = %admin.user_id, "seller approved");
    if let Err(err) = log_audit(
        &*state.orm,
        Some(admin.user_id),
        "seller_approve",
        Some("users"),
        Some(serde_json::json!({ "seller_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Seller approved",
        Seller::from_entities(user, profile),
        Some(Meta::empty()),
    ))
}
