//! Order lifecycle: checkout, status changes and the per-role order views.
//!
//! Status changes go through [`OrderStatus::can_transition_to`]; the actor
//! checks here decide who may ask for one.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, Set,
    TransactionTrait,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutItem, CheckoutRequest, OrderList, OrderView, SellerOrderForm},
    entity::{
        OrderItems, Orders, Payments, Products, Users, order_items, orders, payments, products,
        users,
    },
    error::{AppError, AppResult},
    format::{format_currency, round},
    middleware::policy::Identity,
    models::{Order, OrderItem, OrderStatus, Payment, Role},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
    validation::present,
};

pub const UPDATE_ORDER_STATUS: &str = "update-order-status";

/// A validated seller order action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellerOrderAction {
    pub order_id: Uuid,
    pub status: OrderStatus,
}

/// Counts shown on the seller landing page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerOverview {
    pub products: u64,
    pub pending_products: u64,
    pub open_orders: u64,
}

/// Parse a requested status. Only the offered statuses can be asked for.
pub fn parse_requested_status(raw: &str) -> AppResult<OrderStatus> {
    raw.parse::<OrderStatus>()
        .ok()
        .filter(|status| status.is_offered())
        .ok_or_else(|| AppError::field("status", "Invalid status"))
}

/// Check the seller order form.
///
/// Missing identifiers abort the request; an unknown intent is reported as a
/// failed action. `status` is only read once the intent is known.
pub fn parse_seller_order_action(form: &SellerOrderForm) -> AppResult<SellerOrderAction> {
    let intent = present(&form.intent).ok_or_else(|| AppError::BadRequest("Invalid intent".into()))?;
    let order_id = present(&form.order_id)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| AppError::BadRequest("Invalid order id".into()))?;

    match intent {
        UPDATE_ORDER_STATUS => {
            let status =
                present(&form.status).ok_or_else(|| AppError::BadRequest("Invalid status".into()))?;
            Ok(SellerOrderAction {
                order_id,
                status: parse_requested_status(status)?,
            })
        }
        _ => Err(AppError::Action("Invalid intent".into())),
    }
}

/// Whether `actor` may change an order whose line items belong to
/// `item_sellers`.
pub fn may_manage_order(actor: &Identity, item_sellers: &[Option<Uuid>]) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Seller => item_sellers.contains(&Some(actor.user_id)),
        Role::Customer => false,
    }
}

/// Combine repeated products and reject empty or non-positive lines.
pub fn merge_cart_lines(items: &[CheckoutItem]) -> AppResult<Vec<(Uuid, i32)>> {
    if items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let mut lines: Vec<(Uuid, i32)> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        match lines.iter_mut().find(|(id, _)| *id == item.product_id) {
            Some((_, quantity)) => {
                *quantity = quantity
                    .checked_add(item.quantity)
                    .ok_or_else(|| AppError::BadRequest("Cart has invalid quantity".into()))?;
            }
            None => lines.push((item.product_id, item.quantity)),
        }
    }
    Ok(lines)
}

/// Build the view of one order, keeping only `seller_scope`'s line items when
/// a seller is looking.
pub fn build_order_view(
    order: orders::Model,
    customer: Option<users::Model>,
    payment: Option<payments::Model>,
    items: Vec<(order_items::Model, Option<products::Model>)>,
    seller_scope: Option<Uuid>,
) -> OrderView {
    let items: Vec<OrderItem> = items
        .into_iter()
        .map(|(item, product)| OrderItem::from_entities(item, product))
        .filter(|item| match seller_scope {
            Some(seller_id) => item.seller_id == Some(seller_id),
            None => true,
        })
        .collect();

    let total: Decimal = items
        .iter()
        .map(|item| item.price * Decimal::from(item.quantity))
        .sum();

    OrderView {
        order: Order::from(order),
        customer: customer.map(Into::into),
        payment: payment.map(Payment::from),
        total_label: format_currency(total),
        items,
    }
}

/// Load customers, payments and line items for `orders` in three queries.
async fn load_views<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<orders::Model>,
    seller_scope: Option<Uuid>,
) -> AppResult<Vec<OrderView>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let user_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();

    let mut items_by_order: HashMap<Uuid, Vec<(order_items::Model, Option<products::Model>)>> =
        HashMap::new();
    for (item, product) in OrderItems::find()
        .filter(order_items::Column::OrderId.is_in(order_ids.clone()))
        .order_by_asc(order_items::Column::Position)
        .find_also_related(Products)
        .all(conn)
        .await?
    {
        items_by_order
            .entry(item.order_id)
            .or_default()
            .push((item, product));
    }

    let mut payments_by_order: HashMap<Uuid, payments::Model> = Payments::find()
        .filter(payments::Column::OrderId.is_in(order_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|payment| (payment.order_id, payment))
        .collect();

    let customers: HashMap<Uuid, users::Model> = Users::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            let payment = payments_by_order.remove(&order.id);
            let customer = customers.get(&order.user_id).cloned();
            build_order_view(order, customer, payment, items, seller_scope)
        })
        .collect())
}

/// Apply the status filter, sort and page of `query`, then load the views.
async fn paged_views(
    state: &AppState,
    finder: Select<Orders>,
    query: &OrderListQuery,
    seller_scope: Option<Uuid>,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = match query.status {
        Some(status) => finder.filter(orders::Column::Status.eq(status)),
        None => finder,
    };
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(orders::Column::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(orders::Column::CreatedAt),
    };

    let total = finder.clone().count(&*state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&*state.orm)
        .await?;

    let items = load_views(&*state.orm, orders, seller_scope).await?;
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Orders containing at least one line item sold by `seller_id`.
fn seller_orders(seller_id: Uuid) -> Select<Orders> {
    let owned = OrderItems::find()
        .select_only()
        .column(order_items::Column::OrderId)
        .inner_join(Products)
        .filter(products::Column::SellerId.eq(seller_id))
        .into_query();
    Orders::find().filter(orders::Column::Id.in_subquery(owned))
}

pub async fn place_order(
    state: &AppState,
    customer: &Identity,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderView>> {
    let lines = merge_cart_lines(&payload.items)?;
    let address = present(&Some(payload.address))
        .map(str::to_owned)
        .ok_or_else(|| AppError::field("address", "Address is required"))?;
    let payment_method = present(&Some(payload.payment_method))
        .map(str::to_owned)
        .ok_or_else(|| AppError::field("paymentMethod", "Payment method is required"))?;

    let txn = state.orm.begin().await?;

    let product_ids: Vec<Uuid> = lines.iter().map(|(id, _)| *id).collect();
    let stock: HashMap<Uuid, products::Model> = Products::find()
        .filter(products::Column::Id.is_in(product_ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let mut total = Decimal::ZERO;
    for (product_id, quantity) in &lines {
        let product = stock
            .get(product_id)
            .filter(|p| p.approved)
            .ok_or_else(|| AppError::BadRequest(format!("Product {product_id} is not available")))?;
        if product.quantity < *quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                product.name
            )));
        }
        total += product.price * Decimal::from(*quantity);
    }

    let now = Utc::now();
    let order = orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(customer.user_id),
        status: Set(OrderStatus::Pending),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (position, (product_id, quantity)) in lines.iter().enumerate() {
        let product = &stock[product_id];
        let item = order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(*product_id),
            position: Set(position as i32),
            quantity: Set(*quantity),
            price: Set(product.price),
        }
        .insert(&txn)
        .await?;

        Products::update_many()
            .col_expr(
                products::Column::Quantity,
                Expr::col(products::Column::Quantity).sub(*quantity),
            )
            .filter(products::Column::Id.eq(*product_id))
            .exec(&txn)
            .await?;

        items.push((item, Some(product.clone())));
    }

    let payment = payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        amount: Set(round(total, 2)),
        address: Set(address),
        payment_method: Set(payment_method),
        created_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, customer = %customer.user_id, amount = %payment.amount, "order placed");
    if let Err(err) = log_audit(
        &*state.orm,
        Some(customer.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "amount": payment.amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout success",
        build_order_view(order, None, Some(payment), items, None),
        Some(Meta::empty()),
    ))
}

/// Move an order to `requested`.
///
/// Delivered and cancelled orders are never written: the request fails with
/// a conflict before any update is issued.
pub async fn advance_status(
    state: &AppState,
    actor: &Identity,
    order_id: Uuid,
    requested: OrderStatus,
) -> AppResult<ApiResponse<Order>> {
    if !requested.is_offered() {
        return Err(AppError::field("status", "Invalid status"));
    }

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if actor.role != Role::Admin {
        let item_sellers: Vec<Option<Uuid>> = OrderItems::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .find_also_related(Products)
            .all(&txn)
            .await?
            .into_iter()
            .map(|(_, product)| product.map(|p| p.seller_id))
            .collect();
        if !may_manage_order(actor, &item_sellers) {
            tracing::warn!(order_id = %order.id, actor = %actor.user_id, "status change denied");
            return Err(AppError::Forbidden("not allowed to update this order".into()));
        }
    }

    if !order.status.can_transition_to(requested) {
        tracing::info!(
            order_id = %order.id,
            current = %order.status,
            requested = %requested,
            "status change rejected"
        );
        return Err(AppError::Conflict(format!(
            "order is {} and cannot be changed",
            order.status.label().to_lowercase()
        )));
    }

    let previous = order.status;
    let mut active = order.into_active_model();
    active.status = Set(requested);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, from = %previous, to = %order.status, "order status updated");
    if let Err(err) = log_audit(
        &*state.orm,
        Some(actor.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "from": previous, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

/// Cancel a pending or confirmed order and put its quantities back in stock.
pub async fn cancel_order(
    state: &AppState,
    actor: &Identity,
    order_id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    match actor.role {
        Role::Admin => {}
        Role::Customer if order.user_id == actor.user_id => {}
        Role::Customer => return Err(AppError::NotFound),
        Role::Seller => return Err(AppError::Forbidden("sellers cannot cancel orders".into())),
    }

    if !order.status.can_transition_to(OrderStatus::Cancelled) {
        return Err(AppError::Conflict(format!(
            "order is {} and can no longer be cancelled",
            order.status.label().to_lowercase()
        )));
    }

    let items = OrderItems::find()
        .filter(order_items::Column::OrderId.eq(order.id))
        .all(&txn)
        .await?;
    for item in &items {
        Products::update_many()
            .col_expr(
                products::Column::Quantity,
                Expr::col(products::Column::Quantity).add(item.quantity),
            )
            .filter(products::Column::Id.eq(item.product_id))
            .exec(&txn)
            .await?;
    }

    let mut active = order.into_active_model();
    active.status = Set(OrderStatus::Cancelled);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, actor = %actor.user_id, "order cancelled");
    if let Err(err) = log_audit(
        &*state.orm,
        Some(actor.user_id),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_seller_orders(
    state: &AppState,
    seller: &Identity,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    paged_views(state, seller_orders(seller.user_id), &query, Some(seller.user_id)).await
}

pub async fn get_seller_order(
    state: &AppState,
    seller: &Identity,
    id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    let order = Orders::find_by_id(id)
        .one(&*state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let view = load_views(&*state.orm, vec![order], Some(seller.user_id))
        .await?
        .pop()
        .filter(|view| !view.items.is_empty())
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order", view, Some(Meta::empty())))
}

pub async fn list_customer_orders(
    state: &AppState,
    customer: &Identity,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let finder = Orders::find().filter(orders::Column::UserId.eq(customer.user_id));
    paged_views(state, finder, &query, None).await
}

pub async fn get_customer_order(
    state: &AppState,
    customer: &Identity,
    id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(orders::Column::UserId.eq(customer.user_id))
                .add(orders::Column::Id.eq(id)),
        )
        .one(&*state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let view = load_views(&*state.orm, vec![order], None)
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order", view, Some(Meta::empty())))
}

pub async fn list_all_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    paged_views(state, Orders::find(), &query, None).await
}

pub async fn seller_overview(
    state: &AppState,
    seller: &Identity,
) -> AppResult<ApiResponse<SellerOverview>> {
    let products = Products::find()
        .filter(products::Column::SellerId.eq(seller.user_id))
        .count(&*state.orm)
        .await?;
    let pending_products = Products::find()
        .filter(products::Column::SellerId.eq(seller.user_id))
        .filter(products::Column::Approved.eq(false))
        .count(&*state.orm)
        .await?;
    let open_orders = seller_orders(seller.user_id)
        .filter(orders::Column::Status.is_not_in([OrderStatus::Delivered, OrderStatus::Cancelled]))
        .count(&*state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Overview",
        SellerOverview {
            products,
            pending_products,
            open_orders,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SessionConfig, session::SessionAuthority};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            name: "Actor".into(),
            email: "actor@campus.edu".into(),
            role,
            approved: true,
        }
    }

    fn order_row(status: OrderStatus) -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn product_row(name: &str, seller_id: Uuid, price: i64) -> products::Model {
        let now = Utc::now();
        products::Model {
            id: Uuid::new_v4(),
            name: name.into(),
            description: format!("{name} description"),
            price: Decimal::from(price),
            commission: Decimal::ZERO,
            quantity: 5,
            image: "https://img.example/item.jpg".into(),
            category: vec!["Other".into()],
            approved: true,
            slug: crate::format::slugify(name),
            seller_id,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn item_row(order_id: Uuid, product: &products::Model, position: i32, quantity: i32) -> order_items::Model {
        order_items::Model {
            id: Uuid::new_v4(),
            order_id,
            product_id: product.id,
            position,
            quantity,
            price: product.price,
        }
    }

    fn state_with(db: MockDatabase) -> AppState {
        AppState::new(
            db.into_connection(),
            SessionAuthority::new(&SessionConfig::with_secret("test-secret")),
        )
    }

    #[test]
    fn seller_form_requires_every_field() {
        let full = SellerOrderForm {
            intent: Some(UPDATE_ORDER_STATUS.into()),
            order_id: Some(Uuid::new_v4().to_string()),
            status: Some("IN_TRANSIT".into()),
        };
        let action = parse_seller_order_action(&full).unwrap();
        assert_eq!(action.status, OrderStatus::InTransit);

        for strip in [0, 1, 2] {
            let mut form = SellerOrderForm {
                intent: full.intent.clone(),
                order_id: full.order_id.clone(),
                status: full.status.clone(),
            };
            match strip {
                0 => form.intent = None,
                1 => form.order_id = None,
                _ => form.status = None,
            }
            let err = parse_seller_order_action(&form).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "case {strip}: {err:?}");
        }
    }

    #[test]
    fn unknown_intent_is_a_failed_action() {
        let form = SellerOrderForm {
            intent: Some("delete-order".into()),
            order_id: Some(Uuid::new_v4().to_string()),
            status: Some("PENDING".into()),
        };
        match parse_seller_order_action(&form).unwrap_err() {
            AppError::Action(message) => assert_eq!(message, "Invalid intent"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_intent_does_not_need_a_status() {
        let form = SellerOrderForm {
            intent: Some("delete-order".into()),
            order_id: Some(Uuid::new_v4().to_string()),
            status: None,
        };
        match parse_seller_order_action(&form).unwrap_err() {
            AppError::Action(message) => assert_eq!(message, "Invalid intent"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn only_offered_statuses_can_be_requested() {
        assert_eq!(parse_requested_status("DELIVERED").unwrap(), OrderStatus::Delivered);
        assert!(parse_requested_status("CANCELLED").is_err());
        assert!(parse_requested_status("CONFIRMED").is_err());
        assert!(parse_requested_status("SHIPPED").is_err());
    }

    #[test]
    fn only_admins_and_owning_sellers_manage_orders() {
        let seller = identity(Role::Seller);
        let other = Uuid::new_v4();

        assert!(may_manage_order(&identity(Role::Admin), &[]));
        assert!(may_manage_order(&seller, &[Some(other), Some(seller.user_id)]));
        assert!(!may_manage_order(&seller, &[Some(other), None]));
        assert!(!may_manage_order(&identity(Role::Customer), &[Some(other)]));
    }

    #[test]
    fn cart_lines_are_merged_and_checked() {
        let book = Uuid::new_v4();
        let lamp = Uuid::new_v4();
        let lines = merge_cart_lines(&[
            CheckoutItem { product_id: book, quantity: 1 },
            CheckoutItem { product_id: lamp, quantity: 2 },
            CheckoutItem { product_id: book, quantity: 2 },
        ])
        .unwrap();
        assert_eq!(lines, vec![(book, 3), (lamp, 2)]);

        assert!(merge_cart_lines(&[]).is_err());
        assert!(merge_cart_lines(&[CheckoutItem { product_id: book, quantity: 0 }]).is_err());
    }

    #[test]
    fn merged_quantity_overflow_is_rejected() {
        let book = Uuid::new_v4();
        let err = merge_cart_lines(&[
            CheckoutItem { product_id: book, quantity: i32::MAX },
            CheckoutItem { product_id: book, quantity: 1 },
        ])
        .unwrap_err();
        match err {
            AppError::BadRequest(message) => assert_eq!(message, "Cart has invalid quantity"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn seller_view_keeps_only_own_line_items() {
        let seller_a = Uuid::new_v4();
        let seller_b = Uuid::new_v4();
        let order = order_row(OrderStatus::Pending);
        let textbook = product_row("Calculus 101 Textbook", seller_a, 30);
        let bike = product_row("Used Trek Bicycle", seller_b, 120);
        let items = vec![
            (item_row(order.id, &textbook, 0, 2), Some(textbook.clone())),
            (item_row(order.id, &bike, 1, 1), Some(bike.clone())),
        ];

        let scoped = build_order_view(order.clone(), None, None, items.clone(), Some(seller_a));
        assert_eq!(scoped.order.id, order.id);
        assert_eq!(scoped.items.len(), 1);
        assert_eq!(scoped.items[0].product_id, textbook.id);
        assert_eq!(scoped.total_label, "$60.00");

        let full = build_order_view(order, None, None, items, None);
        assert_eq!(full.items.len(), 2);
        assert_eq!(full.total_label, "$180.00");
    }

    #[test]
    fn order_totals_are_exact_in_cents() {
        let seller = Uuid::new_v4();
        let order = order_row(OrderStatus::Pending);
        let mut pencil = product_row("HB Pencil", seller, 0);
        pencil.price = Decimal::new(10, 2);
        let mut eraser = product_row("Eraser", seller, 0);
        eraser.price = Decimal::new(20, 2);
        let items = vec![
            (item_row(order.id, &pencil, 0, 3), Some(pencil.clone())),
            (item_row(order.id, &eraser, 1, 1), Some(eraser.clone())),
        ];

        let view = build_order_view(order, None, None, items, None);
        assert_eq!(view.total_label, "$0.50");
    }

    #[tokio::test]
    async fn terminal_orders_are_never_written() {
        for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            let order = order_row(status);
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![order.clone()]]);
            let state = state_with(db);

            let err = advance_status(&state, &identity(Role::Admin), order.id, OrderStatus::Pending)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)), "{status}: {err:?}");

            let log = format!("{:?}", state.into_transaction_log());
            assert!(!log.contains(" SET "), "{status} issued an update: {log}");
        }
    }

    #[tokio::test]
    async fn sellers_without_items_in_the_order_are_forbidden() {
        let order = order_row(OrderStatus::Pending);
        let bike = product_row("Used Trek Bicycle", Uuid::new_v4(), 120);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order.clone()]])
            .append_query_results([vec![(item_row(order.id, &bike, 0, 1), bike.clone())]]);
        let state = state_with(db);

        let err = advance_status(&state, &identity(Role::Seller), order.id, OrderStatus::InTransit)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)), "{err:?}");

        let log = format!("{:?}", state.into_transaction_log());
        assert!(!log.contains(" SET "), "issued an update: {log}");
    }

    #[tokio::test]
    async fn owning_seller_moves_order_forward() {
        let seller = identity(Role::Seller);
        let order = order_row(OrderStatus::Pending);
        let textbook = product_row("Calculus 101 Textbook", seller.user_id, 30);
        let mut shipped = order.clone();
        shipped.status = OrderStatus::InTransit;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order.clone()]])
            .append_query_results([vec![(item_row(order.id, &textbook, 0, 1), textbook.clone())]])
            .append_query_results([vec![shipped]]);
        let state = state_with(db);

        let resp = advance_status(&state, &seller, order.id, OrderStatus::InTransit)
            .await
            .unwrap();
        assert_eq!(resp.data.unwrap().status, OrderStatus::InTransit);
    }

    #[tokio::test]
    async fn seller_listing_keeps_mixed_orders_but_hides_other_sellers_items() {
        let seller_a = identity(Role::Seller);
        let seller_b = Uuid::new_v4();
        let order = order_row(OrderStatus::Pending);
        let textbook = product_row("Calculus 101 Textbook", seller_a.user_id, 30);
        let bike = product_row("Used Trek Bicycle", seller_b, 120);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                sea_orm::Value::BigInt(Some(1)),
            )])]])
            .append_query_results([vec![order.clone()]])
            .append_query_results([vec![
                (item_row(order.id, &textbook, 0, 2), textbook.clone()),
                (item_row(order.id, &bike, 1, 1), bike.clone()),
            ]])
            .append_query_results([Vec::<payments::Model>::new()])
            .append_query_results([Vec::<users::Model>::new()]);
        let state = state_with(db);

        let list = list_seller_orders(&state, &seller_a, OrderListQuery::default())
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(list.items.len(), 1);
        let view = &list.items[0];
        assert_eq!(view.order.id, order.id);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].product_id, textbook.id);

        let log = format!("{:?}", state.into_transaction_log());
        assert!(log.contains("seller_id"), "listing not scoped to the seller: {log}");
    }

    #[tokio::test]
    async fn non_offered_status_is_rejected_before_loading() {
        let state = state_with(MockDatabase::new(DatabaseBackend::Postgres));
        let err = advance_status(
            &state,
            &identity(Role::Admin),
            Uuid::new_v4(),
            OrderStatus::Confirmed,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(state.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn customers_cannot_cancel_other_customers_orders() {
        let order = order_row(OrderStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order.clone()]]);
        let state = state_with(db);

        let err = cancel_order(&state, &identity(Role::Customer), order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn shipped_orders_cannot_be_cancelled() {
        let order = order_row(OrderStatus::InTransit);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![order.clone()]]);
        let state = state_with(db);

        let err = cancel_order(&state, &identity(Role::Admin), order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
