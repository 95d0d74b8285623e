use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{AdminProductList, ProductForm, ProductList},
    entity::{Products, Users, products, users},
    error::{AppError, AppResult},
    format::{round, slugify},
    middleware::policy::Identity,
    models::{Category, Product, ProductWithSeller, Role},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
    validation::{FieldErrors, checkbox, present},
};

/// Product form after validation and coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub commission: Decimal,
    pub quantity: i32,
    pub image: String,
    pub category: Vec<String>,
}

fn parse_number<T: std::str::FromStr>(
    raw: &Option<String>,
    field: &str,
    label: &str,
) -> Result<T, FieldErrors> {
    let raw = present(raw).ok_or_else(|| FieldErrors::single(field, format!("{label} is required")))?;
    raw.parse::<T>()
        .map_err(|_| FieldErrors::single(field, format!("{label} must be a number")))
}

/// Largest amount a `NUMERIC(12, 2)` column holds.
const MAX_MONEY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Round to cents and reject amounts the money columns cannot store.
fn money(value: Decimal, field: &str, label: &str) -> Result<Decimal, FieldErrors> {
    let value = round(value, 2);
    if value.abs() > MAX_MONEY {
        return Err(FieldErrors::single(field, format!("{label} is too large")));
    }
    Ok(value)
}

/// Field rules for the product form, first failure wins.
pub fn validate_product_form(form: &ProductForm) -> Result<ProductFields, FieldErrors> {
    let name = present(&form.name).ok_or_else(|| FieldErrors::single("name", "Name is required"))?;
    let description = present(&form.description)
        .ok_or_else(|| FieldErrors::single("description", "Description is required"))?;

    let quantity: i32 = parse_number(&form.quantity, "quantity", "Quantity")?;
    if quantity < 0 {
        return Err(FieldErrors::single("quantity", "Quantity must be at least 0"));
    }
    let price = money(parse_number(&form.price, "price", "Price")?, "price", "Price")?;
    if price < Decimal::ZERO {
        return Err(FieldErrors::single("price", "Price must be greater than 0"));
    }
    let commission = money(
        parse_number(&form.commission, "commission", "Commission")?,
        "commission",
        "Commission",
    )?;
    if commission < Decimal::ZERO {
        return Err(FieldErrors::single("commission", "Commission must be at least 0"));
    }

    let image =
        present(&form.image).ok_or_else(|| FieldErrors::single("image", "Image is required"))?;
    let category = Category::parse_list(form.category.as_deref().unwrap_or_default())
        .map_err(|message| FieldErrors::single("category", message))?;

    Ok(ProductFields {
        name: name.to_owned(),
        description: description.to_owned(),
        price,
        commission,
        quantity,
        image: image.to_owned(),
        category: category.iter().map(|c| c.as_str().to_owned()).collect(),
    })
}

/// Approval value to store for a write by `role`.
///
/// Only admins may set the flag. An admin form without the checkbox means
/// "not approved"; sellers keep whatever is stored.
pub fn resolve_approval(role: Role, requested: bool, current: Option<bool>) -> AppResult<bool> {
    match role {
        Role::Admin => Ok(requested),
        Role::Seller if requested => Err(AppError::Forbidden(
            "only admins can approve products".into(),
        )),
        Role::Seller => Ok(current.unwrap_or(false)),
        Role::Customer => Err(AppError::Forbidden("customers cannot manage products".into())),
    }
}

fn apply_fields(active: &mut products::ActiveModel, fields: ProductFields) {
    active.slug = Set(slugify(&fields.name));
    active.name = Set(fields.name);
    active.description = Set(fields.description);
    active.price = Set(fields.price);
    active.commission = Set(fields.commission);
    active.quantity = Set(fields.quantity);
    active.image = Set(fields.image);
    active.category = Set(fields.category);
    active.updated_at = Set(Utc::now().into());
}

/// Owner of a product an admin is creating.
async fn admin_target_seller(state: &AppState, form: &ProductForm) -> AppResult<Uuid> {
    let raw = present(&form.seller_id)
        .ok_or_else(|| AppError::field("sellerId", "Seller is required"))?;
    let not_found = || AppError::field("sellerId", "Seller not found");
    let seller_id = Uuid::parse_str(raw).map_err(|_| not_found())?;

    Users::find_by_id(seller_id)
        .filter(users::Column::Role.eq(Role::Seller))
        .one(&*state.orm)
        .await?
        .map(|seller| seller.id)
        .ok_or_else(not_found)
}

/// Create a product, or update the one named by `productId`.
pub async fn upsert_product(
    state: &AppState,
    actor: &Identity,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    let fields = validate_product_form(&form).map_err(AppError::Validation)?;
    let requested_approval = checkbox(&form.approved);

    let (product, action) = match present(&form.product_id) {
        Some(raw_id) => {
            let id = Uuid::parse_str(raw_id).map_err(|_| AppError::NotFound)?;
            let existing = Products::find_by_id(id)
                .one(&*state.orm)
                .await?
                .ok_or(AppError::NotFound)?;
            if actor.role == Role::Seller && existing.seller_id != actor.user_id {
                return Err(AppError::Forbidden("not your product".into()));
            }

            let approved =
                resolve_approval(actor.role, requested_approval, Some(existing.approved))?;
            let mut active = existing.into_active_model();
            apply_fields(&mut active, fields);
            active.approved = Set(approved);
            (active.update(&*state.orm).await?, "product_update")
        }
        None => {
            let approved = resolve_approval(actor.role, requested_approval, None)?;
            let seller_id = match actor.role {
                Role::Admin => admin_target_seller(state, &form).await?,
                _ => actor.user_id,
            };

            let now = Utc::now();
            let mut active = products::ActiveModel {
                id: Set(Uuid::new_v4()),
                seller_id: Set(seller_id),
                approved: Set(approved),
                created_at: Set(now.into()),
                ..Default::default()
            };
            apply_fields(&mut active, fields);
            (active.insert(&*state.orm).await?, "product_create")
        }
    };

    tracing::info!(product_id = %product.id, actor = %actor.user_id, action, "product saved");
    if let Err(err) = log_audit(
        &*state.orm,
        Some(actor.user_id),
        action,
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id, "approved": product.approved })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product saved",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn list_products_admin(state: &AppState) -> AppResult<ApiResponse<AdminProductList>> {
    let items: Vec<ProductWithSeller> = Products::find()
        .order_by_desc(products::Column::CreatedAt)
        .find_also_related(Users)
        .all(&*state.orm)
        .await?
        .into_iter()
        .map(|(product, seller)| ProductWithSeller {
            product: product.into(),
            seller: seller.map(Into::into),
        })
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Products",
        AdminProductList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn list_seller_products(
    state: &AppState,
    seller: &Identity,
) -> AppResult<ApiResponse<ProductList>> {
    let items: Vec<Product> = Products::find()
        .filter(products::Column::SellerId.eq(seller.user_id))
        .order_by_desc(products::Column::CreatedAt)
        .all(&*state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(1, total, total)),
    ))
}

/// Approved products only, filtered and paginated.
pub async fn list_public_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(products::Column::Approved.eq(true));

    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(products::Column::Name).ilike(pattern));
    }

    if let Some(raw) = query.category.as_ref().filter(|s| !s.trim().is_empty()) {
        let category: Category = raw.parse().map_err(AppError::BadRequest)?;
        condition = condition.add(Expr::cust_with_values(
            r#"? = ANY("products"."category")"#,
            [category.as_str()],
        ));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(products::Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(products::Column::Price.lte(max_price));
    }

    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => products::Column::CreatedAt,
        ProductSortBy::Price => products::Column::Price,
        ProductSortBy::Name => products::Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&*state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&*state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_public_product(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductWithSeller>> {
    let (product, seller) = Products::find()
        .filter(products::Column::Slug.eq(slug))
        .filter(products::Column::Approved.eq(true))
        .order_by_desc(products::Column::CreatedAt)
        .find_also_related(Users)
        .one(&*state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Product",
        ProductWithSeller {
            product: product.into(),
            seller: seller.map(Into::into),
        },
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SessionConfig, session::SessionAuthority};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn form() -> ProductForm {
        ProductForm {
            name: Some("Book Title".into()),
            description: Some("Second edition, lightly used".into()),
            price: Some("30".into()),
            commission: Some("1.5".into()),
            quantity: Some("2".into()),
            image: Some("https://img.example/book.jpg".into()),
            category: Some("Books,Electronics".into()),
            ..Default::default()
        }
    }

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            name: "Actor".into(),
            email: "actor@campus.edu".into(),
            role,
            approved: true,
        }
    }

    fn product_row(seller_id: Uuid, approved: bool) -> products::Model {
        let now = Utc::now();
        products::Model {
            id: Uuid::new_v4(),
            name: "Book Title".into(),
            description: "Second edition, lightly used".into(),
            price: Decimal::from(30),
            commission: Decimal::new(15, 1),
            quantity: 2,
            image: "https://img.example/book.jpg".into(),
            category: vec!["Books".into(), "Electronics".into()],
            approved,
            slug: "book-title".into(),
            seller_id,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn state_with(db: MockDatabase) -> AppState {
        AppState::new(
            db.into_connection(),
            SessionAuthority::new(&SessionConfig::with_secret("test-secret")),
        )
    }

    fn field_error(err: AppError, field: &str) -> String {
        match err {
            AppError::Validation(errors) => errors.get(field).unwrap_or_default().to_string(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn categories_are_split_into_a_list() {
        let fields = validate_product_form(&form()).unwrap();
        assert_eq!(fields.category, vec!["Books", "Electronics"]);
        assert_eq!(fields.price, Decimal::from(30));
        assert_eq!(fields.commission, Decimal::new(15, 1));
        assert_eq!(fields.quantity, 2);
    }

    #[test]
    fn numeric_fields_are_coerced_and_checked() {
        let mut bad = form();
        bad.quantity = Some("-1".into());
        let errors = validate_product_form(&bad).unwrap_err();
        assert_eq!(errors.get("quantity"), Some("Quantity must be at least 0"));

        let mut bad = form();
        bad.price = Some("-0.01".into());
        let errors = validate_product_form(&bad).unwrap_err();
        assert_eq!(errors.get("price"), Some("Price must be greater than 0"));

        let mut bad = form();
        bad.commission = Some("abc".into());
        let errors = validate_product_form(&bad).unwrap_err();
        assert_eq!(errors.get("commission"), Some("Commission must be a number"));

        let mut bad = form();
        bad.price = Some("1e3".into());
        let errors = validate_product_form(&bad).unwrap_err();
        assert_eq!(errors.get("price"), Some("Price must be a number"));

        let mut zero = form();
        zero.price = Some("0".into());
        zero.quantity = Some("0".into());
        assert!(validate_product_form(&zero).is_ok());
    }

    #[test]
    fn money_is_kept_in_cents() {
        let mut priced = form();
        priced.price = Some("19.999".into());
        priced.commission = Some("0.125".into());
        let fields = validate_product_form(&priced).unwrap();
        assert_eq!(fields.price.to_string(), "20.00");
        assert_eq!(fields.commission.to_string(), "0.13");

        assert_eq!(MAX_MONEY.to_string(), "9999999999.99");
        let mut huge = form();
        huge.price = Some("10000000000".into());
        let errors = validate_product_form(&huge).unwrap_err();
        assert_eq!(errors.get("price"), Some("Price is too large"));
    }

    #[test]
    fn category_must_be_known() {
        let mut bad = form();
        bad.category = Some("".into());
        let errors = validate_product_form(&bad).unwrap_err();
        assert_eq!(errors.get("category"), Some("Category is required"));

        bad.category = Some("Books,Boats".into());
        let errors = validate_product_form(&bad).unwrap_err();
        assert_eq!(errors.get("category"), Some("Unknown category Boats"));
    }

    #[test]
    fn only_admins_decide_approval() {
        assert!(resolve_approval(Role::Admin, true, None).unwrap());
        assert!(!resolve_approval(Role::Admin, false, Some(true)).unwrap());
        assert!(resolve_approval(Role::Seller, false, Some(true)).unwrap());
        assert!(!resolve_approval(Role::Seller, false, None).unwrap());
        assert!(matches!(
            resolve_approval(Role::Seller, true, Some(false)),
            Err(AppError::Forbidden(_))
        ));
        assert!(resolve_approval(Role::Customer, false, None).is_err());
    }

    #[tokio::test]
    async fn seller_sending_approved_is_forbidden_before_any_write() {
        let state = state_with(MockDatabase::new(DatabaseBackend::Postgres));
        let mut submitted = form();
        submitted.approved = Some("on".into());

        let err = upsert_product(&state, &identity(Role::Seller), submitted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(state.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn seller_cannot_edit_another_sellers_product() {
        let other = product_row(Uuid::new_v4(), true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![other.clone()]]);
        let state = state_with(db);

        let mut submitted = form();
        submitted.product_id = Some(other.id.to_string());
        let err = upsert_product(&state, &identity(Role::Seller), submitted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn seller_create_stores_category_list_and_slug() {
        let seller = identity(Role::Seller);
        let inserted = product_row(seller.user_id, false);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![inserted]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let state = state_with(db);

        let resp = upsert_product(&state, &seller, form()).await.unwrap();
        let product = resp.data.unwrap();
        assert_eq!(product.category, vec!["Books", "Electronics"]);
        assert_eq!(product.slug, "book-title");
        assert!(!product.approved);

        let log = state.into_transaction_log();
        let insert = format!("{:?}", log[0]);
        assert!(insert.contains("INSERT INTO"), "{insert}");
        assert!(insert.contains("Electronics"), "{insert}");
        assert!(insert.contains("book-title"), "{insert}");
    }

    #[tokio::test]
    async fn admin_create_requires_existing_seller() {
        let state = state_with(MockDatabase::new(DatabaseBackend::Postgres));
        let err = upsert_product(&state, &identity(Role::Admin), form())
            .await
            .unwrap_err();
        assert_eq!(field_error(err, "sellerId"), "Seller is required");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()]);
        let state = state_with(db);
        let mut submitted = form();
        submitted.seller_id = Some(Uuid::new_v4().to_string());
        let err = upsert_product(&state, &identity(Role::Admin), submitted)
            .await
            .unwrap_err();
        assert_eq!(field_error(err, "sellerId"), "Seller not found");
    }
}
