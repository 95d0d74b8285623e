use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{ApproveSellerForm, LoginForm, RegisterCustomerForm, RegisterSellerForm, ResetPasswordRequest},
        orders::{CheckoutItem, CheckoutRequest, OrderList, OrderView, SellerOrderForm, UpdateOrderStatusForm},
        products::{AdminProductList, ProductForm, ProductList, SellerList},
    },
    models::{AccountType, Category, Order, OrderItem, OrderStatus, Payment, Product, ProductWithSeller, Role, Seller, User},
    response::{ActionOutcome, ApiResponse, Meta},
    routes::{admin, api, auth, health, orders, params, products, seller},
    services::{admin_service::AdminOverview, order_service::SellerOverview},
    validation::FieldErrors,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("__session"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register_customer,
        auth::register_seller,
        api::me,
        api::reset_password,
        api::logout,
        products::list_products,
        products::get_product,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::cancel_order,
        seller::overview,
        seller::list_products,
        seller::save_product,
        seller::list_orders,
        seller::order_action,
        seller::get_order,
        admin::overview,
        admin::list_products,
        admin::save_product,
        admin::list_sellers,
        admin::approve_seller,
        admin::list_all_orders,
        admin::update_order_status,
        admin::cancel_order
    ),
    components(
        schemas(
            User,
            Seller,
            Role,
            AccountType,
            Category,
            Product,
            ProductWithSeller,
            Order,
            OrderStatus,
            OrderItem,
            Payment,
            OrderView,
            OrderList,
            CheckoutItem,
            CheckoutRequest,
            SellerOrderForm,
            UpdateOrderStatusForm,
            ProductForm,
            ProductList,
            AdminProductList,
            SellerList,
            LoginForm,
            RegisterCustomerForm,
            RegisterSellerForm,
            ResetPasswordRequest,
            ApproveSellerForm,
            AdminOverview,
            SellerOverview,
            ActionOutcome,
            FieldErrors,
            params::Pagination,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderView>,
            ApiResponse<OrderList>,
            ApiResponse<ActionOutcome>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Login, registration and session endpoints"),
        (name = "Products", description = "Public catalog"),
        (name = "Orders", description = "Customer orders and checkout"),
        (name = "Seller", description = "Seller products and order fulfilment"),
        (name = "Admin", description = "Seller approval, moderation and orders"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
