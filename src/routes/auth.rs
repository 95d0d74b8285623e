use axum::{
    Form, Json, Router,
    extract::State,
    response::Redirect,
    routing::post,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dto::auth::{LoginForm, RegisterCustomerForm, RegisterSellerForm},
    error::AppResult,
    middleware::auth::Guest,
    response::{ActionOutcome, ApiResponse},
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register_customer))
        .route("/register/seller", post(register_seller))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; session cookie set, redirect to redirectTo"),
        (status = 400, description = "Field errors", body = ApiResponse<ActionOutcome>)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    _guest: Guest,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<(CookieJar, Redirect)> {
    let success = auth_service::login(&state, form).await?;
    Ok((jar.add(success.cookie), Redirect::to(&success.redirect_to)))
}

#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegisterCustomerForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Customer registered", body = ApiResponse<ActionOutcome>),
        (status = 400, description = "Field errors", body = ApiResponse<ActionOutcome>)
    ),
    tag = "Auth"
)]
pub async fn register_customer(
    State(state): State<AppState>,
    _guest: Guest,
    Form(form): Form<RegisterCustomerForm>,
) -> AppResult<Json<ApiResponse<ActionOutcome>>> {
    let resp = auth_service::register_customer(&state, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/register/seller",
    request_body(content = RegisterSellerForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Seller registered, awaiting approval", body = ApiResponse<ActionOutcome>),
        (status = 400, description = "Field errors", body = ApiResponse<ActionOutcome>)
    ),
    tag = "Auth"
)]
pub async fn register_seller(
    State(state): State<AppState>,
    _guest: Guest,
    Form(form): Form<RegisterSellerForm>,
) -> AppResult<Json<ApiResponse<ActionOutcome>>> {
    let resp = auth_service::register_seller(&state, form).await?;
    Ok(Json(resp))
}
