use axum::{
    Form, Json, Router,
    extract::State,
    response::Redirect,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dto::auth::ResetPasswordRequest,
    error::AppResult,
    middleware::auth::Authenticated,
    models::User,
    response::{ActionOutcome, ApiResponse},
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(me))
        .route("/api/reset-password", post(reset_password))
        .route("/api/auth/logout", post(logout))
}

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<User>),
        (status = 303, description = "Not signed in")
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::current_user(&state, &identity).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/reset-password",
    request_body(content = ResetPasswordRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Password updated", body = ApiResponse<ActionOutcome>),
        (status = 400, description = "Field errors", body = ApiResponse<ActionOutcome>),
        (status = 403, description = "Not the same user and not an admin")
    ),
    security(("session_cookie" = [])),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
    Form(payload): Form<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<ActionOutcome>>> {
    let resp = auth_service::reset_password(&state, &identity, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 303, description = "Session cookie removed, redirect to /")
    ),
    tag = "Auth"
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    tracing::info!("session destroyed");
    (jar.add(state.sessions.destroy_session()), Redirect::to("/"))
}
