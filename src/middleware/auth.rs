use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};
use sea_orm::EntityTrait;

use crate::{
    entity::{Users, users},
    error::AppError,
    middleware::policy::{Decision, Identity, Requirement, authorize, guest_only, login_redirect},
    models::Role,
    state::AppState,
};

/// Resolved caller, if the request carries a valid session.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

/// Any signed-in, approved account.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

#[derive(Debug, Clone)]
pub struct CustomerUser(pub Identity);

#[derive(Debug, Clone)]
pub struct SellerUser(pub Identity);

#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

/// Visitor without a session; signed-in users are sent to their role home.
#[derive(Debug, Clone, Copy)]
pub struct Guest;

impl From<users::Model> for Identity {
    fn from(user: users::Model) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            approved: user.approved,
        }
    }
}

/// Look up the user behind the session credential.
///
/// The role and approval flag always come from the current user row, never
/// from the token.
pub async fn resolve_identity(parts: &Parts, state: &AppState) -> Result<Option<Identity>, AppError> {
    let Some(token) = state.sessions.credential(&parts.headers) else {
        return Ok(None);
    };
    let Some(claims) = state.sessions.resolve_session(&token) else {
        return Ok(None);
    };

    let user = Users::find_by_id(claims.sub).one(&*state.orm).await?;
    if user.is_none() {
        tracing::debug!(user_id = %claims.sub, "session refers to a missing user");
    }
    Ok(user.map(Identity::from))
}

/// Path as the client sent it, including any prefix stripped by nesting.
fn request_path(parts: &Parts) -> String {
    parts
        .extensions
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_owned())
        .unwrap_or_else(|| parts.uri.path().to_owned())
}

fn enforce(decision: Decision, path: &str) -> Result<(), AppError> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::DenyRedirect(target) => {
            tracing::debug!(path, target = %target, "redirecting request");
            Err(AppError::Redirect(target))
        }
        Decision::DenyUnauthorized(message) => {
            tracing::warn!(path, message, "request denied");
            Err(AppError::Forbidden(message.to_string()))
        }
    }
}

async fn require(
    parts: &Parts,
    state: &AppState,
    requirement: Requirement,
) -> Result<Identity, AppError> {
    let path = request_path(parts);
    let identity = resolve_identity(parts, state).await?;
    enforce(authorize(identity.as_ref(), requirement, &path), &path)?;
    identity.ok_or_else(|| AppError::Redirect(login_redirect(&path)))
}

impl FromRequestParts<AppState> for MaybeIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(resolve_identity(parts, state).await?))
    }
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require(parts, state, Requirement::AUTHENTICATED)
            .await
            .map(Authenticated)
    }
}

impl FromRequestParts<AppState> for CustomerUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require(parts, state, Requirement::role(Role::Customer))
            .await
            .map(CustomerUser)
    }
}

impl FromRequestParts<AppState> for SellerUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require(parts, state, Requirement::role(Role::Seller))
            .await
            .map(SellerUser)
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require(parts, state, Requirement::role(Role::Admin))
            .await
            .map(AdminUser)
    }
}

impl FromRequestParts<AppState> for Guest {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = resolve_identity(parts, state).await?;
        let path = request_path(parts);
        enforce(guest_only(identity.as_ref()), &path)?;
        Ok(Guest)
    }
}
