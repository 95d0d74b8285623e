//! Signed session credentials.
//!
//! The credential is a HS256 JWT carried in an HttpOnly cookie. Its payload is
//! only the user id and an expiry; role and approval are re-read from the
//! user row on every request, so the token never goes stale when an admin
//! approves a seller.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::SessionConfig,
    error::{AppError, AppResult},
    models::Role,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub exp: usize,
}

#[derive(Clone)]
pub struct SessionAuthority {
    inner: Arc<Inner>,
}

struct Inner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    cookie_name: String,
    ttl: Duration,
    remember_ttl: Duration,
    secure: bool,
}

impl SessionAuthority {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                encoding: EncodingKey::from_secret(config.secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.secret.as_bytes()),
                cookie_name: config.cookie_name.clone(),
                ttl: Duration::try_hours(config.ttl_hours).unwrap_or(Duration::MAX),
                remember_ttl: Duration::try_days(config.remember_days).unwrap_or(Duration::MAX),
                secure: config.secure,
            }),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.inner.cookie_name
    }

    /// Sign a token for `user_id`.
    pub fn issue_token(&self, user_id: Uuid, remember: bool) -> AppResult<String> {
        let ttl = if remember {
            self.inner.remember_ttl
        } else {
            self.inner.ttl
        };
        let expiration = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = SessionClaims {
            sub: user_id,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.inner.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    /// Build the session cookie for a freshly authenticated user.
    ///
    /// Without `remember` the cookie carries no Max-Age and ends with the
    /// browser session.
    pub fn create_session(
        &self,
        user_id: Uuid,
        role: Role,
        remember: bool,
    ) -> AppResult<Cookie<'static>> {
        let token = self.issue_token(user_id, remember)?;
        let mut builder = Cookie::build((self.inner.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.inner.secure);
        if remember {
            builder = builder.max_age(time::Duration::seconds(
                self.inner.remember_ttl.num_seconds(),
            ));
        }

        tracing::info!(user_id = %user_id, role = ?role, remember, "session created");
        Ok(builder.build())
    }

    /// Decode a credential. Missing, malformed, expired or forged tokens all
    /// resolve to `None`.
    pub fn resolve_session(&self, token: &str) -> Option<SessionClaims> {
        match decode::<SessionClaims>(
            token,
            &self.inner.decoding,
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(data) => Some(data.claims),
            Err(err) => {
                tracing::debug!(error = %err, "rejected session credential");
                None
            }
        }
    }

    /// Cookie that overwrites and expires the session cookie.
    pub fn destroy_session(&self) -> Cookie<'static> {
        Cookie::build((self.inner.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.inner.secure)
            .max_age(time::Duration::ZERO)
            .build()
    }

    /// Raw credential from the session cookie, else from a bearer header.
    pub fn credential(&self, headers: &HeaderMap) -> Option<String> {
        let jar = CookieJar::from_headers(headers);
        if let Some(cookie) = jar.get(&self.inner.cookie_name) {
            if !cookie.value().is_empty() {
                return Some(cookie.value().to_owned());
            }
        }

        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn authority() -> SessionAuthority {
        SessionAuthority::new(&SessionConfig::with_secret("test-secret"))
    }

    #[test]
    fn round_trips_user_id() {
        let sessions = authority();
        let user_id = Uuid::new_v4();
        let token = sessions.issue_token(user_id, false).unwrap();
        let claims = sessions.resolve_session(&token).expect("valid token");
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn fails_closed_on_bad_credentials() {
        let sessions = authority();
        assert!(sessions.resolve_session("").is_none());
        assert!(sessions.resolve_session("not-a-jwt").is_none());

        let other = SessionAuthority::new(&SessionConfig::with_secret("another-secret"));
        let forged = other.issue_token(Uuid::new_v4(), true).unwrap();
        assert!(sessions.resolve_session(&forged).is_none());
    }

    #[test]
    fn rejects_expired_tokens() {
        let mut config = SessionConfig::with_secret("test-secret");
        config.ttl_hours = -2;
        let sessions = SessionAuthority::new(&config);
        let token = sessions.issue_token(Uuid::new_v4(), false).unwrap();
        assert!(sessions.resolve_session(&token).is_none());
    }

    #[test]
    fn oversized_lifetimes_fail_without_panicking() {
        let mut config = SessionConfig::with_secret("test-secret");
        config.ttl_hours = i64::MAX;
        let sessions = SessionAuthority::new(&config);
        assert!(matches!(
            sessions.issue_token(Uuid::new_v4(), false),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn remember_controls_cookie_lifetime() {
        let sessions = authority();
        let session_cookie = sessions
            .create_session(Uuid::new_v4(), Role::Customer, false)
            .unwrap();
        assert_eq!(session_cookie.max_age(), None);
        assert_eq!(session_cookie.http_only(), Some(true));

        let remembered = sessions
            .create_session(Uuid::new_v4(), Role::Customer, true)
            .unwrap();
        assert_eq!(remembered.max_age(), Some(time::Duration::days(30)));
    }

    #[test]
    fn destroyed_session_expires_immediately() {
        let cookie = authority().destroy_session();
        assert_eq!(cookie.name(), "__session");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn reads_cookie_before_bearer_header() {
        let sessions = authority();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(sessions.credential(&headers).as_deref(), Some("from-header"));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; __session=from-cookie"),
        );
        assert_eq!(sessions.credential(&headers).as_deref(), Some("from-cookie"));
    }
}
