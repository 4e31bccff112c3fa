//! Session gate for admin endpoints.
//!
//! The dashboard's auth layer issues an HS256 JWT in a session cookie. Every
//! `/api/admin` request must carry a valid, unexpired token whose role is
//! `admin`; anything else is rejected with 401 before the handler runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::ApiError;
use super::routes::AppState;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// The authenticated admin, attached to the request as an extension.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub role: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no session token")]
    MissingToken,

    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("user {0} is not an admin")]
    NotAdmin(String),
}

/// Signing and verification keys for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Mint a session token valid for `ttl`.
    pub fn issue(
        &self,
        user_id: &str,
        email: Option<&str>,
        role: &str,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.map(str::to_string),
            role: role.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify a token and require the admin role.
    pub fn verify_admin(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)?;
        let claims = data.claims;
        if !claims.role.eq_ignore_ascii_case("admin") {
            return Err(AuthError::NotAdmin(claims.sub));
        }
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Find the named cookie across all `Cookie` headers.
pub fn session_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Middleware: reject the request unless it carries an admin session.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let result = session_token(req.headers(), &state.config.auth.cookie_name)
        .ok_or(AuthError::MissingToken)
        .and_then(|token| state.sessions.verify_admin(token));

    match result {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::info!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
            Err(ApiError::Unauthorized)
        }
    }
}
