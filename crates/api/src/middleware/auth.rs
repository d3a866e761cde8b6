//! # Authentication Module
//!
//! Resolves the caller behind a request through the session gateway. The
//! session token comes from an `Authorization: Bearer` header or, failing
//! that, the `st_session` cookie. Credentials are never checked here; only
//! the gateway knows which tokens are live.
//!
//! The periodic trigger endpoint is guarded separately by a shared secret.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rollcall_core::{errors::AttendanceError, permissions::Caller};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::{middleware::error_handling::AppError, ApiState};

pub const SESSION_COOKIE: &str = "st_session";

/// Extracts the session token from the request headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// The resolved caller of a request. Rejects with 401 when there is none.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Caller);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthenticatedCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<ApiState>) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| AttendanceError::Authentication("Not signed in".to_string()))?;

        let caller = state
            .ctx
            .gateway
            .resolve_caller(&token)
            .await?
            .ok_or_else(|| AttendanceError::Authentication("Session expired or unknown".to_string()))?;

        Ok(AuthenticatedCaller(caller))
    }
}

/// Checks the periodic trigger's `Authorization: Bearer <secret>` header.
///
/// An unconfigured secret is a server fault and answers 500 rather than
/// letting the endpoint run unauthenticated.
pub fn verify_cron_secret(expected: Option<&str>, headers: &HeaderMap) -> Result<(), Response> {
    let Some(secret) = expected else {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "CRON_SECRET not configured" })),
        )
            .into_response());
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let expected = format!("Bearer {}", secret);
    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response())
    }
}
