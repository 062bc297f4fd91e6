//! Caller identity.
//!
//! Authentication happens in a trusted upstream proxy. The proxy proves itself
//! with the shared secret from `[auth] proxy_secret` in the `x-proxy-secret`
//! header and names the authenticated user in `x-user-id`. Identity headers on
//! a request without the secret are ignored, and with no secret configured every
//! user-scoped request is rejected.

use crate::{api::AppState, core::user::get_user, entities::user, errors::Error};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tracing::{debug, warn};

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the proxy's shared secret
pub const PROXY_SECRET_HEADER: &str = "x-proxy-secret";

/// Compares without short-circuiting on the first differing byte.
fn secrets_match(given: &[u8], expected: &[u8]) -> bool {
    given.len() == expected.len()
        && given
            .iter()
            .zip(expected)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

fn verify_proxy(headers: &HeaderMap, state: &AppState) -> Result<(), Error> {
    let Some(expected) = state.config.auth.proxy_secret.as_deref() else {
        warn!("Rejected request: no proxy secret configured");
        return Err(Error::Unauthenticated);
    };
    let given = headers
        .get(PROXY_SECRET_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();
    if secrets_match(given, expected.as_bytes()) {
        Ok(())
    } else {
        debug!("Rejected request without a valid proxy secret");
        Err(Error::Unauthenticated)
    }
}

/// A request forwarded by the trusted proxy.
///
/// Guards routes that act before a user exists, such as registration.
#[derive(Debug, Clone, Copy)]
pub struct TrustedProxy;

#[axum::async_trait]
impl FromRequestParts<AppState> for TrustedProxy {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        verify_proxy(&parts.headers, state)?;
        Ok(Self)
    }
}

/// The user a request acts on behalf of.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

impl CurrentUser {
    /// Id of the caller
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.0.id
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        verify_proxy(&parts.headers, state)?;

        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or(Error::Unauthenticated)?;

        match get_user(&state.db, user_id).await {
            Ok(user) => Ok(Self(user)),
            Err(Error::NotFound { .. }) => {
                debug!("Rejected request for unknown user {}", user_id);
                Err(Error::Unauthenticated)
            }
            Err(e) => Err(e),
        }
    }
}
