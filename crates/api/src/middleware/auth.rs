//! Bearer-token authentication for event handlers.
//!
//! Tokens are issued by the account service; this API only checks signature
//! and expiry, and takes the caller's id and display name from the claims.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use santa_core::error::CoreError;
use santa_core::event::{validate_display_name, Participant};
use santa_core::types::UserId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller, resolved from `Authorization: Bearer <token>`.
///
/// Taking `AuthUser` as a handler argument makes the route authenticated.
/// The user id is also recorded on the request's tracing span.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// From `claims.sub`.
    pub user_id: UserId,
    /// Display name from `claims.name`, untrimmed.
    pub name: String,
}

impl AuthUser {
    /// The caller as a roster entry. Fails if the token carries a blank or
    /// overlong display name.
    pub fn participant(&self) -> Result<Participant, CoreError> {
        let display_name = self.name.trim();
        validate_display_name(display_name)?;
        Ok(Participant {
            user_id: self.user_id,
            display_name: display_name.to_string(),
        })
    }
}

fn unauthorized(message: &str) -> CoreError {
    CoreError::Unauthorized(message.to_string())
}

/// Extract the token from the `Authorization` header. The scheme name is
/// matched case-insensitively.
fn bearer_token(parts: &Parts) -> Result<&str, CoreError> {
    const INVALID_FORMAT: &str = "Invalid Authorization format. Expected: Bearer <token>";

    let value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| unauthorized(INVALID_FORMAT))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                return Err(unauthorized(INVALID_FORMAT));
            }
            Ok(token)
        }
        _ => Err(unauthorized(INVALID_FORMAT)),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        tracing::Span::current().record("user_id", claims.sub);

        Ok(AuthUser {
            user_id: claims.sub,
            name: claims.name,
        })
    }
}
