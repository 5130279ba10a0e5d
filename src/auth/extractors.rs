use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use time::OffsetDateTime;
use tracing::{debug, error, warn};

use super::{repo::UserRepo, repo_types::User};
use crate::{error::ApiError, state::AppState};

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
///
/// Taking this extractor is what makes a route protected: the handler body only
/// runs once the token has verified and its subject has been loaded.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or_else(|| ApiError::unauthenticated("Authorization Header is required"))?;

        // a header that is not visible ASCII cannot carry a bearer token
        let token = header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthenticated("Bearer token is required"))?;

        let user_id = state
            .tokens
            .validate(token, OffsetDateTime::now_utc())
            .map_err(|reason| {
                warn!(%reason, "token rejected");
                ApiError::unauthenticated("Invalid token")
            })?;

        match state.store.find_user_by_id(user_id).await {
            Ok(Some(user)) => {
                debug!(user_id, "request authenticated");
                Ok(AuthUser(user))
            }
            Ok(None) => {
                warn!(user_id, "token subject no longer exists");
                Err(ApiError::unauthenticated("Unauthorized access"))
            }
            Err(e) => {
                error!(error = %e, user_id, "loading token subject failed");
                Err(ApiError::unauthenticated("Unauthorized access"))
            }
        }
    }
}
