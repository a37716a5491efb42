use aide::OperationInput;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use tracing::debug;

use crate::{
    errors::{AuthError, RestError},
    state::AppState,
};

/// Gate for the todo routes.
///
/// Passes every request through when basic auth is disabled; otherwise the
/// `Authorization: Basic` header must carry the configured credentials.
#[derive(Debug, Clone, Copy)]
pub struct BasicAuth;

#[async_trait]
impl FromRequestParts<AppState> for BasicAuth {
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(credentials) = state.settings.basic_auth.as_ref() else {
            return Ok(BasicAuth);
        };

        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::MissingCredentials)?;

        if !credentials.matches(basic.username(), basic.password()) {
            debug!("Rejected basic auth for user `{}`", basic.username());
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(BasicAuth)
    }
}

impl OperationInput for BasicAuth {}
