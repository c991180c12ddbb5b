use crate::errors::ApiError;
use crate::models::api_token::ApiToken;
use crate::models::link_kind::LinkKind;
use crate::storage::Storage;

/// Validates a bearer token against the required creation scope.
/// Missing and inactive tokens are indistinguishable (both
/// `Unauthorized`); an active token with the wrong scope is
/// `Forbidden`. On success `last_used` is updated best-effort: a
/// failure there is logged and never fails the request.
pub async fn authorize(
    storage: &dyn Storage,
    token_value: &str,
    required_scope: LinkKind,
) -> Result<ApiToken, ApiError> {
    let token = storage
        .find_token(token_value)
        .await?
        .filter(|token| token.is_active)
        .ok_or(ApiError::Unauthorized)?;

    if token.token_type != required_scope {
        return Err(ApiError::Forbidden);
    }

    if let Err(err) = storage.touch_token_last_used(token_value).await {
        log::warn!(
            "failed to update last_used for token '{}': {}",
            token.token_name,
            err
        );
    }

    Ok(token)
}
