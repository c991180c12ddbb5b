use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::api_token::ApiToken;
use crate::models::link_kind::LinkKind;

#[derive(Deserialize, Validate)]
pub struct CreateTokenRequest {
    #[validate(length(min = 1, message = "Token name is required"))]
    pub token_name: String,
    pub token_type: LinkKind,
}

#[derive(Deserialize)]
pub struct UpdateTokenRequest {
    pub is_active: bool,
}

/// Creation response: the only place the secret ever appears.
#[derive(Serialize)]
pub struct CreatedTokenResponse {
    pub id: String,
    pub token_name: String,
    pub token_value: String,
    pub token_type: LinkKind,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<ApiToken> for CreatedTokenResponse {
    fn from(token: ApiToken) -> Self {
        Self {
            id: token.id.map(|id| id.to_hex()).unwrap_or_default(),
            token_name: token.token_name,
            token_value: token.token_value,
            token_type: token.token_type,
            is_active: token.is_active,
            created_at: token.created_at,
        }
    }
}
