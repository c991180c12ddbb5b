use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub admin_id: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin_id: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateCredentialsRequest {
    #[validate(length(min = 1, message = "Admin id is required"))]
    pub admin_id: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}
