use actix_web::{HttpResponse, Result, error, web};
use bcrypt::{DEFAULT_COST, hash, verify};
use validator::Validate;

use crate::models::admin::AdminSettings;
use crate::state::app_state::AppState;
use crate::storage::StorageError;
use crate::structs::auth_requests::{LoginRequest, LoginResponse, UpdateCredentialsRequest};
use crate::utils::jwt::create_token;

pub async fn login(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let settings = app_state
        .storage
        .get_admin_settings()
        .await
        .map_err(|e| error::ErrorInternalServerError(format!("Database error: {}", e)))?;

    match settings {
        Some(settings) => {
            // Verify password
            let password_matches = verify(&req.password, &settings.admin_password)
                .map_err(|_| error::ErrorInternalServerError("Password verification failed"))?;

            if settings.admin_id != req.admin_id || !password_matches {
                return Ok(HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "Invalid credentials"
                })));
            }

            let token = create_token(&settings.admin_id).map_err(|e| {
                error::ErrorInternalServerError(format!("Token generation failed: {}", e))
            })?;

            Ok(HttpResponse::Ok().json(LoginResponse {
                token,
                admin_id: settings.admin_id,
            }))
        }
        None => Ok(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid credentials"
        }))),
    }
}

// First-run bootstrap: seeds admin credentials from the environment.
// Rejected once credentials exist.
pub async fn init_admin(app_state: web::Data<AppState>) -> Result<HttpResponse> {
    let existing = app_state
        .storage
        .get_admin_settings()
        .await
        .map_err(|e| error::ErrorInternalServerError(format!("Database error: {}", e)))?;

    if existing.is_some() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Admin credentials already exist"
        })));
    }

    let admin_id = std::env::var("ADMIN_USERNAME")
        .map_err(|_| error::ErrorInternalServerError("ADMIN_USERNAME not set"))?;
    let password = std::env::var("ADMIN_PASSWORD")
        .map_err(|_| error::ErrorInternalServerError("ADMIN_PASSWORD not set"))?;

    let password_hash = hash(password, DEFAULT_COST)
        .map_err(|e| error::ErrorInternalServerError(format!("Failed to hash password: {}", e)))?;

    app_state
        .storage
        .insert_admin_settings(AdminSettings::new(admin_id.clone(), password_hash))
        .await
        .map_err(|e| error::ErrorInternalServerError(format!("Database error: {}", e)))?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Admin credentials initialized",
        "admin_id": admin_id
    })))
}

pub async fn update_credentials(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<UpdateCredentialsRequest>,
) -> Result<HttpResponse> {
    if let Err(errors) = req.validate() {
        return Ok(HttpResponse::BadRequest().json(errors));
    }

    let password_hash = hash(&req.password, DEFAULT_COST)
        .map_err(|e| error::ErrorInternalServerError(format!("Failed to hash password: {}", e)))?;

    match app_state
        .storage
        .update_admin_credentials(&req.admin_id, &password_hash)
        .await
    {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true }))),
        Err(StorageError::NotFound) => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "Admin settings not found"
        }))),
        Err(e) => Err(error::ErrorInternalServerError(format!(
            "Database error: {}",
            e
        ))),
    }
}
