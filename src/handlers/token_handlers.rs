use actix_web::{HttpResponse, web};
use mongodb::bson::oid::ObjectId;
use validator::Validate;

use crate::errors::ApiError;
use crate::models::api_token::{ApiToken, ApiTokenResponse};
use crate::state::app_state::AppState;
use crate::structs::token_requests::{CreateTokenRequest, CreatedTokenResponse, UpdateTokenRequest};

fn parse_object_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::Validation("Invalid ID format".into()))
}

/// Mints a new scoped token. This response is the only place the token
/// value is ever returned; the caller must store it.
pub async fn create_token(
    app_state: web::Data<AppState>,
    web::Json(body): web::Json<CreateTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let token = ApiToken::new(body.token_name.trim().to_string(), body.token_type);
    let token = app_state.storage.insert_token(token).await?;
    Ok(HttpResponse::Created().json(CreatedTokenResponse::from(token)))
}

pub async fn get_tokens(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let tokens = app_state.storage.list_tokens().await?;
    let responses: Vec<ApiTokenResponse> =
        tokens.into_iter().map(ApiTokenResponse::from).collect();
    Ok(HttpResponse::Ok().json(responses))
}

pub async fn update_token_status(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    web::Json(body): web::Json<UpdateTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path.into_inner())?;
    let token = app_state.storage.set_token_active(id, body.is_active).await?;
    Ok(HttpResponse::Ok().json(ApiTokenResponse::from(token)))
}

pub async fn delete_token(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path.into_inner())?;
    app_state.storage.delete_token(id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
