use actix_web::{HttpRequest, HttpResponse, web};

use crate::errors::ApiError;
use crate::services::resolver;
use crate::state::app_state::AppState;
use crate::structs::link_requests::AdClearedRequest;
use crate::utils::hash_ip::hash_ip;

fn visitor_hash(req: &HttpRequest) -> String {
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();
    hash_ip(&ip)
}

/// Resolve a short code for the redirect page. The payload tells the
/// client whether to run the countdown (`skip_timer`) and what to
/// reveal once it finishes. Counts the view.
pub async fn resolve_link(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let visitor = visitor_hash(&req);
    let resolution = resolver::resolve(app_state.storage.as_ref(), &visitor, &code).await?;
    Ok(HttpResponse::Ok().json(resolution))
}

/// Called by the redirect page when the countdown finishes; repeat
/// visits within the session window then skip the gate.
pub async fn record_ad_cleared(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    web::Json(body): web::Json<AdClearedRequest>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let visitor = visitor_hash(&req);
    resolver::record_ad_cleared(app_state.storage.as_ref(), &visitor, &code, body.link_type)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
