use actix_web::{HttpRequest, HttpResponse, http::header, web};
use validator::Validate;

use crate::errors::ApiError;
use crate::models::episode_series::EpisodeSeries;
use crate::models::episode_zip::EpisodeZip;
use crate::models::link_kind::LinkKind;
use crate::models::link_record::LinkRecord;
use crate::models::movie_link::MovieLink;
use crate::models::quality_link::QualityLink;
use crate::services::{allocator, token_gate};
use crate::state::app_state::AppState;
use crate::structs::link_requests::{
    CreateEpisodeSeriesRequest, CreateEpisodeZipRequest, CreateMovieLinkRequest,
    CreateQualityLinkRequest, CreatedLinkResponse,
};

fn bearer_token(req: &HttpRequest) -> Result<String, ApiError> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or(ApiError::Unauthorized)
}

fn short_url(code: &str) -> String {
    let host = std::env::var("HOST").unwrap_or_else(|_| String::from("http://localhost:8080"));
    format!("{}/r/{}", host, code)
}

fn created(record: LinkRecord) -> HttpResponse {
    HttpResponse::Created().json(CreatedLinkResponse {
        short_url: short_url(record.short_code()),
        short_code: record.short_code().to_string(),
        kind: record.kind(),
        name: record.display_name().to_string(),
        ads_enabled: record.ads_enabled(),
    })
}

// The four programmatic creation endpoints below share a shape: check
// the bearer token against the endpoint's scope, validate, allocate a
// code and insert. Links minted through the API always run the ad gate.

pub async fn api_create_short_link(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(body): web::Json<CreateMovieLinkRequest>,
) -> Result<HttpResponse, ApiError> {
    let storage = app_state.storage.as_ref();
    token_gate::authorize(storage, &bearer_token(&req)?, LinkKind::Single).await?;
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let movie_name = body.movie_name.trim().to_string();
    let original_link = body.original_link.trim().to_string();
    let record = allocator::insert_with_fresh_code(storage, |code| {
        LinkRecord::Single(MovieLink::new(
            movie_name.clone(),
            original_link.clone(),
            code,
            true,
        ))
    })
    .await?;
    Ok(created(record))
}

pub async fn api_create_quality_link(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(body): web::Json<CreateQualityLinkRequest>,
) -> Result<HttpResponse, ApiError> {
    let storage = app_state.storage.as_ref();
    token_gate::authorize(storage, &bearer_token(&req)?, LinkKind::Quality).await?;
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let qualities = body.qualities();
    if qualities.is_empty() {
        return Err(ApiError::Validation(
            "At least one quality link is required".into(),
        ));
    }

    let movie_name = body.movie_name.trim().to_string();
    let record = allocator::insert_with_fresh_code(storage, |code| {
        LinkRecord::Quality(QualityLink::new(
            movie_name.clone(),
            code,
            qualities.clone(),
            true,
        ))
    })
    .await?;
    Ok(created(record))
}

pub async fn api_create_episode_series(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(body): web::Json<CreateEpisodeSeriesRequest>,
) -> Result<HttpResponse, ApiError> {
    let storage = app_state.storage.as_ref();
    token_gate::authorize(storage, &bearer_token(&req)?, LinkKind::Series).await?;
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let series_name = body.series_name.trim().to_string();
    let episodes = body.episodes();
    let start = body.start_from_episode;
    let record = allocator::insert_with_fresh_code(storage, |code| {
        LinkRecord::Series(EpisodeSeries::new(
            series_name.clone(),
            code,
            start,
            episodes.clone(),
            true,
        ))
    })
    .await?;
    Ok(created(record))
}

pub async fn api_create_episode_zip(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(body): web::Json<CreateEpisodeZipRequest>,
) -> Result<HttpResponse, ApiError> {
    let storage = app_state.storage.as_ref();
    token_gate::authorize(storage, &bearer_token(&req)?, LinkKind::Zip).await?;
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    if body.from_episode >= body.to_episode {
        return Err(ApiError::InvalidRange {
            from: body.from_episode,
            to: body.to_episode,
        });
    }

    let movie_name = body.movie_name.trim().to_string();
    let qualities = body.qualities();
    let (from, to) = (body.from_episode, body.to_episode);
    let record = allocator::insert_with_fresh_code(storage, |code| {
        LinkRecord::Zip(EpisodeZip::new(
            movie_name.clone(),
            code,
            from,
            to,
            qualities.clone(),
            true,
        ))
    })
    .await?;
    Ok(created(record))
}
