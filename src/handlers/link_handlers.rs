use actix_web::{HttpResponse, web};
use mongodb::bson::oid::ObjectId;
use validator::Validate;

use crate::errors::ApiError;
use crate::models::episode_series::EpisodeSeries;
use crate::models::episode_zip::EpisodeZip;
use crate::models::link_kind::LinkKind;
use crate::models::link_record::LinkRecord;
use crate::models::movie_link::MovieLink;
use crate::models::quality_link::QualityLink;
use crate::services::allocator;
use crate::state::app_state::AppState;
use crate::storage::LinkPatch;
use crate::structs::link_requests::{
    CreateEpisodeSeriesRequest, CreateEpisodeZipRequest, CreateMovieLinkRequest,
    CreateQualityLinkRequest, EpisodeSeriesResponse, EpisodeZipResponse, MovieLinkResponse,
    QualityLinkResponse, UpdateEpisodeSeriesRequest, UpdateEpisodeZipRequest,
    UpdateMovieLinkRequest, UpdateQualityLinkRequest,
};

fn parse_object_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::Validation("Invalid ID format".into()))
}

// ---------------------------------------------------------------------------
// Movie links (single destination)
// ---------------------------------------------------------------------------

pub async fn get_movie_links(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let links = app_state.storage.list_links(LinkKind::Single).await?;
    let responses: Vec<MovieLinkResponse> = links
        .into_iter()
        .filter_map(|record| match record {
            LinkRecord::Single(link) => Some(MovieLinkResponse::from(link)),
            _ => None,
        })
        .collect();
    Ok(HttpResponse::Ok().json(responses))
}

pub async fn create_movie_link(
    app_state: web::Data<AppState>,
    web::Json(body): web::Json<CreateMovieLinkRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let movie_name = body.movie_name.trim().to_string();
    let original_link = body.original_link.trim().to_string();
    let ads_enabled = body.ads_enabled;
    let record = allocator::insert_with_fresh_code(app_state.storage.as_ref(), |code| {
        LinkRecord::Single(MovieLink::new(
            movie_name.clone(),
            original_link.clone(),
            code,
            ads_enabled,
        ))
    })
    .await?;

    match record {
        LinkRecord::Single(link) => {
            Ok(HttpResponse::Created().json(MovieLinkResponse::from(link)))
        }
        _ => unreachable!("allocator returned a different kind"),
    }
}

pub async fn update_movie_link(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    web::Json(body): web::Json<UpdateMovieLinkRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path.into_inner())?;

    let original_link = match body.original_link.map(|url| url.trim().to_string()) {
        Some(url) if url.is_empty() => {
            return Err(ApiError::Validation("Original link is required".into()));
        }
        other => other,
    };

    let updated = app_state
        .storage
        .update_link(
            id,
            LinkPatch::Single {
                movie_name: body.movie_name,
                original_link,
                ads_enabled: body.ads_enabled,
            },
        )
        .await?;

    match updated {
        LinkRecord::Single(link) => Ok(HttpResponse::Ok().json(MovieLinkResponse::from(link))),
        _ => unreachable!("patch kind mismatch"),
    }
}

pub async fn delete_movie_link(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path.into_inner())?;
    app_state.storage.delete_link(LinkKind::Single, id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

// ---------------------------------------------------------------------------
// Quality links
// ---------------------------------------------------------------------------

pub async fn get_quality_links(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let links = app_state.storage.list_links(LinkKind::Quality).await?;
    let responses: Vec<QualityLinkResponse> = links
        .into_iter()
        .filter_map(|record| match record {
            LinkRecord::Quality(link) => Some(QualityLinkResponse::from(link)),
            _ => None,
        })
        .collect();
    Ok(HttpResponse::Ok().json(responses))
}

pub async fn create_quality_link(
    app_state: web::Data<AppState>,
    web::Json(body): web::Json<CreateQualityLinkRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let qualities = body.qualities();
    if qualities.is_empty() {
        return Err(ApiError::Validation(
            "At least one quality link is required".into(),
        ));
    }

    let movie_name = body.movie_name.trim().to_string();
    let ads_enabled = body.ads_enabled;
    let record = allocator::insert_with_fresh_code(app_state.storage.as_ref(), |code| {
        LinkRecord::Quality(QualityLink::new(
            movie_name.clone(),
            code,
            qualities.clone(),
            ads_enabled,
        ))
    })
    .await?;

    match record {
        LinkRecord::Quality(link) => {
            Ok(HttpResponse::Created().json(QualityLinkResponse::from(link)))
        }
        _ => unreachable!("allocator returned a different kind"),
    }
}

pub async fn update_quality_link(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    web::Json(body): web::Json<UpdateQualityLinkRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path.into_inner())?;

    let updated = app_state
        .storage
        .update_link(
            id,
            LinkPatch::Quality {
                movie_name: body.movie_name,
                quality_480p: body.quality_480p,
                quality_720p: body.quality_720p,
                quality_1080p: body.quality_1080p,
                ads_enabled: body.ads_enabled,
            },
        )
        .await?;

    match updated {
        LinkRecord::Quality(link) => Ok(HttpResponse::Ok().json(QualityLinkResponse::from(link))),
        _ => unreachable!("patch kind mismatch"),
    }
}

pub async fn delete_quality_link(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path.into_inner())?;
    app_state.storage.delete_link(LinkKind::Quality, id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

// ---------------------------------------------------------------------------
// Episode series
// ---------------------------------------------------------------------------

pub async fn get_episode_series(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let links = app_state.storage.list_links(LinkKind::Series).await?;
    let responses: Vec<EpisodeSeriesResponse> = links
        .into_iter()
        .filter_map(|record| match record {
            LinkRecord::Series(link) => Some(EpisodeSeriesResponse::from(link)),
            _ => None,
        })
        .collect();
    Ok(HttpResponse::Ok().json(responses))
}

pub async fn create_episode_series(
    app_state: web::Data<AppState>,
    web::Json(body): web::Json<CreateEpisodeSeriesRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let series_name = body.series_name.trim().to_string();
    let episodes = body.episodes();
    let start = body.start_from_episode;
    let ads_enabled = body.ads_enabled;
    let record = allocator::insert_with_fresh_code(app_state.storage.as_ref(), |code| {
        LinkRecord::Series(EpisodeSeries::new(
            series_name.clone(),
            code,
            start,
            episodes.clone(),
            ads_enabled,
        ))
    })
    .await?;

    match record {
        LinkRecord::Series(link) => {
            Ok(HttpResponse::Created().json(EpisodeSeriesResponse::from(link)))
        }
        _ => unreachable!("allocator returned a different kind"),
    }
}

pub async fn update_episode_series(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    web::Json(body): web::Json<UpdateEpisodeSeriesRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path.into_inner())?;

    let updated = app_state
        .storage
        .update_link(
            id,
            LinkPatch::Series {
                series_name: body.series_name,
                start_from_episode: body.start_from_episode,
                episodes: body.episodes,
                ads_enabled: body.ads_enabled,
            },
        )
        .await?;

    match updated {
        LinkRecord::Series(link) => {
            Ok(HttpResponse::Ok().json(EpisodeSeriesResponse::from(link)))
        }
        _ => unreachable!("patch kind mismatch"),
    }
}

pub async fn delete_episode_series(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path.into_inner())?;
    app_state.storage.delete_link(LinkKind::Series, id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

// ---------------------------------------------------------------------------
// Episode zips (range archives)
// ---------------------------------------------------------------------------

pub async fn get_episode_zips(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let links = app_state.storage.list_links(LinkKind::Zip).await?;
    let responses: Vec<EpisodeZipResponse> = links
        .into_iter()
        .filter_map(|record| match record {
            LinkRecord::Zip(link) => Some(EpisodeZipResponse::from(link)),
            _ => None,
        })
        .collect();
    Ok(HttpResponse::Ok().json(responses))
}

pub async fn create_episode_zip(
    app_state: web::Data<AppState>,
    web::Json(body): web::Json<CreateEpisodeZipRequest>,
) -> Result<HttpResponse, ApiError> {
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
    let ads_enabled = body.ads_enabled;
    let record = allocator::insert_with_fresh_code(app_state.storage.as_ref(), |code| {
        LinkRecord::Zip(EpisodeZip::new(
            movie_name.clone(),
            code,
            from,
            to,
            qualities.clone(),
            ads_enabled,
        ))
    })
    .await?;

    match record {
        LinkRecord::Zip(link) => Ok(HttpResponse::Created().json(EpisodeZipResponse::from(link))),
        _ => unreachable!("allocator returned a different kind"),
    }
}

pub async fn update_episode_zip(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    web::Json(body): web::Json<UpdateEpisodeZipRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path.into_inner())?;

    // The range is updated as a pair, and an edit can never store an
    // inverted range.
    let range = match (body.from_episode, body.to_episode) {
        (Some(from), Some(to)) => {
            if from >= to {
                return Err(ApiError::InvalidRange { from, to });
            }
            Some((from, to))
        }
        (None, None) => None,
        _ => {
            return Err(ApiError::Validation(
                "from_episode and to_episode must be updated together".into(),
            ));
        }
    };

    let updated = app_state
        .storage
        .update_link(
            id,
            LinkPatch::Zip {
                movie_name: body.movie_name,
                range,
                quality_480p: body.quality_480p,
                quality_720p: body.quality_720p,
                quality_1080p: body.quality_1080p,
                ads_enabled: body.ads_enabled,
            },
        )
        .await?;

    match updated {
        LinkRecord::Zip(link) => Ok(HttpResponse::Ok().json(EpisodeZipResponse::from(link))),
        _ => unreachable!("patch kind mismatch"),
    }
}

pub async fn delete_episode_zip(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_object_id(&path.into_inner())?;
    app_state.storage.delete_link(LinkKind::Zip, id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
