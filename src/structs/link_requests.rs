use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::models::episode_series::EpisodeSeries;
use crate::models::episode_zip::EpisodeZip;
use crate::models::link_kind::LinkKind;
use crate::models::movie_link::MovieLink;
use crate::models::quality::QualityUrls;
use crate::models::quality_link::QualityLink;
use crate::storage::UrlPatch;

fn default_true() -> bool {
    true
}

/// The admin panel submits empty strings for tiers without a link;
/// those normalize to None before anything is stored.
pub fn clean_url(url: Option<String>) -> Option<String> {
    url.and_then(|u| {
        let trimmed = u.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    })
}

/// Patch deserializer distinguishing an absent tier field (leave it
/// untouched) from a present-but-empty one (clear it to null).
fn patch_url<'de, D>(deserializer: D) -> Result<UrlPatch, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(clean_url(value)))
}

#[derive(Deserialize, Validate)]
pub struct CreateMovieLinkRequest {
    #[validate(length(min = 1, message = "Movie name is required"))]
    pub movie_name: String,
    #[validate(url(message = "Valid URL is required"))]
    pub original_link: String,
    #[serde(default = "default_true")]
    pub ads_enabled: bool,
}

#[derive(Deserialize, Validate)]
pub struct CreateQualityLinkRequest {
    #[validate(length(min = 1, message = "Movie name is required"))]
    pub movie_name: String,
    pub quality_480p: Option<String>,
    pub quality_720p: Option<String>,
    pub quality_1080p: Option<String>,
    #[serde(default = "default_true")]
    pub ads_enabled: bool,
}

impl CreateQualityLinkRequest {
    pub fn qualities(&self) -> QualityUrls {
        QualityUrls {
            quality_480p: clean_url(self.quality_480p.clone()),
            quality_720p: clean_url(self.quality_720p.clone()),
            quality_1080p: clean_url(self.quality_1080p.clone()),
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct CreateEpisodeSeriesRequest {
    #[validate(length(min = 1, message = "Series name is required"))]
    pub series_name: String,
    pub start_from_episode: i32,
    pub episodes: Vec<QualityUrls>,
    #[serde(default = "default_true")]
    pub ads_enabled: bool,
}

impl CreateEpisodeSeriesRequest {
    pub fn episodes(&self) -> Vec<QualityUrls> {
        self.episodes
            .iter()
            .map(|entry| QualityUrls {
                quality_480p: clean_url(entry.quality_480p.clone()),
                quality_720p: clean_url(entry.quality_720p.clone()),
                quality_1080p: clean_url(entry.quality_1080p.clone()),
            })
            .collect()
    }
}

#[derive(Deserialize, Validate)]
pub struct CreateEpisodeZipRequest {
    #[validate(length(min = 1, message = "Movie name is required"))]
    pub movie_name: String,
    pub from_episode: i32,
    pub to_episode: i32,
    pub quality_480p: Option<String>,
    pub quality_720p: Option<String>,
    pub quality_1080p: Option<String>,
    #[serde(default = "default_true")]
    pub ads_enabled: bool,
}

impl CreateEpisodeZipRequest {
    pub fn qualities(&self) -> QualityUrls {
        QualityUrls {
            quality_480p: clean_url(self.quality_480p.clone()),
            quality_720p: clean_url(self.quality_720p.clone()),
            quality_1080p: clean_url(self.quality_1080p.clone()),
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateMovieLinkRequest {
    pub movie_name: Option<String>,
    pub original_link: Option<String>,
    pub ads_enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateQualityLinkRequest {
    pub movie_name: Option<String>,
    #[serde(default, deserialize_with = "patch_url")]
    pub quality_480p: UrlPatch,
    #[serde(default, deserialize_with = "patch_url")]
    pub quality_720p: UrlPatch,
    #[serde(default, deserialize_with = "patch_url")]
    pub quality_1080p: UrlPatch,
    pub ads_enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateEpisodeSeriesRequest {
    pub series_name: Option<String>,
    pub start_from_episode: Option<i32>,
    pub episodes: Option<Vec<QualityUrls>>,
    pub ads_enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateEpisodeZipRequest {
    pub movie_name: Option<String>,
    pub from_episode: Option<i32>,
    pub to_episode: Option<i32>,
    #[serde(default, deserialize_with = "patch_url")]
    pub quality_480p: UrlPatch,
    #[serde(default, deserialize_with = "patch_url")]
    pub quality_720p: UrlPatch,
    #[serde(default, deserialize_with = "patch_url")]
    pub quality_1080p: UrlPatch,
    pub ads_enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct AdClearedRequest {
    pub link_type: LinkKind,
}

/// Response for the token-gated creation endpoints: the freshly
/// allocated code plus the public short URL.
#[derive(Serialize)]
pub struct CreatedLinkResponse {
    pub short_url: String,
    pub short_code: String,
    pub kind: LinkKind,
    pub name: String,
    pub ads_enabled: bool,
}

fn id_hex(id: Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

#[derive(Serialize)]
pub struct MovieLinkResponse {
    pub id: String,
    pub movie_name: String,
    pub original_link: String,
    pub short_code: String,
    pub views: i64,
    pub ads_enabled: bool,
    pub created_at: i64,
}

impl From<MovieLink> for MovieLinkResponse {
    fn from(link: MovieLink) -> Self {
        Self {
            id: id_hex(link.id),
            movie_name: link.movie_name,
            original_link: link.original_link,
            short_code: link.short_code,
            views: link.views,
            ads_enabled: link.ads_enabled,
            created_at: link.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct QualityLinkResponse {
    pub id: String,
    pub movie_name: String,
    pub short_code: String,
    #[serde(flatten)]
    pub qualities: QualityUrls,
    pub views: i64,
    pub ads_enabled: bool,
    pub created_at: i64,
}

impl From<QualityLink> for QualityLinkResponse {
    fn from(link: QualityLink) -> Self {
        Self {
            id: id_hex(link.id),
            movie_name: link.movie_name,
            short_code: link.short_code,
            qualities: link.qualities,
            views: link.views,
            ads_enabled: link.ads_enabled,
            created_at: link.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct EpisodeSeriesResponse {
    pub id: String,
    pub series_name: String,
    pub short_code: String,
    pub start_from_episode: i32,
    pub episodes: Vec<QualityUrls>,
    pub views: i64,
    pub ads_enabled: bool,
    pub created_at: i64,
}

impl From<EpisodeSeries> for EpisodeSeriesResponse {
    fn from(link: EpisodeSeries) -> Self {
        Self {
            id: id_hex(link.id),
            series_name: link.series_name,
            short_code: link.short_code,
            start_from_episode: link.start_from_episode,
            episodes: link.episodes,
            views: link.views,
            ads_enabled: link.ads_enabled,
            created_at: link.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct EpisodeZipResponse {
    pub id: String,
    pub movie_name: String,
    pub short_code: String,
    pub from_episode: i32,
    pub to_episode: i32,
    #[serde(flatten)]
    pub qualities: QualityUrls,
    pub views: i64,
    pub ads_enabled: bool,
    pub created_at: i64,
}

impl From<EpisodeZip> for EpisodeZipResponse {
    fn from(link: EpisodeZip) -> Self {
        Self {
            id: id_hex(link.id),
            movie_name: link.movie_name,
            short_code: link.short_code,
            from_episode: link.from_episode,
            to_episode: link.to_episode,
            qualities: link.qualities,
            views: link.views,
            ads_enabled: link.ads_enabled,
            created_at: link.created_at,
        }
    }
}
