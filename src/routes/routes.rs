use actix_web::web;

use crate::handlers::api_handlers::{
    api_create_episode_series, api_create_episode_zip, api_create_quality_link,
    api_create_short_link,
};
use crate::handlers::auth_handlers::{init_admin, login, update_credentials};
use crate::handlers::health_handlers::health_check;
use crate::handlers::link_handlers::{
    create_episode_series, create_episode_zip, create_movie_link, create_quality_link,
    delete_episode_series, delete_episode_zip, delete_movie_link, delete_quality_link,
    get_episode_series, get_episode_zips, get_movie_links, get_quality_links,
    update_episode_series, update_episode_zip, update_movie_link, update_quality_link,
};
use crate::handlers::resolve_handlers::{record_ad_cleared, resolve_link};
use crate::handlers::token_handlers::{create_token, delete_token, get_tokens, update_token_status};
use crate::middlewares::authmw::JwtAuth;

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Public resolution routes at the root level
    cfg.route("/r/{code}", web::get().to(resolve_link));
    cfg.route("/r/{code}/ad-cleared", web::post().to(record_ad_cleared));
    // Health check - no auth required
    cfg.route("/api/health/check", web::get().to(health_check));
    // Authentication routes - login and first-run bootstrap are open,
    // credential rotation requires a valid session
    cfg.service(
        web::scope("/api/auth")
            .route("/login", web::post().to(login))
            .route("/init", web::post().to(init_admin))
            .service(
                web::resource("/credentials")
                    .wrap(JwtAuth)
                    .route(web::put().to(update_credentials)),
            ),
    );
    // Programmatic creation - gated by scoped API tokens, not JWT
    cfg.route("/api/create-short-link", web::post().to(api_create_short_link));
    cfg.route(
        "/api/create-quality-link",
        web::post().to(api_create_quality_link),
    );
    cfg.route(
        "/api/create-episode-series",
        web::post().to(api_create_episode_series),
    );
    cfg.route(
        "/api/create-episode-zip",
        web::post().to(api_create_episode_zip),
    );
    // Admin panel API - requires authentication
    cfg.service(
        web::scope("/api")
            .wrap(JwtAuth)
            .route("/movie-links", web::get().to(get_movie_links))
            .route("/movie-links", web::post().to(create_movie_link))
            .route("/movie-links/{id}", web::patch().to(update_movie_link))
            .route("/movie-links/{id}", web::delete().to(delete_movie_link))
            .route("/quality-links", web::get().to(get_quality_links))
            .route("/quality-links", web::post().to(create_quality_link))
            .route("/quality-links/{id}", web::patch().to(update_quality_link))
            .route(
                "/quality-links/{id}",
                web::delete().to(delete_quality_link),
            )
            .route("/episode-series", web::get().to(get_episode_series))
            .route("/episode-series", web::post().to(create_episode_series))
            .route(
                "/episode-series/{id}",
                web::patch().to(update_episode_series),
            )
            .route(
                "/episode-series/{id}",
                web::delete().to(delete_episode_series),
            )
            .route("/episode-zips", web::get().to(get_episode_zips))
            .route("/episode-zips", web::post().to(create_episode_zip))
            .route("/episode-zips/{id}", web::patch().to(update_episode_zip))
            .route("/episode-zips/{id}", web::delete().to(delete_episode_zip))
            .route("/tokens", web::get().to(get_tokens))
            .route("/tokens", web::post().to(create_token))
            .route("/tokens/{id}", web::patch().to(update_token_status))
            .route("/tokens/{id}", web::delete().to(delete_token)),
    );
}
