use std::env;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use dotenv::dotenv;
use env_logger::Env;

use moviezone::db::mongodb::{ensure_indexes, get_database};
use moviezone::routes::init_routes;
use moviezone::state::app_state::AppState;
use moviezone::storage::{MongoStorage, Storage};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    let port_string = env::var("PORT").expect("PORT not set.");
    let port = port_string.parse::<u16>().unwrap();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // Initialize the database connection
    let db = match get_database().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error connecting to the database: {}", e);
            std::process::exit(1);
        }
    };

    // The unique indexes back the allocator and the session upsert.
    if let Err(e) = ensure_indexes(&db).await {
        eprintln!("Error creating indexes: {}", e);
        std::process::exit(1);
    }

    let storage: Arc<dyn Storage> = Arc::new(MongoStorage::new(db));

    // Periodic sweep of expired ad-view sessions. Lookups re-check
    // expiry themselves, so this only reclaims space; failures are
    // logged and the next tick tries again.
    {
        let storage = Arc::clone(&storage);
        actix_web::rt::spawn(async move {
            let mut interval = actix_web::rt::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                match storage.purge_expired_sessions().await {
                    Ok(0) => {}
                    Ok(purged) => log::debug!("purged {} expired ad-view sessions", purged),
                    Err(e) => log::warn!("session purge failed: {}", e),
                }
            }
        });
    }

    // Create shared state
    let app_state = web::Data::new(AppState::new(storage));

    // Start the Actix Web server
    HttpServer::new(move || {
        // Create a logger with a custom format instead
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        // Enable CORS for the admin panel dev servers
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:4173")
            .allowed_methods(vec!["GET", "POST", "PATCH", "PUT", "DELETE"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .max_age(3600);
        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(init_routes)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
