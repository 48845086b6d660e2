use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod config;
mod controllers;
mod db;
mod models;
mod notes;

use config::Config;
use db::Database;
use notes::NoteStore;

pub struct AppState {
    pub db: Arc<Database>,
    pub store: Arc<NoteStore>,
    /// Server start time for uptime reporting
    pub started_at: std::time::Instant,
}

/// SPA fallback handler - serves index.html for client-side routing
/// (`/`, `/share/:id`, `/auth`, and the catch-all not-found page)
async fn spa_fallback() -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(
        config::frontend_dist_dir().join("index.html"),
    )?)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    log::info!("Pocketnotes v{}", controllers::health::VERSION);

    let config = Config::from_env();
    let port = config.port;

    config::initialize_data_dir()?;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).expect("Failed to initialize database");
    let db = Arc::new(db);

    let store = Arc::new(NoteStore::new(config::notes_store_path()));

    let state = web::Data::new(AppState {
        db,
        store,
        started_at: std::time::Instant::now(),
    });

    let frontend_dist = config::frontend_dist_dir();
    if !frontend_dist.join("index.html").exists() {
        log::warn!(
            "Frontend dist not found at {:?} - only the JSON API will be served",
            frontend_dist
        );
    }

    log::info!("Listening on 0.0.0.0:{}", port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(controllers::health::config_routes)
            .configure(controllers::auth::config)
            .configure(controllers::notes::config)
            .configure(controllers::share::config)
            .service(
                Files::new("/", config::frontend_dist_dir())
                    .index_file("index.html"),
            )
            .default_service(web::get().to(spa_fallback))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
