mod api;
mod config;
mod database;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;

use config::{Config, StoreBackend};
use database::{DocumentStore, MemoryStore, MongoDB};

fn startup_error(err: utils::AppError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;

    log::info!("🚀 Starting Recipe Catalog...");

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::MongoDB => {
            log::info!("📊 Database: {} / {}", config.database_url, config.database_name);
            let db = MongoDB::new(&config.database_url, &config.database_name)
                .await
                .map_err(startup_error)?;
            log::info!("✅ MongoDB connected successfully");
            Arc::new(db)
        }
        StoreBackend::Memory => {
            log::warn!("🧪 Using in-memory store, data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    if let Some((email, password)) = &config.seed_user {
        seeds::users_seed::seed_default_user(store.as_ref(), email, password).await;
    }

    let store_data: web::Data<dyn DocumentStore> = web::Data::from(store);
    let jwt_data = web::Data::new(config.jwt.clone());
    let origins = config.cors_allowed_origins.clone();

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .max_age(3600);

        App::new()
            .app_data(store_data.clone())
            .app_data(jwt_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
