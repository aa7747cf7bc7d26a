pub mod auth;
pub mod health;
pub mod recipes;

use actix_web::web;

use crate::middleware::AuthMiddleware;
use crate::utils::AppError;

/// Registers every route plus the extractor configs that turn malformed
/// JSON bodies and query strings into `AppError` responses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation(format!("Invalid JSON body: {}", err)).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(format!("Invalid query string: {}", err)).into()),
    )
    .route("/health", web::get().to(health::health_check))
    .route("/users/login", web::post().to(auth::login))
    .service(
        web::resource("/Recipes")
            .route(web::get().to(recipes::list_recipes))
            .route(web::post().to(recipes::create_recipe)),
    )
    // Reads are public; PUT/DELETE need a bearer token
    .service(
        web::resource("/Recipes/{key}")
            .wrap(AuthMiddleware)
            .route(web::get().to(recipes::get_recipe))
            .route(web::put().to(recipes::update_recipe))
            .route(web::delete().to(recipes::delete_recipe)),
    );
}
