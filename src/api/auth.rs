use actix_web::{web, HttpResponse, ResponseError};

use crate::config::JwtSettings;
use crate::database::DocumentStore;
use crate::services::auth_service::{self, LoginRequest};

/// POST /users/login - exchanges email/password for a bearer token
pub async fn login(
    store: web::Data<dyn DocumentStore>,
    settings: web::Data<JwtSettings>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /users/login - email: {}", request.email);

    match auth_service::login(store.get_ref(), &settings, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", request.email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            e.error_response()
        }
    }
}
