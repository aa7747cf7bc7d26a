use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::database::DocumentStore;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
    pub store: String,
}

pub async fn health_check(store: web::Data<dyn DocumentStore>) -> HttpResponse {
    let (healthy, store_status) = match store.ping().await {
        Ok(()) => (true, "connected".to_string()),
        Err(e) => {
            log::error!("❌ Health check: store unreachable: {}", e);
            (false, "unreachable".to_string())
        }
    };

    let body = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        service: "recipe-catalog".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        store: store_status,
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
