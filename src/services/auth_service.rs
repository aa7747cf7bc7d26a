use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, from_document};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::JwtSettings,
    database::DocumentStore,
    models::{User, USERS_COLLECTION},
    utils::AppError,
};

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // email
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub fn generate_token(settings: &JwtSettings, email: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(settings.expiry_minutes)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        aud: settings.audience.clone(),
        iss: settings.issuer.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AppError::Config(format!("Failed to generate token: {}", e)))
}

/// Checks signature, expiry, issuer and audience
pub fn verify_token(settings: &JwtSettings, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[settings.audience.as_str()]);
    validation.set_issuer(&[settings.issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

pub async fn login(
    store: &dyn DocumentStore,
    settings: &JwtSettings,
    request: &LoginRequest,
) -> Result<LoginResponse, AppError> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let document = store
        .find_one(USERS_COLLECTION, doc! { "email": request.email.as_str() })
        .await?
        .ok_or_else(invalid)?;

    // A user record without a usable password can never log in
    let user: User = from_document(document).map_err(|_| invalid())?;
    if user.password != request.password {
        return Err(invalid());
    }

    Ok(LoginResponse {
        success: true,
        token: generate_token(settings, &user.email)?,
        token_type: "Bearer".to_string(),
        expires_in: settings.expiry_minutes * 60,
    })
}
