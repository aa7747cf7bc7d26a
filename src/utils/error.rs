use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Malformed or incomplete client input (400)
    Validation {
        message: String,
        missing_fields: Vec<String>,
    },
    Conflict(String),
    NotFound(String),
    Unauthorized(String),
    DatabaseError(String),
    Config(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            missing_fields: Vec::new(),
        }
    }

    pub fn missing_fields(fields: Vec<String>) -> Self {
        AppError::Validation {
            message: format!("Missing required fields: {}", fields.join(", ")),
            missing_fields: fields,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. } => message,
            AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::DatabaseError(msg)
            | AppError::Config(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation { message, .. } => write!(f, "Invalid request: {}", message),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = serde_json::json!({
            "success": false,
            "error": self.message(),
        });

        if let AppError::Validation { missing_fields, .. } = self {
            if !missing_fields.is_empty() {
                body["missing_fields"] = serde_json::json!(missing_fields);
            }
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
