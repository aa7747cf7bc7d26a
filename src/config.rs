use crate::utils::AppError;

const DEV_JWT_SECRET: &str = "recipe-catalog-dev-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDB,
    Memory,
}

/// Token signing settings, shared with the auth middleware through `web::Data`
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub database_name: String,
    pub jwt: JwtSettings,
    pub cors_allowed_origins: Vec<String>,
    pub seed_user: Option<(String, String)>,
}

impl Config {
    /// Reads configuration from the process environment (after `dotenv`)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "5000")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("PORT is not a valid port: {}", e)))?;

        let store_backend = match var("STORE_BACKEND", "mongodb").to_lowercase().as_str() {
            "mongodb" | "mongo" => StoreBackend::MongoDB,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::Config(format!(
                    "Unknown STORE_BACKEND '{}'. Supported: mongodb, memory",
                    other
                )))
            }
        };

        let secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if store_backend == StoreBackend::Memory => {
                log::warn!("⚠️  JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
            _ => return Err(AppError::Config("JWT_SECRET must be set".to_string())),
        };

        let expiry_minutes = var("JWT_EXPIRY_MINUTES", "60")
            .parse::<i64>()
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| {
                AppError::Config("JWT_EXPIRY_MINUTES must be a positive integer".to_string())
            })?;

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let seed_user = match (lookup("SEED_USER_EMAIL"), lookup("SEED_USER_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "SEED_USER_EMAIL and SEED_USER_PASSWORD must be set together".to_string(),
                ))
            }
        };

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            store_backend,
            database_url: var("DATABASE_URL", "mongodb://localhost:27017"),
            database_name: var("DATABASE_NAME", "RecAPI"),
            jwt: JwtSettings {
                secret,
                issuer: var("JWT_ISSUER", "recipe-catalog"),
                audience: var("JWT_AUDIENCE", "recipe-api"),
                expiry_minutes,
            },
            cors_allowed_origins,
            seed_user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, AppError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("JWT_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.store_backend, StoreBackend::MongoDB);
        assert_eq!(config.database_name, "RecAPI");
        assert_eq!(config.jwt.expiry_minutes, 60);
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
        assert!(config.seed_user.is_none());
    }

    #[test]
    fn test_mongodb_backend_requires_secret() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_memory_backend_falls_back_to_dev_secret() {
        let config = config_from(&[("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.jwt.secret, DEV_JWT_SECRET);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("JWT_SECRET", "x"), ("PORT", "http")]).is_err());
        assert!(config_from(&[("JWT_SECRET", "x"), ("JWT_EXPIRY_MINUTES", "0")]).is_err());
        assert!(config_from(&[("JWT_SECRET", "x"), ("STORE_BACKEND", "redis")]).is_err());
        assert!(config_from(&[("JWT_SECRET", "x"), ("SEED_USER_EMAIL", "a@b.c")]).is_err());
    }

    #[test]
    fn test_origins_and_seed_user() {
        let config = config_from(&[
            ("JWT_SECRET", "x"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("SEED_USER_EMAIL", "chef@desserts.test"),
            ("SEED_USER_PASSWORD", "pavlova"),
        ])
        .unwrap();

        assert_eq!(config.cors_allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(
            config.seed_user,
            Some(("chef@desserts.test".to_string(), "pavlova".to_string()))
        );
    }
}
