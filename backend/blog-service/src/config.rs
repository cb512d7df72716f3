/// Configuration management for Blog Service
///
/// Everything is read from environment variables (a `.env` file is loaded
/// by `main` beforehand). Pool tuning lives in the `db-pool` crate.
use crate::services::DEFAULT_POSTS_PER_PAGE;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub blog: BlogConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// RS256 key material for the access tokens
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub public_key_pem: Option<String>,
    /// Without it the service validates tokens but cannot sign up or log in users
    pub private_key_pem: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("public_key_pem", &self.public_key_pem.is_some())
            .field("private_key_pem", &self.private_key_pem.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Page size of every post listing
    pub posts_per_page: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("BLOG_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("BLOG_SERVICE_PORT", 8080)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/yatube".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            auth: {
                let public_key_pem = non_empty_env("JWT_PUBLIC_KEY_PEM");
                if production && public_key_pem.is_none() {
                    return Err("JWT_PUBLIC_KEY_PEM must be set in production".to_string());
                }

                AuthConfig {
                    public_key_pem,
                    private_key_pem: non_empty_env("JWT_PRIVATE_KEY_PEM"),
                }
            },
            blog: {
                let posts_per_page =
                    parse_env_or_default("POSTS_PER_PAGE", DEFAULT_POSTS_PER_PAGE)?;
                if posts_per_page <= 0 {
                    return Err(format!(
                        "POSTS_PER_PAGE must be positive, got {}",
                        posts_per_page
                    ));
                }

                BlogConfig { posts_per_page }
            },
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        // PEMs passed through env files often carry escaped newlines
        .map(|v| v.replace("\\n", "\n"))
        .filter(|v| !v.trim().is_empty())
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
