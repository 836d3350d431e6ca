use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub github: GithubConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub frontend_url: String,
    pub backend_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub max_request_size_bytes: usize,
    pub default_page_size: i64,
    pub default_user_page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub api_url: String,
    pub oauth_url: String,
    pub user_agent: String,
}

/// Where uploaded logos, screenshots and avatars are written and served from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: String,
    pub public_path: String,
    pub max_file_bytes: usize,
    pub max_project_images: usize,
}

impl GithubConfig {
    /// OAuth login is only offered when both client credentials are present.
    pub fn oauth_enabled(&self) -> bool {
        matches!(
            (self.client_id.as_deref(), self.client_secret.as_deref()),
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty()
        )
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").or_else(|_| env::var("NODE_ENV")).as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.server.frontend_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("BACKEND_URL") {
            self.server.backend_url = v.trim_end_matches('/').to_string();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs = v.parse().unwrap_or(self.api.rate_limit_window_secs);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            let origin = v.trim_end_matches('/').to_string();
            if !self.security.cors_origins.contains(&origin) {
                self.security.cors_origins.push(origin);
            }
        }

        // GitHub overrides
        if let Ok(v) = env::var("GITHUB_TOKEN") {
            self.github.token = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("GITHUB_CLIENT_ID") {
            self.github.client_id = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("GITHUB_CLIENT_SECRET") {
            self.github.client_secret = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("GITHUB_API_URL") {
            self.github.api_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("GITHUB_OAUTH_URL") {
            self.github.oauth_url = v.trim_end_matches('/').to_string();
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            if !v.trim().is_empty() {
                self.uploads.dir = v;
            }
        }
        if let Ok(v) = env::var("UPLOAD_MAX_FILE_BYTES") {
            self.uploads.max_file_bytes = v.parse().unwrap_or(self.uploads.max_file_bytes);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 5000,
                frontend_url: "http://localhost:3000".to_string(),
                backend_url: "http://localhost:5000".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_rate_limiting: false,
                rate_limit_requests: 1000,
                rate_limit_window_secs: 15 * 60,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                default_page_size: 12,
                default_user_page_size: 20,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_cost: 12,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:3001".to_string(),
                ],
            },
            github: GithubConfig::defaults(),
            uploads: UploadConfig::defaults(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 5000,
                frontend_url: "https://staging.gitxcollab.vercel.app".to_string(),
                backend_url: "http://localhost:5000".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 100,
                rate_limit_window_secs: 15 * 60,
                max_request_size_bytes: 10 * 1024 * 1024,
                default_page_size: 12,
                default_user_page_size: 20,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                bcrypt_cost: 12,
                cors_origins: vec!["https://staging.gitxcollab.vercel.app".to_string()],
            },
            github: GithubConfig::defaults(),
            uploads: UploadConfig::defaults(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 5000,
                frontend_url: "https://gitxcollab.vercel.app".to_string(),
                backend_url: "http://localhost:5000".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 100,
                rate_limit_window_secs: 15 * 60,
                max_request_size_bytes: 10 * 1024 * 1024,
                default_page_size: 12,
                default_user_page_size: 20,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                bcrypt_cost: 12,
                cors_origins: vec!["https://gitxcollab.vercel.app".to_string()],
            },
            github: GithubConfig::defaults(),
            uploads: UploadConfig::defaults(),
        }
    }
}

impl GithubConfig {
    fn defaults() -> Self {
        Self {
            token: None,
            client_id: None,
            client_secret: None,
            api_url: "https://api.github.com".to_string(),
            oauth_url: "https://github.com".to_string(),
            user_agent: format!("collab-api-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl UploadConfig {
    fn defaults() -> Self {
        Self {
            dir: "uploads".to_string(),
            public_path: "/uploads".to_string(),
            max_file_bytes: 5 * 1024 * 1024, // 5MB
            max_project_images: 5,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.security.bcrypt_cost, 12);
        assert_eq!(config.api.default_page_size, 12);
        assert!(!config.api.enable_rate_limiting);
        assert!(config.database.run_migrations);
        assert_eq!(config.uploads.public_path, "/uploads");
        assert_eq!(config.uploads.max_project_images, 5);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.api.enable_rate_limiting);
        assert_eq!(config.api.rate_limit_requests, 100);
        assert_eq!(config.api.rate_limit_window_secs, 900);
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn oauth_requires_both_credentials() {
        let mut github = GithubConfig::defaults();
        assert!(!github.oauth_enabled());

        github.client_id = Some("id".to_string());
        assert!(!github.oauth_enabled());

        github.client_secret = Some(String::new());
        assert!(!github.oauth_enabled());

        github.client_secret = Some("secret".to_string());
        assert!(github.oauth_enabled());
    }

    #[test]
    fn secrets_are_not_serialized() {
        let mut config = AppConfig::development();
        config.security.jwt_secret = "top-secret".to_string();
        let value = serde_json::to_value(&config).unwrap();
        assert!(value["security"].get("jwt_secret").is_none());
        assert!(value["database"].get("url").is_none());
    }
}
