use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,
    /// 对外可达的基础地址，用于构造支付回调链接
    pub public_base_url: String,

    // Database configuration
    pub database_url: String,
    pub database_namespace: String,
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,

    // Authentication configuration
    pub jwt_secret: String,

    // Frontend URLs
    pub frontend_url: String,
    pub payment_success_redirect: String,
    pub payment_fail_redirect: String,

    // Payment gateway configuration
    pub payment_gateway_url: String,
    pub payment_app_token: String,
    pub payment_app_secret: String,
    pub payment_session_timeout_secs: u64,

    // Background jobs
    pub sweep_interval_secs: u64,
    pub reminder_interval_secs: u64,
    pub reminder_lead_minutes: i64,

    // Rate limiting
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,

    // CORS configuration
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4000".to_string()),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "localhost:8000".to_string()),
            database_namespace: env::var("DATABASE_NAMESPACE")
                .unwrap_or_else(|_| "parkflow".to_string()),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "main".to_string()),
            database_username: env::var("DATABASE_USERNAME")
                .unwrap_or_else(|_| "root".to_string()),
            database_password: env::var("DATABASE_PASSWORD")
                .unwrap_or_else(|_| "root".to_string()),

            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),

            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            payment_success_redirect: env::var("PAYMENT_SUCCESS_REDIRECT")
                .unwrap_or_else(|_| "http://localhost:3000/activation-success".to_string()),
            payment_fail_redirect: env::var("PAYMENT_FAIL_REDIRECT")
                .unwrap_or_else(|_| "http://localhost:3000/activation-error".to_string()),

            payment_gateway_url: env::var("PAYMENT_GATEWAY_URL")
                .unwrap_or_else(|_| "https://developers.flouci.com/api".to_string()),
            payment_app_token: env::var("PAYMENT_APP_TOKEN").unwrap_or_default(),
            payment_app_secret: env::var("PAYMENT_APP_SECRET").unwrap_or_default(),
            payment_session_timeout_secs: env::var("PAYMENT_SESSION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "1200".to_string())
                .parse()?,

            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()?,
            reminder_interval_secs: env::var("REMINDER_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            reminder_lead_minutes: env::var("REMINDER_LEAD_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()?,

            rate_limit_requests: env::var("RATE_LIMIT_REQUESTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,
            rate_limit_window: env::var("RATE_LIMIT_WINDOW")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
