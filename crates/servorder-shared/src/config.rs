//! Configuration management

use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_COUNTRY_CODE, DEFAULT_REFRESH_TOKEN_EXPIRY,
    MIN_JWT_SECRET_LENGTH,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    #[serde(default)]
    pub whatsapp: WhatsAppSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub bootstrap: BootstrapSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SecuritySettings {
    pub login_attempts_per_minute: u32,
    /// Minimum zxcvbn score (0-4) accepted for new passwords.
    pub min_password_score: u8,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            login_attempts_per_minute: 10,
            min_password_score: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WhatsAppSettings {
    pub enabled: bool,
    pub base_url: String,
    pub instance_id: String,
    pub token: String,
    pub client_token: Option<String>,
    pub default_country_code: String,
    pub timeout_secs: u64,
    /// Message template overrides keyed by order status (`in_progress`, `paid`, ...).
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

impl Default for WhatsAppSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.z-api.io".to_string(),
            instance_id: String::new(),
            token: String::new(),
            client_token: None,
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
            timeout_secs: 10,
            templates: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub directory: Option<String>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            directory: None,
            file_prefix: "servorder".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapSettings {
    pub super_admin_email: Option<String>,
    pub super_admin_password: Option<String>,
    pub super_admin_name: Option<String>,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_acquire_timeout() -> u64 {
    3
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("app.cors_origins"),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn builder() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "servorder-server")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("jwt.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("jwt.refresh_token_expiry", DEFAULT_REFRESH_TOKEN_EXPIRY)
    }

    /// Rejects settings that deserialize fine but cannot run.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::InvalidConfig(format!(
                "jwt.secret must be at least {} bytes",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        if self.jwt.access_token_expiry <= 0 || self.jwt.refresh_token_expiry <= 0 {
            return Err(AppError::InvalidConfig(
                "jwt token expiries must be positive".to_string(),
            ));
        }

        if self.security.min_password_score > 4 {
            return Err(AppError::InvalidConfig(
                "security.min_password_score must be between 0 and 4".to_string(),
            ));
        }

        if self.whatsapp.enabled
            && (self.whatsapp.instance_id.is_empty() || self.whatsapp.token.is_empty())
        {
            return Err(AppError::InvalidConfig(
                "whatsapp.instance_id and whatsapp.token are required when whatsapp is enabled"
                    .to_string(),
            ));
        }

        let bootstrap = &self.bootstrap;
        if bootstrap.super_admin_email.is_some() != bootstrap.super_admin_password.is_some() {
            return Err(AppError::InvalidConfig(
                "bootstrap.super_admin_email and bootstrap.super_admin_password must be set together"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
