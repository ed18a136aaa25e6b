use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub links: LinkConfig,
    pub display: DisplayConfig,
    pub sessions: SessionConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки удалённого API helpdesk
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub login_path: String,
}

// Настройки опроса списка заявок
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    pub interval_seconds: u64,
}

// Публичный адрес консоли, на него ведут ссылки для терминалов
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    pub public_base_url: String,
}

// Настройки отображения дат
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    pub utc_offset_minutes: i32,
}

// Время жизни неактивной сессии консоли
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Собирает конфигурацию из значений по умолчанию и переменных `HELPDESK_*`.
    ///
    /// Вложенность задаётся через `__`: `HELPDESK_API__BASE_URL`,
    /// `HELPDESK_POLLING__INTERVAL_SECONDS`. `RUST_LOG` перекрывает `app.rust_log`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000_i64)?
            .set_default("app.environment", "development")?
            .set_default("app.rust_log", "helpdesk_console=debug,tower_http=debug")?
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.timeout_seconds", 10_i64)?
            .set_default("api.login_path", "/api/login/")?
            .set_default("polling.interval_seconds", 5_i64)?
            .set_default("links.public_base_url", "http://localhost:3000")?
            .set_default("display.utc_offset_minutes", 0_i64)?
            .set_default("sessions.ttl_seconds", 8 * 3600_i64)?
            .add_source(
                config::Environment::with_prefix("HELPDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(filter) = env::var("RUST_LOG") {
            builder = builder.set_override("app.rust_log", filter)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::Invalid(format!("api.base_url: {}", e)))?;
        reqwest::Url::parse(&self.links.public_base_url)
            .map_err(|e| ConfigError::Invalid(format!("links.public_base_url: {}", e)))?;

        if !self.api.login_path.starts_with('/') {
            return Err(ConfigError::Invalid(
                "api.login_path must start with '/'".to_string(),
            ));
        }
        if self.polling.interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "polling.interval_seconds must be greater than zero".to_string(),
            ));
        }
        if self.sessions.ttl_seconds == 0 {
            return Err(ConfigError::Invalid(
                "sessions.ttl_seconds must be greater than zero".to_string(),
            ));
        }
        if self.display.checked_offset().is_none() {
            return Err(ConfigError::Invalid(format!(
                "display.utc_offset_minutes out of range: {}",
                self.display.utc_offset_minutes
            )));
        }
        Ok(())
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl DisplayConfig {
    pub fn offset(&self) -> FixedOffset {
        self.checked_offset().unwrap_or_else(|| Utc.fix())
    }

    fn checked_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }
}
