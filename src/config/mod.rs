use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::models::cinema::SEAT_LIMIT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageBackend,
    pub database: Option<DatabaseConfig>,
    pub redis: RedisConfig,
    pub reservation: ReservationConfig,
}

// Настройки приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected pretty or json, got {other}")),
        }
    }
}

// Где хранятся кинозалы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected postgres or memory, got {other}")),
        }
    }
}

// Настройки базы данных
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout_seconds: u64,
}

// Настройки Redis; без REDIS_URL кеш выключен
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub cache_ttl_seconds: u64,
}

// Ограничения бронирования
#[derive(Debug, Clone)]
pub struct ReservationConfig {
    pub max_seats: u32,
    pub max_write_attempts: u32,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            max_seats: 100_000,
            max_write_attempts: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &'static str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let storage: StorageBackend = parse("STORAGE_BACKEND", var("STORAGE_BACKEND", "postgres"))?;

        let database = match storage {
            StorageBackend::Postgres => Some(DatabaseConfig {
                url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                pool_size: parse("DB_POOL_SIZE", var("DB_POOL_SIZE", "20"))?,
                acquire_timeout_seconds: parse("DB_ACQUIRE_TIMEOUT_SECONDS", var("DB_ACQUIRE_TIMEOUT_SECONDS", "5"))?,
            }),
            StorageBackend::Memory => None,
        };

        let reservation = ReservationConfig {
            max_seats: parse("MAX_SEATS", var("MAX_SEATS", "100000"))?,
            max_write_attempts: parse("MAX_WRITE_ATTEMPTS", var("MAX_WRITE_ATTEMPTS", "3"))?,
        };
        if reservation.max_seats == 0 || reservation.max_seats > SEAT_LIMIT {
            return Err(ConfigError::Invalid {
                key: "MAX_SEATS",
                value: reservation.max_seats.to_string(),
                reason: format!("must be between 1 and {SEAT_LIMIT}"),
            });
        }
        if reservation.max_write_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_WRITE_ATTEMPTS",
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }

        let redis = RedisConfig {
            url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            cache_ttl_seconds: parse("CACHE_TTL_SECONDS", var("CACHE_TTL_SECONDS", "60"))?,
        };
        if redis.cache_ttl_seconds == 0 {
            return Err(ConfigError::Invalid {
                key: "CACHE_TTL_SECONDS",
                value: "0".to_string(),
                reason: "cache entries need a positive lifetime".to_string(),
            });
        }

        Ok(Config {
            app: AppConfig {
                host: var("HOST", "0.0.0.0"),
                port: parse("PORT", var("PORT", "3000"))?,
                environment: var("ENVIRONMENT", "development"),
                rust_log: var("RUST_LOG", "cinema_reservations=debug,tower_http=debug"),
                log_format: parse("LOG_FORMAT", var("LOG_FORMAT", "pretty"))?,
            },
            storage,
            database,
            redis,
            reservation,
        })
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
