use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageKind::Postgres),
            "memory" => Ok(StorageKind::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Limits the survey service needs. Passed to it explicitly.
#[derive(Debug, Clone, Copy)]
pub struct SurveySettings {
    pub code_max_attempts: u32,
    pub create_max_attempts: u32,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            code_max_attempts: 1000,
            create_max_attempts: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub json_logs: bool,
    pub survey: SurveySettings,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let storage: StorageKind = get_env_or("STORAGE", StorageKind::Postgres)?;
        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageKind::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "Missing environment variable: DATABASE_URL".to_string(),
            ));
        }

        let defaults = SurveySettings::default();
        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            storage,
            database_url,
            jwt_secret: get_env("JWT_SECRET")?,
            db_max_connections: get_env_or("DB_MAX_CONNECTIONS", 10)?,
            db_acquire_timeout_secs: get_env_or("DB_ACQUIRE_TIMEOUT_SECS", 30)?,
            request_timeout_secs: get_env_or("REQUEST_TIMEOUT_SECS", 15)?,
            json_logs: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            survey: SurveySettings {
                code_max_attempts: get_env_or("CODE_MAX_ATTEMPTS", defaults.code_max_attempts)?,
                create_max_attempts: get_env_or(
                    "CREATE_MAX_ATTEMPTS",
                    defaults.create_max_attempts,
                )?,
            },
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
