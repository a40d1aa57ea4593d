use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use huddle_core::AppError;
use tracing_subscriber::EnvFilter;

/// Backing store for group documents and audit events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupStoreConfig {
    Memory,
    Postgres { database_url: String },
}

impl GroupStoreConfig {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres { .. } => "postgres",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub group_store: GroupStoreConfig,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub plugin_permissions_path: Option<PathBuf>,
    pub actor_header: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let group_store = match env::var("GROUP_STORE")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => GroupStoreConfig::Memory,
            "postgres" => GroupStoreConfig::Postgres {
                database_url: required_non_empty_env("DATABASE_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "GROUP_STORE must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };
        if migrate_only && group_store == GroupStoreConfig::Memory {
            return Err(AppError::Validation(
                "the migrate command requires GROUP_STORE=postgres".to_owned(),
            ));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let plugin_permissions_path = env::var("PLUGIN_PERMISSIONS_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let actor_header = env::var("ACTOR_HEADER")
            .ok()
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "x-actor-id".to_owned());

        Ok(Self {
            migrate_only,
            group_store,
            frontend_url,
            api_host,
            api_port,
            plugin_permissions_path,
            actor_header,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
