use std::env;
use std::fmt;
use std::path::PathBuf;

use dotenvy::dotenv;
use subtle::ConstantTimeEq;
use todo_core::{BackendKind, StorageConfig, DEFAULT_SQLITE_PATH};

use crate::errors::ApplicationError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

/// Allowed CORS origins
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsOrigins {
    #[default]
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// `*` or a comma-separated list
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value == "*" {
            return CorsOrigins::Any;
        }

        CorsOrigins::List(
            value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthCredentials {
    pub username: String,
    pub password: String,
}

impl BasicAuthCredentials {
    /// Compares both fields in constant time; only a length mismatch is observable
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let username = self.username.as_bytes().ct_eq(username.as_bytes());
        let password = self.password.as_bytes().ct_eq(password.as_bytes());
        (username & password).into()
    }
}

impl fmt::Debug for BasicAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Process-wide settings, read once at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub storage: StorageConfig,
    pub cors_allow_origins: CorsOrigins,
    /// `Some` when the todo routes require HTTP basic auth
    pub basic_auth: Option<BasicAuthCredentials>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage: StorageConfig::Memory,
            cors_allow_origins: CorsOrigins::Any,
            basic_auth: None,
        }
    }
}

impl Settings {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ApplicationError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApplicationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = var("TODO_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("TODO_PORT") {
            Some(port) => port.parse::<u16>().map_err(|e| {
                ApplicationError::Config(format!("TODO_PORT `{port}` is not a valid port: {e}"))
            })?,
            None => DEFAULT_PORT,
        };

        let backend = match var("PERSISTENCE_BACKEND") {
            Some(backend) => backend
                .parse::<BackendKind>()
                .map_err(ApplicationError::Config)?,
            None => BackendKind::Memory,
        };
        let storage = match backend {
            BackendKind::Memory => StorageConfig::Memory,
            BackendKind::Sqlite => StorageConfig::Sqlite {
                path: PathBuf::from(
                    var("SQLITE_DB_PATH").unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string()),
                ),
            },
        };

        let cors_allow_origins = var("CORS_ALLOW_ORIGINS")
            .map(|origins| CorsOrigins::parse(&origins))
            .unwrap_or_default();

        let basic_auth = if var("ENABLE_BASIC_AUTH").is_some_and(|flag| is_truthy(&flag)) {
            match (var("BASIC_AUTH_USERNAME"), var("BASIC_AUTH_PASSWORD")) {
                (Some(username), Some(password)) => Some(BasicAuthCredentials { username, password }),
                _ => {
                    return Err(ApplicationError::Config(
                        "ENABLE_BASIC_AUTH is set but BASIC_AUTH_USERNAME or BASIC_AUTH_PASSWORD is missing"
                            .to_string(),
                    ))
                }
            }
        } else {
            None
        };

        Ok(Settings {
            host,
            port,
            storage,
            cors_allow_origins,
            basic_auth,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
