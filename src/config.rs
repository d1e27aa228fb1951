use crate::errors::{ServiceError, ServiceResult};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://municipal.db?mode=rwc";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

/// Runtime settings for the report server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub max_connections: u32,
    /// Operator-configured browser executable
    pub browser_executable: Option<PathBuf>,
    /// Root of the managed-browser cache
    pub browser_cache_dir: Option<PathBuf>,
    pub render_timeout: Duration,
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> ServiceResult<T>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ServiceError::Configuration(format!("Invalid {} '{}': {}", name, value, e))),
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> ServiceResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. Blank
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("REPORTS_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|e| {
            ServiceError::Configuration(format!("Invalid REPORTS_BIND_ADDR '{}': {}", bind_addr, e))
        })?;

        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ServiceError::Configuration("DATABASE_MAX_CONNECTIONS must be at least 1".to_string()));
        }

        let timeout_secs = parse_var("RENDER_TIMEOUT_SECS", get("RENDER_TIMEOUT_SECS"), DEFAULT_RENDER_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ServiceError::Configuration("RENDER_TIMEOUT_SECS must be at least 1".to_string()));
        }

        let browser_executable = get("PUPPETEER_EXECUTABLE_PATH")
            .or_else(|| get("CHROME_PATH"))
            .map(PathBuf::from);

        let browser_cache_dir = get("BROWSER_CACHE_DIR")
            .map(PathBuf::from)
            .or_else(|| get("HOME").map(|home| PathBuf::from(home).join(".cache").join("puppeteer")));

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections,
            browser_executable,
            browser_cache_dir,
            render_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
