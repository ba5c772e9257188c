//! API Configuration Module
//!
//! All settings come from `PORTA_*` environment variables with defaults
//! suitable for a single local host. There is no config file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use porta_core::ConfigError;
use porta_gateway::{AccessToken, DEFAULT_SHELL};

/// Port used when neither `PORTA_PORT` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 8111;

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Access
    // ========================================================================
    /// Expected `X-PORTA-TOKEN` value. `None` disables authorization.
    pub token: Option<AccessToken>,

    /// Path prefix served without a token.
    pub public_prefix: String,

    // ========================================================================
    // Server
    // ========================================================================
    pub bind_host: String,
    pub port: u16,

    // ========================================================================
    // Gateway
    // ========================================================================
    /// Base for relative paths and working directory for commands.
    pub workdir: PathBuf,
    pub shell: String,
    pub command_timeout: Duration,
    pub pipeline_timeout: Duration,
    /// Upper bound for caller-supplied pipeline timeouts.
    pub max_timeout: Duration,

    // ========================================================================
    // Ledger
    // ========================================================================
    pub ledger_path: PathBuf,
    pub ledger_map_size_mb: usize,

    // ========================================================================
    // Assets
    // ========================================================================
    pub static_dir: PathBuf,
    pub public_url_file: PathBuf,

    // ========================================================================
    // CORS
    // ========================================================================
    /// Allowed origins. Empty means allow all.
    pub cors_origins: Vec<String>,
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: None,
            public_prefix: "/static".to_string(),
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            workdir: PathBuf::from("."),
            shell: DEFAULT_SHELL.to_string(),
            command_timeout: Duration::from_secs(30),
            pipeline_timeout: Duration::from_secs(30),
            max_timeout: Duration::from_secs(300),
            ledger_path: PathBuf::from(".porta/ledger"),
            ledger_map_size_mb: 256,
            static_dir: PathBuf::from("static"),
            public_url_file: PathBuf::from("ngrok.url"),
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// - `PORTA_TOKEN`: expected token (unset or empty = auth disabled)
    /// - `PORTA_BIND`: bind host (default: 0.0.0.0)
    /// - `PORTA_PORT` or `PORT`: bind port (default: 8111)
    /// - `PORTA_WORKDIR`: base directory (default: process cwd)
    /// - `PORTA_LEDGER_PATH`, `PORTA_LEDGER_MAP_SIZE_MB`
    /// - `PORTA_SHELL`: interpreter (default: /bin/sh)
    /// - `PORTA_COMMAND_TIMEOUT_SECS`, `PORTA_PIPELINE_TIMEOUT_SECS`,
    ///   `PORTA_MAX_TIMEOUT_SECS`
    /// - `PORTA_PUBLIC_PREFIX`, `PORTA_STATIC_DIR`, `PORTA_PUBLIC_URL_FILE`
    /// - `PORTA_CORS_ORIGINS`: comma-separated (empty = allow all)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let workdir = match get("PORTA_WORKDIR") {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().map_err(|e| ConfigError::InvalidValue {
                field: "PORTA_WORKDIR".to_string(),
                value: "<current dir>".to_string(),
                reason: e.to_string(),
            })?,
        };

        let port = match get("PORTA_PORT").or_else(|| get("PORT")) {
            Some(raw) => parse_value::<u16>("PORTA_PORT", &raw)?,
            None => defaults.port,
        };

        let secs = |key: &str, default: Duration| -> Result<Duration, ConfigError> {
            match get(key) {
                Some(raw) => match parse_value::<u64>(key, &raw)? {
                    0 => Err(ConfigError::InvalidValue {
                        field: key.to_string(),
                        value: raw,
                        reason: "must be at least 1 second".to_string(),
                    }),
                    n => Ok(Duration::from_secs(n)),
                },
                None => Ok(default),
            }
        };

        let cors_origins = get("PORTA_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            token: lookup("PORTA_TOKEN").and_then(AccessToken::new),
            public_prefix: get("PORTA_PUBLIC_PREFIX").unwrap_or(defaults.public_prefix),
            bind_host: get("PORTA_BIND").unwrap_or(defaults.bind_host),
            port,
            workdir,
            shell: get("PORTA_SHELL").unwrap_or(defaults.shell),
            command_timeout: secs("PORTA_COMMAND_TIMEOUT_SECS", defaults.command_timeout)?,
            pipeline_timeout: secs("PORTA_PIPELINE_TIMEOUT_SECS", defaults.pipeline_timeout)?,
            max_timeout: secs("PORTA_MAX_TIMEOUT_SECS", defaults.max_timeout)?,
            ledger_path: get("PORTA_LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ledger_path),
            ledger_map_size_mb: match get("PORTA_LEDGER_MAP_SIZE_MB") {
                Some(raw) => parse_value::<usize>("PORTA_LEDGER_MAP_SIZE_MB", &raw)?,
                None => defaults.ledger_map_size_mb,
            },
            static_dir: get("PORTA_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            public_url_file: get("PORTA_PUBLIC_URL_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_url_file),
            cors_origins,
            cors_max_age_secs: defaults.cors_max_age_secs,
        })
    }

    pub fn is_auth_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Human-readable security mode for the index and `/meta`.
    pub fn security_mode(&self) -> &'static str {
        if self.is_auth_enabled() {
            "X-PORTA-TOKEN authentication enabled"
        } else {
            "authentication disabled"
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "PORTA_BIND".to_string(),
                value: addr.clone(),
                reason: e.to_string(),
            })
    }

    /// Caller-supplied timeout in seconds, clamped to `1..=max_timeout`.
    /// Falls back to the pipeline default when absent.
    pub fn pipeline_step_timeout(&self, requested_secs: Option<u64>) -> Duration {
        match requested_secs {
            Some(secs) => Duration::from_secs(secs.max(1)).min(self.max_timeout),
            None => self.pipeline_timeout.min(self.max_timeout),
        }
    }
}

fn parse_value<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
