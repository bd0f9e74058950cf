//! Environment-driven settings for both services.
//!
//! Values are read through [`mockable::Env`] so tests can drive every
//! branch with a `MockEnv`. Debug builds fall back to development defaults
//! with a warning; release builds refuse to start without the secrets.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use mockable::Env;
use tracing::{info, warn};
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{RateLimitConfig, secret_fingerprint};
use crate::inbound::http::state::directory_url;

mod session;

pub use session::{SessionSettings, session_settings_from_env};

const PORT_ENV: &str = "PORT";
const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
const DEV_ADMIN_API_KEY: &str = "admin-key-123";
const DEV_ADMIN_PASSWORD: &str = "change-me";

/// Build mode for configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing values.
    Debug,
    /// Release builds require explicit secrets.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }

    /// Deployment label reported by health endpoints.
    #[must_use]
    pub const fn environment(self) -> &'static str {
        match self {
            Self::Debug => "development",
            Self::Release => "production",
        }
    }
}

/// Errors raised while validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file exists but is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie setting in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral session keys.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

fn parse_or<E: Env, T: FromStr>(
    env: &E,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match env.string(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv {
                name,
                value,
                expected,
            }),
    }
}

fn path_or<E: Env>(env: &E, name: &str, default: &str) -> PathBuf {
    PathBuf::from(env.string(name).unwrap_or_else(|| default.to_owned()))
}

/// Read a secret, substituting `dev_default` in debug builds only.
fn secret<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    dev_default: &str,
) -> Result<Zeroizing<String>, ConfigError> {
    match env.string(name).filter(|value| !value.is_empty()) {
        Some(value) => Ok(Zeroizing::new(value)),
        None if mode.is_debug() => {
            warn!("{name} not set; using the development default");
            Ok(Zeroizing::new(dev_default.to_owned()))
        }
        None => Err(ConfigError::MissingEnv { name }),
    }
}

fn allowed_origins<E: Env>(env: &E) -> Result<Vec<Url>, ConfigError> {
    let raw = env
        .string(ALLOWED_ORIGINS_ENV)
        .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_owned());
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            Url::parse(origin).map_err(|_| ConfigError::InvalidEnv {
                name: ALLOWED_ORIGINS_ENV,
                value: raw.clone(),
                expected: "comma-separated absolute URLs",
            })
        })
        .collect()
}

fn listen_addr(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Which adapter answers the AI port.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AiProviderKind {
    /// Template stub answers (`fallback` or `template`).
    Template,
    /// The locally trained model served by a child process.
    Local,
}

impl FromStr for AiProviderKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "fallback" | "template" => Ok(Self::Template),
            "local" => Ok(Self::Local),
            _ => Err(()),
        }
    }
}

/// Declared storage backend. Both resolve to the in-memory stores.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DatabaseKind {
    Memory,
    Sqlite,
}

impl FromStr for DatabaseKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(()),
        }
    }
}

/// Where the local model, its scripts and its training data live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelPaths {
    /// Interpreter for the inference and training scripts.
    pub python: String,
    /// Inference server script.
    pub inference_script: PathBuf,
    /// Trained model handed to the inference script.
    pub model_path: PathBuf,
    /// Directory holding `data_collector.py` and `model_trainer.py`.
    pub training_dir: PathBuf,
    /// Directory holding `config.json` and `pytorch_model.bin`.
    pub model_dir: PathBuf,
}

impl ModelPaths {
    fn from_env<E: Env>(env: &E) -> Self {
        Self {
            python: env.string("PYTHON_BIN").unwrap_or_else(|| "python3".to_owned()),
            inference_script: path_or(env, "LOCAL_AI_SCRIPT", "ai-training/inference_server.py"),
            model_path: path_or(
                env,
                "LOCAL_AI_MODEL_PATH",
                "ai-training/models/veterinary-ai-model",
            ),
            training_dir: path_or(env, "TRAINING_DIR", "ai-training"),
            model_dir: path_or(env, "MODEL_DIR", "ai-training/models"),
        }
    }
}

/// Settings of the veterinary bot service.
pub struct VetBotConfig {
    pub bind_addr: SocketAddr,
    /// Key expected in `x-api-key` on admin routes.
    pub admin_api_key: Zeroizing<String>,
    pub allowed_origins: Vec<Url>,
    pub ai_provider: AiProviderKind,
    pub database: DatabaseKind,
    /// Whether `REDIS_URL` was set. No client is created either way.
    pub redis_configured: bool,
    pub rate_limit: RateLimitConfig,
    pub model: ModelPaths,
    pub mode: BuildMode,
}

impl VetBotConfig {
    /// Read and validate the service settings.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for malformed values, or for a missing
    /// `ADMIN_API_KEY` in release builds.
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, ConfigError> {
        let port = parse_or(env, PORT_ENV, 3001_u16, "a TCP port")?;
        let max_requests = parse_or(env, "RATE_LIMIT_MAX_REQUESTS", 100_u32, "a request count")?;
        let window_secs = parse_or(env, "RATE_LIMIT_WINDOW_SECS", 60_u64, "seconds")?;
        if max_requests == 0 || window_secs == 0 {
            return Err(ConfigError::InvalidEnv {
                name: if max_requests == 0 {
                    "RATE_LIMIT_MAX_REQUESTS"
                } else {
                    "RATE_LIMIT_WINDOW_SECS"
                },
                value: "0".to_owned(),
                expected: "a positive number",
            });
        }
        Ok(Self {
            bind_addr: listen_addr(port),
            admin_api_key: secret(env, mode, "ADMIN_API_KEY", DEV_ADMIN_API_KEY)?,
            allowed_origins: allowed_origins(env)?,
            ai_provider: parse_or(
                env,
                "AI_PROVIDER",
                AiProviderKind::Template,
                "fallback|template|local",
            )?,
            database: parse_or(env, "DATABASE_TYPE", DatabaseKind::Sqlite, "memory|sqlite")?,
            redis_configured: env.string("REDIS_URL").is_some_and(|url| !url.is_empty()),
            rate_limit: RateLimitConfig {
                max_requests,
                window: Duration::from_secs(window_secs),
            },
            model: ModelPaths::from_env(env),
            mode,
        })
    }

    /// Log the effective settings. The admin key appears only as a
    /// fingerprint.
    pub fn log_summary(&self) {
        info!(
            bind = %self.bind_addr,
            environment = self.mode.environment(),
            ai_provider = ?self.ai_provider,
            database = ?self.database,
            cache = if self.redis_configured { "Redis" } else { "Memory" },
            rate_limit_max = self.rate_limit.max_requests,
            rate_limit_window_secs = self.rate_limit.window.as_secs(),
            admin_key = %secret_fingerprint(self.admin_api_key.as_bytes()),
            "veterinary bot configuration"
        );
    }
}

/// Settings of the adventure API.
pub struct AdventureConfig {
    pub bind_addr: SocketAddr,
    /// Directory receiving uploaded images.
    pub upload_dir: PathBuf,
    /// Prefix of upload URLs handed back to clients.
    pub public_base_url: Url,
    pub allowed_origins: Vec<Url>,
    /// Password registered for the seeded administrator.
    pub admin_password: Zeroizing<String>,
    pub session: SessionSettings,
}

impl AdventureConfig {
    /// Read and validate the service settings.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for malformed values and for session or
    /// password settings a release build cannot default.
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, ConfigError> {
        let port = parse_or(env, PORT_ENV, 5000_u16, "a TCP port")?;
        let base = env
            .string("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let public_base_url = Url::parse(&base)
            .map(directory_url)
            .map_err(|_| ConfigError::InvalidEnv {
                name: "PUBLIC_BASE_URL",
                value: base.clone(),
                expected: "an absolute URL",
            })?;
        Ok(Self {
            bind_addr: listen_addr(port),
            upload_dir: path_or(env, "UPLOAD_DIR", "uploads"),
            public_base_url,
            allowed_origins: allowed_origins(env)?,
            admin_password: secret(env, mode, "ADMIN_PASSWORD", DEV_ADMIN_PASSWORD)?,
            session: session_settings_from_env(env, mode)?,
        })
    }
}

#[cfg(test)]
mod tests;
