//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `--flags`, `TOKKU_*` environment variables and config
//! files. An environment-specific `.env.<environment>` file is read first so
//! its entries act as defaults beneath variables already set in the process.

use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// Shortest secret accepted outside development.
pub const MIN_JWT_SECRET_BYTES: usize = 32;
const DEVELOPMENT_JWT_SECRET: &str = "tokku-development-secret-do-not-deploy";
const ENVIRONMENT_VAR: &str = "TOKKU_ENVIRONMENT";
const ENVIRONMENT_FLAG: &str = "--environment";

/// Deployment environment the process runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl RuntimeEnvironment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }

    /// Server-fault messages reach clients everywhere but production.
    #[must_use]
    pub const fn exposes_error_details(self) -> bool {
        !matches!(self, Self::Production)
    }

    /// Name of the env file read for this environment.
    #[must_use]
    pub fn env_file(self) -> String {
        format!(".env.{}", self.as_str())
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeEnvironment {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(SettingsError::UnknownEnvironment {
                value: other.to_owned(),
            }),
        }
    }
}

/// Settings that cannot be turned into a runnable configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown environment `{value}`; expected development, test or production")]
    UnknownEnvironment { value: String },
    #[error("TOKKU_DATABASE_URL is required")]
    MissingDatabaseUrl,
    #[error("TOKKU_JWT_SECRET is required in {environment}")]
    MissingJwtSecret { environment: RuntimeEnvironment },
    #[error("TOKKU_JWT_SECRET must be at least {MIN_JWT_SECRET_BYTES} bytes in {environment}")]
    WeakJwtSecret { environment: RuntimeEnvironment },
    #[error("db_max_connections must be at least 1")]
    EmptyPool,
}

/// Application settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TOKKU")]
pub struct AppSettings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// HMAC secret for signing bearer tokens.
    pub jwt_secret: Option<String>,
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// `development`, `test` or `production`.
    pub environment: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Reject preference requests without a bearer token.
    #[ortho_config(default = false)]
    pub require_bearer_token: bool,
}

impl AppSettings {
    /// Read the env file for the selected environment, then load settings
    /// from `args`.
    pub fn load_with_env_file<I, T>(args: I) -> color_eyre::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let environment = select_environment(&argv)?;
        load_env_file(environment);
        Ok(Self::load_from_iter(argv)?)
    }

    pub fn environment(&self) -> Result<RuntimeEnvironment, SettingsError> {
        self.environment
            .as_deref()
            .map_or(Ok(RuntimeEnvironment::default()), str::parse)
    }

    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// The signing secret, falling back to a fixed value in development.
    pub fn jwt_secret(&self) -> Result<Zeroizing<String>, SettingsError> {
        let environment = self.environment()?;
        match self.jwt_secret.as_deref() {
            Some(secret) if secret.len() >= MIN_JWT_SECRET_BYTES => {
                Ok(Zeroizing::new(secret.to_owned()))
            }
            Some(secret) if environment == RuntimeEnvironment::Development => {
                warn!(
                    length = secret.len(),
                    "short JWT secret accepted in development"
                );
                Ok(Zeroizing::new(secret.to_owned()))
            }
            Some(_) => Err(SettingsError::WeakJwtSecret { environment }),
            None if environment == RuntimeEnvironment::Development => {
                warn!("TOKKU_JWT_SECRET unset; using the development secret");
                Ok(Zeroizing::new(DEVELOPMENT_JWT_SECRET.to_owned()))
            }
            None => Err(SettingsError::MissingJwtSecret { environment }),
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn db_max_connections(&self) -> Result<u32, SettingsError> {
        match self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS) {
            0 => Err(SettingsError::EmptyPool),
            size => Ok(size),
        }
    }

    /// Pool settings derived from the database URL and size limit.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let max_size = self.db_max_connections()?;
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(max_size)
            .with_min_idle(Some(max_size.min(2))))
    }
}

/// The environment named by `--environment` or `TOKKU_ENVIRONMENT`.
fn select_environment(args: &[OsString]) -> Result<RuntimeEnvironment, SettingsError> {
    let from_args = args.windows(2).find_map(|pair| match pair {
        [flag, value] if flag == ENVIRONMENT_FLAG => Some(value.to_string_lossy().into_owned()),
        _ => None,
    });
    let from_inline = args.iter().find_map(|arg| {
        arg.to_str()
            .and_then(|text| text.strip_prefix("--environment="))
            .map(str::to_owned)
    });
    from_args
        .or(from_inline)
        .or_else(|| std::env::var(ENVIRONMENT_VAR).ok())
        .map_or(Ok(RuntimeEnvironment::default()), |raw| raw.parse())
}

fn load_env_file(environment: RuntimeEnvironment) {
    let file = environment.env_file();
    match dotenv::from_filename(&file) {
        Ok(path) => debug!(path = %path.display(), "loaded env file"),
        Err(error) if error.not_found() => debug!(%file, "no env file"),
        Err(error) => warn!(%file, %error, "could not read env file"),
    }
}
