//! Configuration management for infrastructure services
//!
//! Handles:
//! - `.env` file loading for the current environment
//! - Phone-auth provider selection and credentials
//! - Reverse geocoder settings

use std::fmt;
use std::str::FromStr;

use civic_shared::{AppConfig, Environment};
use tracing::{debug, info};

use crate::auth::{DevAuthConfig, IdentityToolkitConfig};
use crate::geo::NominatimConfig;
use crate::InfrastructureError;

/// Which phone-auth provider to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneAuthBackend {
    IdentityToolkit,
    Dev,
}

impl PhoneAuthBackend {
    /// Default for an environment: dev outside production
    pub fn for_environment(env: Environment) -> Self {
        if env.is_production() {
            Self::IdentityToolkit
        } else {
            Self::Dev
        }
    }
}

impl FromStr for PhoneAuthBackend {
    type Err = InfrastructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identity-toolkit" | "identity_toolkit" | "firebase" => Ok(Self::IdentityToolkit),
            "dev" | "mock" => Ok(Self::Dev),
            other => Err(InfrastructureError::Config(format!(
                "Unknown PHONE_AUTH_PROVIDER: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for PhoneAuthBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityToolkit => write!(f, "identity-toolkit"),
            Self::Dev => write!(f, "dev"),
        }
    }
}

/// Infrastructure configuration settings
#[derive(Debug, Clone)]
pub struct InfrastructureConfig {
    /// Domain configuration shared with the core crate
    pub app: AppConfig,
    /// Selected phone-auth provider
    pub phone_auth: PhoneAuthBackend,
    /// Identity Toolkit credentials, when an API key is configured
    pub identity_toolkit: Option<IdentityToolkitConfig>,
    /// Development provider settings
    pub dev_auth: DevAuthConfig,
    /// Reverse geocoder settings
    pub nominatim: NominatimConfig,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            phone_auth: PhoneAuthBackend::Dev,
            identity_toolkit: None,
            dev_auth: DevAuthConfig::default(),
            nominatim: NominatimConfig::default(),
        }
    }
}

impl InfrastructureConfig {
    /// Build adapter settings from a variable lookup on top of `app`
    pub fn from_vars<F>(app: AppConfig, var: F) -> Result<Self, InfrastructureError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let phone_auth = match var("PHONE_AUTH_PROVIDER") {
            Some(value) => value.parse()?,
            None => PhoneAuthBackend::for_environment(app.environment),
        };

        let identity_toolkit = match IdentityToolkitConfig::from_vars(&var) {
            Ok(config) => Some(config),
            Err(_) if phone_auth == PhoneAuthBackend::Dev => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            app,
            phone_auth,
            identity_toolkit,
            dev_auth: DevAuthConfig::from_vars(&var),
            nominatim: NominatimConfig::from_vars(&var),
        })
    }
}

/// Load infrastructure configuration from the environment
///
/// Reads the environment-specific file (`.env.development`, ...) and then
/// `.env`; variables already set in the process win.
pub fn load_config() -> Result<InfrastructureConfig, InfrastructureError> {
    let environment = Environment::from_env();
    if dotenvy::from_filename(environment.env_file()).is_ok() {
        debug!(file = environment.env_file(), "Loaded environment file");
    }
    dotenvy::dotenv().ok(); // Load .env file if present

    let config = InfrastructureConfig::from_vars(AppConfig::from_env(), |key| {
        std::env::var(key).ok()
    })?;

    info!(
        environment = %config.app.environment,
        phone_auth = %config.phone_auth,
        "Infrastructure configuration loaded"
    );
    Ok(config)
}
