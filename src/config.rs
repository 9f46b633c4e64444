//! Configuration for the query handler and the downstream provider

use serde::{Deserialize, Serialize};
use log::{debug, warn};

/// Names the SSM parameter that holds the provider API key
pub const SECRET_PARAMETER_ENV: &str = "SSM_PARAM_CLAUDE_API_KEY";
pub const API_BASE_ENV: &str = "ANTHROPIC_API_BASE";
pub const API_VERSION_ENV: &str = "ANTHROPIC_VERSION";
pub const TIMEOUT_ENV: &str = "ANTHROPIC_TIMEOUT_SECS";

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// API base URL
    pub api_base: String
  , /// Value of the `anthropic-version` header
    pub api_version: String
  , /// Request timeout in seconds
    pub timeout_secs: u64
}

impl Default for ProviderConfig
{   fn default() -> Self
    {   ProviderConfig
        {   api_base: DEFAULT_API_BASE.to_string()
          , api_version: DEFAULT_API_VERSION.to_string()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
        }
    }
}

/// Handler configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig
{   /// SSM parameter name of the API key. Checked per invocation,
    /// so a missing value fails requests rather than startup.
    pub secret_parameter: Option<String>
  , /// Downstream provider configuration
    pub provider: ProviderConfig
}

impl HandlerConfig
{   /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   let secret_parameter = lookup(SECRET_PARAMETER_ENV)
          .filter(|name| !name.trim().is_empty());
        if secret_parameter.is_none()
        {   warn!(
              "{} is not set; every request will fail",
              SECRET_PARAMETER_ENV
            );
        }

        let defaults = ProviderConfig::default();
        let timeout_secs = match lookup(TIMEOUT_ENV)
        {   Some(raw) => raw.trim().parse::<u64>()
              .ok()
              .filter(|secs| *secs > 0)
              .ok_or_else(|| {
                crate::error::Error::InvalidConfiguration(
                  format!(
                    "{} must be a positive integer, got {:?}",
                    TIMEOUT_ENV, raw
                  )
                )
              })?
          , None => defaults.timeout_secs
        };

        let provider = ProviderConfig
        {   api_base: lookup(API_BASE_ENV)
              .unwrap_or(defaults.api_base)
          , api_version: lookup(API_VERSION_ENV)
              .unwrap_or(defaults.api_version)
          , timeout_secs
        };

        debug!(
          "Loaded config: api_base={} api_version={} timeout={}s",
          provider.api_base, provider.api_version, provider.timeout_secs
        );

        Ok(HandlerConfig
        {   secret_parameter
          , provider
        })
    }
}

