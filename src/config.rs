//! Provider configuration — deserialization, environment fallback and validation.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::ProviderError;

/// Environment variable consulted when no endpoint is configured.
pub const ENDPOINT_ENV: &str = "CONTEXTFORGE_ENDPOINT";

/// Environment variable consulted when no bearer token is configured.
pub const BEARER_TOKEN_ENV: &str = "CONTEXTFORGE_BEARER_TOKEN";

/// Endpoint used when neither the config nor the environment names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:4444";

/// Strip an env var reference to its variable name.
///
/// Accepts `${VAR_NAME}` syntax only. Returns `None` if the value is not a
/// valid env-var reference.
pub fn parse_env_ref(value: &str) -> Option<&str> {
    value.strip_prefix("${").and_then(|s| s.strip_suffix('}'))
}

/// Provider configuration as written by the operator, parsed from TOML.
///
/// Both values are optional; [`ProviderConfig::resolve`] fills the gaps from
/// the environment and the built-in default.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Gateway API base URL. May be a `${VAR}` reference.
    pub endpoint: Option<String>,
    /// Bearer token sent on every authenticated request. May be a `${VAR}` reference.
    pub bearer_token: Option<String>,
}

/// Fully resolved, validated configuration handed to [`crate::Client`].
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub bearer_token: Option<String>,
}

impl ProviderConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| ProviderError::InvalidConfig(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::InvalidConfig(format!("reading {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve against the process environment.
    pub fn resolve(&self) -> crate::Result<ResolvedConfig> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve using `lookup` for environment access.
    ///
    /// Endpoint: configured value, then [`ENDPOINT_ENV`], then
    /// [`DEFAULT_ENDPOINT`]. Token: configured value, then
    /// [`BEARER_TOKEN_ENV`], then unauthenticated. Values that resolve to the
    /// empty string count as unset.
    pub fn resolve_with<F>(&self, lookup: F) -> crate::Result<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expand = |value: &str| match parse_env_ref(value) {
            Some(var_name) => lookup(var_name).unwrap_or_default(),
            None => value.to_string(),
        };
        let non_empty = |value: String| (!value.is_empty()).then_some(value);

        let endpoint = self
            .endpoint
            .as_deref()
            .map(expand)
            .and_then(non_empty)
            .or_else(|| lookup(ENDPOINT_ENV).and_then(non_empty))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let bearer_token = self
            .bearer_token
            .as_deref()
            .map(expand)
            .and_then(non_empty)
            .or_else(|| lookup(BEARER_TOKEN_ENV).and_then(non_empty));

        let resolved = ResolvedConfig {
            endpoint,
            bearer_token,
        };
        resolved.validate()?;
        Ok(resolved)
    }
}

impl ResolvedConfig {
    /// Build a config directly, validating it.
    pub fn new(endpoint: impl Into<String>, bearer_token: Option<String>) -> crate::Result<Self> {
        let config = Self {
            endpoint: endpoint.into(),
            bearer_token: bearer_token.filter(|t| !t.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on misconfiguration before any request is built.
    pub fn validate(&self) -> crate::Result<()> {
        let url = url::Url::parse(&self.endpoint).map_err(|e| {
            ProviderError::InvalidConfig(format!("endpoint '{}' is not a URL: {}", self.endpoint, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ProviderError::InvalidConfig(format!(
                "endpoint '{}' must use http or https",
                self.endpoint
            )));
        }
        if url.host_str().is_none() {
            return Err(ProviderError::InvalidConfig(format!(
                "endpoint '{}' has no host",
                self.endpoint
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ProviderError::InvalidConfig(format!(
                "endpoint '{}' must not carry a query or fragment",
                self.endpoint
            )));
        }

        if let Some(token) = &self.bearer_token {
            if token
                .chars()
                .any(|c| c.is_whitespace() || c.is_control())
            {
                return Err(ProviderError::InvalidConfig(
                    "bearer_token must not contain whitespace or control characters".to_string(),
                ));
            }
        }

        Ok(())
    }
}

// Tokens never reach log output.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("endpoint", &self.endpoint)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
