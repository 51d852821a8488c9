use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{ClientSecretCredential, Credential, StaticTokenProvider};
use crate::errors::AppError;

pub const DEFAULT_API_VERSION: &str = "2025-11-01";
pub const DEFAULT_USER_AGENT: &str = "azure-ai-content-understanding-rust-sample-ga";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_OUTPUT_DIR: &str = "test_output";

/// Runtime configuration, sourced from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub api_version: String,
    pub user_agent: String,
    pub access_token: Option<String>,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub authority_host: String,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty or whitespace-only values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            // Validated when the client is constructed
            endpoint: get("AZURE_AI_ENDPOINT").unwrap_or_default(),
            api_key: get("AZURE_AI_API_KEY"),
            api_version: get("AZURE_AI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            user_agent: get("AZURE_AI_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            access_token: get("AZURE_AI_ACCESS_TOKEN"),
            tenant_id: get("AZURE_TENANT_ID"),
            client_id: get("AZURE_CLIENT_ID"),
            client_secret: get("AZURE_CLIENT_SECRET"),
            authority_host: get("AZURE_AUTHORITY_HOST")
                .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
            poll_interval: parse_secs(
                get("AZURE_AI_POLL_INTERVAL_SECS"),
                2,
                "AZURE_AI_POLL_INTERVAL_SECS",
            )?,
            poll_timeout: parse_secs(
                get("AZURE_AI_POLL_TIMEOUT_SECS"),
                120,
                "AZURE_AI_POLL_TIMEOUT_SECS",
            )?,
            output_dir: get("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        };

        // Never log key, token or client secret values
        tracing::debug!("Content Understanding endpoint: {}", config.endpoint);
        tracing::debug!("API version: {}", config.api_version);
        tracing::debug!("Credential: {}", config.credential_kind());
        tracing::debug!(
            "Polling every {:?}, timeout {:?}",
            config.poll_interval,
            config.poll_timeout
        );

        Ok(config)
    }

    /// Human readable name of the credential `credential()` would select.
    pub fn credential_kind(&self) -> &'static str {
        if self.api_key.is_some() {
            "Subscription Key"
        } else {
            "Azure AD Token"
        }
    }

    /// Selects the credential to authenticate with.
    ///
    /// Priority: subscription key > pre-acquired access token > service principal.
    pub fn credential(&self) -> Result<Credential, AppError> {
        if let Some(ref key) = self.api_key {
            return Ok(Credential::SubscriptionKey(key.clone()));
        }

        if let Some(ref token) = self.access_token {
            return Ok(Credential::Token(Arc::new(StaticTokenProvider::new(
                token.clone(),
            ))));
        }

        match (&self.tenant_id, &self.client_id, &self.client_secret) {
            (Some(tenant), Some(client_id), Some(secret)) => {
                let credential = ClientSecretCredential::new(
                    &self.authority_host,
                    tenant,
                    client_id.clone(),
                    secret.clone(),
                )?;
                Ok(Credential::Token(Arc::new(credential)))
            }
            _ => Err(AppError::ConfigError(
                "No credential configured: set AZURE_AI_API_KEY, AZURE_AI_ACCESS_TOKEN, \
                 or AZURE_TENANT_ID/AZURE_CLIENT_ID/AZURE_CLIENT_SECRET"
                    .to_string(),
            )),
        }
    }
}

fn parse_secs(value: Option<String>, default: u64, name: &str) -> Result<Duration, AppError> {
    let secs = match value {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            AppError::ConfigError(format!("{} must be a positive integer", name))
        })?,
        None => default,
    };
    if secs == 0 {
        return Err(AppError::ConfigError(format!(
            "{} must be a positive integer",
            name
        )));
    }
    Ok(Duration::from_secs(secs))
}
