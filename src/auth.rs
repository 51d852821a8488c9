use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::AppError;

/// OAuth2 scope for Azure AI services.
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Tokens are refreshed this long before the service says they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// Source of bearer tokens for Azure AD authentication.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<String, AppError>;
}

/// How requests to the service are authenticated.
#[derive(Clone)]
pub enum Credential {
    /// `Ocp-Apim-Subscription-Key` header.
    SubscriptionKey(String),
    /// `Authorization: Bearer` header with a token from the provider.
    Token(Arc<dyn TokenProvider>),
}

impl Credential {
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::SubscriptionKey(_) => "Subscription Key",
            Credential::Token(_) => "Azure AD Token",
        }
    }

    /// Adds the authentication header to a request.
    pub async fn apply(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, AppError> {
        match self {
            Credential::SubscriptionKey(key) => {
                Ok(request.header("Ocp-Apim-Subscription-Key", key))
            }
            Credential::Token(provider) => {
                let token = provider.get_token().await?;
                Ok(request.header("Authorization", format!("Bearer {}", token)))
            }
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::SubscriptionKey(_) => f.write_str("SubscriptionKey([REDACTED])"),
            Credential::Token(_) => f.write_str("Token([REDACTED])"),
        }
    }
}

/// Fixed, pre-acquired bearer token.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<String, AppError> {
        Ok(self.token.clone())
    }
}

#[derive(Clone)]
struct AccessToken {
    token: String,
    refresh_in: Duration,
}

struct TokenExpiry;

impl Expiry<String, AccessToken> for TokenExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &AccessToken,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.refresh_in)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    // v1 endpoints send this as a string, v2 as a number
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Service principal credential using the OAuth2 client credentials grant.
///
/// Tokens are cached per scope and shared between concurrent callers; only one
/// token request is in flight at a time.
pub struct ClientSecretCredential {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cache: Cache<String, AccessToken>,
}

impl ClientSecretCredential {
    /// Creates a new `ClientSecretCredential`.
    ///
    /// # Arguments
    ///
    /// * `authority_host` - Azure AD authority, e.g. `https://login.microsoftonline.com`.
    /// * `tenant_id` - Directory (tenant) ID.
    /// * `client_id` - Application (client) ID.
    /// * `client_secret` - Client secret value.
    pub fn new(
        authority_host: &str,
        tenant_id: &str,
        client_id: String,
        client_secret: String,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::AuthError(format!("Failed to create token client: {}", e)))?;

        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            authority_host.trim_end_matches('/'),
            tenant_id
        );

        let cache = Cache::builder()
            .max_capacity(8)
            .expire_after(TokenExpiry)
            .build();

        Ok(Self {
            client,
            token_url,
            client_id,
            client_secret,
            scope: COGNITIVE_SERVICES_SCOPE.to_string(),
            cache,
        })
    }

    async fn fetch_token(&self) -> Result<AccessToken, AppError> {
        tracing::debug!("Requesting Azure AD token from {}", self.token_url);

        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::AuthError(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or(body);
            return Err(AppError::AuthError(format!(
                "Token endpoint returned {}: {}",
                status, detail
            )));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            AppError::AuthError(format!("Failed to parse token response: {}", e))
        })?;

        let expires_in = body
            .expires_in
            .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or(3600);

        tracing::info!("✓ Azure AD token acquired (expires in {}s)", expires_in);

        Ok(AccessToken {
            token: body.access_token,
            refresh_in: Duration::from_secs(expires_in).saturating_sub(TOKEN_REFRESH_MARGIN),
        })
    }
}

#[async_trait]
impl TokenProvider for ClientSecretCredential {
    async fn get_token(&self) -> Result<String, AppError> {
        let token = self
            .cache
            .try_get_with(self.scope.clone(), self.fetch_token())
            .await
            .map_err(|e| (*e).clone())?;
        Ok(token.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_static_token_provider() {
        let provider = StaticTokenProvider::new("abc".to_string());
        assert_eq!(provider.get_token().await.unwrap(), "abc");
    }

    #[test]
    fn test_credential_debug_redacts_secret() {
        let credential = Credential::SubscriptionKey("super-secret".to_string());
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("super-secret"));
        assert_eq!(credential.kind(), "Subscription Key");
    }

    #[tokio::test]
    async fn test_client_secret_token_is_cached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/my-tenant/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=app-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "aad-token"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let credential = ClientSecretCredential::new(
            &mock_server.uri(),
            "my-tenant",
            "app-id".to_string(),
            "shh".to_string(),
        )
        .unwrap();

        assert_eq!(credential.get_token().await.unwrap(), "aad-token");
        assert_eq!(credential.get_token().await.unwrap(), "aad-token");
    }

    #[tokio::test]
    async fn test_client_secret_token_refetched_inside_refresh_margin() {
        let mock_server = MockServer::start().await;

        // 100s lifetime is already within the 300s refresh margin
        Mock::given(method("POST"))
            .and(path("/my-tenant/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 100,
                "access_token": "short-lived"
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let credential = ClientSecretCredential::new(
            &mock_server.uri(),
            "my-tenant",
            "app-id".to_string(),
            "shh".to_string(),
        )
        .unwrap();

        assert_eq!(credential.get_token().await.unwrap(), "short-lived");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(credential.get_token().await.unwrap(), "short-lived");
    }

    #[tokio::test]
    async fn test_concurrent_token_requests_share_one_fetch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/my-tenant/oauth2/v2.0/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "token_type": "Bearer",
                        "expires_in": 3599,
                        "access_token": "shared"
                    }))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let credential = ClientSecretCredential::new(
            &mock_server.uri(),
            "my-tenant",
            "app-id".to_string(),
            "shh".to_string(),
        )
        .unwrap();

        let (first, second) = tokio::join!(credential.get_token(), credential.get_token());
        assert_eq!(first.unwrap(), "shared");
        assert_eq!(second.unwrap(), "shared");
    }

    #[tokio::test]
    async fn test_client_secret_error_description_surfaced() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/my-tenant/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&mock_server)
            .await;

        let credential = ClientSecretCredential::new(
            &mock_server.uri(),
            "my-tenant",
            "app-id".to_string(),
            "wrong".to_string(),
        )
        .unwrap();

        let err = credential.get_token().await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(ref msg) if msg.contains("AADSTS7000215")));
    }
}
