use serde_json::{json, Value};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::auth::Credential;
use crate::errors::AppError;
use crate::models::{AnalyzeOperation, OperationStatus};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the Azure AI Content Understanding REST API.
#[derive(Clone, Debug)]
pub struct ContentUnderstandingClient {
    client: reqwest::Client,
    endpoint: String,
    api_version: String,
    credential: Credential,
    user_agent: Option<String>,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl ContentUnderstandingClient {
    /// Creates a new `ContentUnderstandingClient`.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The resource endpoint, e.g. `https://<name>.services.ai.azure.com`.
    /// * `api_version` - The REST API version sent with every request.
    /// * `credential` - Subscription key or Azure AD token provider.
    /// * `user_agent` - Optional value for the `x-ms-useragent` header.
    pub fn new(
        endpoint: &str,
        api_version: &str,
        credential: Credential,
        user_agent: Option<String>,
    ) -> Result<Self, AppError> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(AppError::ConfigError("Endpoint must be provided".to_string()));
        }
        let parsed = url::Url::parse(endpoint).map_err(|e| {
            AppError::ConfigError(format!("Invalid endpoint '{}': {}", endpoint, e))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::ConfigError(format!(
                "Endpoint must use http or https: {}",
                endpoint
            )));
        }
        if api_version.trim().is_empty() {
            return Err(AppError::ConfigError("API version must be provided".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!(
                    "Failed to create Content Understanding client: {}",
                    e
                ))
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_version: api_version.to_string(),
            credential,
            user_agent: user_agent.filter(|ua| !ua.trim().is_empty()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        })
    }

    /// Overrides how often and for how long `poll_result` polls.
    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    fn analyzer_url(&self, analyzer_id: &str, action: Option<&str>) -> String {
        match action {
            Some(action) => format!(
                "{}/contentunderstanding/analyzers/{}:{}?api-version={}",
                self.endpoint, analyzer_id, action, self.api_version
            ),
            None => format!(
                "{}/contentunderstanding/analyzers/{}?api-version={}",
                self.endpoint, analyzer_id, self.api_version
            ),
        }
    }

    /// Adds authentication and user agent headers.
    async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, AppError> {
        let request = match self.user_agent {
            Some(ref ua) => request.header("x-ms-useragent", ua),
            None => request,
        };
        self.credential.apply(request).await
    }

    /// Starts analysis of a local file.
    ///
    /// # Arguments
    ///
    /// * `analyzer_id` - The analyzer to run, e.g. `prebuilt-invoice`.
    /// * `file_location` - Path of the document to upload.
    ///
    /// # Returns
    ///
    /// * `Result<AnalyzeOperation, AppError>` - Handle to poll with `poll_result`.
    pub async fn begin_analyze_binary(
        &self,
        analyzer_id: &str,
        file_location: impl AsRef<Path>,
    ) -> Result<AnalyzeOperation, AppError> {
        let file_location = file_location.as_ref();
        let bytes = tokio::fs::read(file_location).await.map_err(|e| {
            AppError::IoError(format!(
                "Failed to read {}: {}",
                file_location.display(),
                e
            ))
        })?;

        let url = self.analyzer_url(analyzer_id, Some("analyzeBinary"));
        tracing::info!(
            "Submitting {} ({} bytes) to analyzer {}",
            file_location.display(),
            bytes.len(),
            analyzer_id
        );
        tracing::debug!("POST {}", url);

        let request = self
            .client
            .post(&url)
            .header("Content-Type", "application/octet-stream")
            .body(bytes);
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Analyze request failed: {}", e)))?;

        Self::operation_from_response(response, analyzer_id).await
    }

    /// Starts analysis of a document the service can fetch by URL.
    pub async fn begin_analyze_url(
        &self,
        analyzer_id: &str,
        document_url: &str,
    ) -> Result<AnalyzeOperation, AppError> {
        let url = self.analyzer_url(analyzer_id, Some("analyze"));
        tracing::info!("Submitting {} to analyzer {}", document_url, analyzer_id);

        let body = json!({
            "inputs": [{ "url": document_url }]
        });

        let request = self.client.post(&url).json(&body);
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Analyze request failed: {}", e)))?;

        Self::operation_from_response(response, analyzer_id).await
    }

    async fn operation_from_response(
        response: reqwest::Response,
        analyzer_id: &str,
    ) -> Result<AnalyzeOperation, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Analyzer {} returned {}: {}",
                analyzer_id, status, error_text
            )));
        }

        let headers = response.headers();
        let operation_location = headers
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::ExternalApiError(
                    "Analyze response missing 'Operation-Location' header".to_string(),
                )
            })?;
        let request_id = headers
            .get("apim-request-id")
            .or_else(|| headers.get("x-ms-request-id"))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        tracing::info!("✓ Analysis started: {}", operation_location);
        Ok(AnalyzeOperation {
            operation_location,
            request_id,
        })
    }

    /// Fetches an analyzer definition.
    pub async fn get_analyzer(&self, analyzer_id: &str) -> Result<Value, AppError> {
        let url = self.analyzer_url(analyzer_id, None);
        tracing::info!("Fetching analyzer {}", analyzer_id);

        let request = self.client.get(&url);
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Analyzer request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Analyzer {} returned {}: {}",
                analyzer_id, status, error_text
            )));
        }

        let data = response.json().await.map_err(|e| {
            AppError::ParseError(format!("Failed to parse analyzer response: {}", e))
        })?;
        Ok(data)
    }

    /// Polls an analysis operation until it succeeds, fails or times out.
    ///
    /// # Returns
    ///
    /// * `Result<Value, AppError>` - The full operation body once `status` is `Succeeded`.
    pub async fn poll_result(&self, operation: &AnalyzeOperation) -> Result<Value, AppError> {
        let started = Instant::now();

        loop {
            let elapsed = started.elapsed();
            if elapsed > self.poll_timeout {
                return Err(AppError::Timeout(format!(
                    "operation {} did not complete within {:?}",
                    operation.operation_location, self.poll_timeout
                )));
            }

            let request = self.client.get(&operation.operation_location);
            let response = self
                .authorize(request)
                .await?
                .send()
                .await
                .map_err(|e| AppError::ExternalApiError(format!("Poll request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(AppError::ExternalApiError(format!(
                    "Operation poll returned {}: {}",
                    status, error_text
                )));
            }

            let body: Value = response.json().await.map_err(|e| {
                AppError::ParseError(format!("Failed to parse operation status: {}", e))
            })?;

            let raw_status = body.get("status").and_then(Value::as_str).unwrap_or("");
            match OperationStatus::parse(raw_status) {
                OperationStatus::Succeeded => {
                    tracing::info!(
                        "✓ Analysis succeeded after {:.2}s",
                        elapsed.as_secs_f64()
                    );
                    return Ok(body);
                }
                OperationStatus::Failed => {
                    let message = failure_message(&body);
                    tracing::error!("Analysis failed: {}", message);
                    return Err(AppError::AnalysisFailed(message));
                }
                _ => {
                    tracing::info!(
                        "Operation status '{}' after {:.2}s, waiting...",
                        raw_status,
                        elapsed.as_secs_f64()
                    );
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

fn failure_message(body: &Value) -> String {
    let error = body.get("error");
    let code = error.and_then(|e| e.get("code")).and_then(Value::as_str);
    let message = error.and_then(|e| e.get("message")).and_then(Value::as_str);
    match (code, message) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (None, Some(message)) => message.to_string(),
        (Some(code), None) => code.to_string(),
        (None, None) => body.to_string(),
    }
}
