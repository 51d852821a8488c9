use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use crate::client::ContentUnderstandingClient;
use crate::errors::{AppError, ResultExt};
use crate::models::{AnalyzeOperation, AnalyzeResponse, MediaContent};

/// Result of a completed analysis: the raw body for persistence plus a typed view.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub raw: Value,
    pub response: AnalyzeResponse,
}

impl AnalysisOutcome {
    pub fn from_raw(raw: Value) -> Result<Self, AppError> {
        let response = AnalyzeResponse::from_value(&raw)
            .map_err(|e| AppError::ParseError(format!("Unexpected analysis result shape: {}", e)))?;
        Ok(Self { raw, response })
    }

    /// First content block of the result, if any.
    pub fn first_content(&self) -> Option<&MediaContent> {
        self.response
            .result
            .as_ref()
            .and_then(|r| r.contents.first())
    }
}

/// Where the document to analyze comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Local file, uploaded as the request body.
    File(PathBuf),
    /// Publicly reachable URL the service downloads itself.
    Url(String),
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::File(path) => write!(f, "{}", path.display()),
            DocumentSource::Url(url) => f.write_str(url),
        }
    }
}

/// Thin wrapper that runs an analysis end to end (submit, then poll).
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    client: ContentUnderstandingClient,
}

impl DocumentProcessor {
    pub fn new(client: ContentUnderstandingClient) -> Self {
        Self { client }
    }

    /// Submits the document and returns the operation to wait on.
    pub async fn submit(
        &self,
        analyzer_id: &str,
        source: &DocumentSource,
    ) -> Result<AnalyzeOperation, AppError> {
        let operation = match source {
            DocumentSource::File(path) => self.client.begin_analyze_binary(analyzer_id, path).await,
            DocumentSource::Url(url) => self.client.begin_analyze_url(analyzer_id, url).await,
        };
        operation.with_context(|| format!("Submitting {} to {}", source, analyzer_id))
    }

    /// Polls until the operation completes and decodes the result.
    pub async fn wait(&self, operation: &AnalyzeOperation) -> Result<AnalysisOutcome, AppError> {
        let raw = self
            .client
            .poll_result(operation)
            .await
            .context("Waiting for analysis result")?;

        AnalysisOutcome::from_raw(raw)
    }

    /// Submits the document and waits for the result.
    pub async fn analyze(
        &self,
        analyzer_id: &str,
        source: &DocumentSource,
    ) -> Result<AnalysisOutcome, AppError> {
        let operation = self.submit(analyzer_id, source).await?;
        self.wait(&operation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_content_absent_without_result() {
        let outcome = AnalysisOutcome::from_raw(json!({"status": "Succeeded"})).unwrap();
        assert!(outcome.first_content().is_none());
        assert!(outcome.response.result.is_none());
    }

    #[test]
    fn test_first_content_present() {
        let outcome = AnalysisOutcome::from_raw(json!({
            "status": "Succeeded",
            "result": {"contents": [{"kind": "document"}, {"kind": "audioVisual"}]}
        }))
        .unwrap();
        assert_eq!(
            outcome.first_content().and_then(|c| c.kind.as_deref()),
            Some("document")
        );
    }

    #[test]
    fn test_document_source_display() {
        assert_eq!(
            DocumentSource::File(PathBuf::from("./data/invoice.pdf")).to_string(),
            "./data/invoice.pdf"
        );
        assert_eq!(
            DocumentSource::Url("https://example.com/a.pdf".to_string()).to_string(),
            "https://example.com/a.pdf"
        );
    }

    #[test]
    fn test_unexpected_shape_is_parse_error() {
        let err = AnalysisOutcome::from_raw(json!({"result": {"contents": "nope"}})).unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }
}
