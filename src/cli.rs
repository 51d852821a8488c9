//! Command-line entrypoint: argument parsing and the quick-parse workflow.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use crate::client::ContentUnderstandingClient;
use crate::config::Config;
use crate::errors::AppError;
use crate::processor::{DocumentProcessor, DocumentSource};
use crate::report;
use crate::storage::save_json_to_file;

pub const DEFAULT_SAMPLE_FILE: &str = "./data/invoice.pdf";
pub const DEFAULT_ANALYZER_ID: &str = "prebuilt-invoice";

#[derive(Parser, Debug)]
#[command(
    name = "quick-parse",
    version,
    about = "Extract structured fields from a document with Azure AI Content Understanding"
)]
pub struct Cli {
    #[arg(long, default_value = DEFAULT_SAMPLE_FILE, help = "Local document to upload")]
    pub file: PathBuf,
    #[arg(
        long,
        conflicts_with = "file",
        help = "Analyze a document the service can download instead of a local file"
    )]
    pub url: Option<String>,
    #[arg(long, env = "ANALYZER_ID", default_value = DEFAULT_ANALYZER_ID)]
    pub analyzer: String,
    #[arg(long, help = "Directory for the saved JSON result (overrides OUTPUT_DIR)")]
    pub output_dir: Option<PathBuf>,
    #[arg(long, help = "Saved file name prefix [default: <analyzer>_analysis_result]")]
    pub prefix: Option<String>,
}

impl Cli {
    pub fn source(&self) -> DocumentSource {
        match self.url {
            Some(ref url) => DocumentSource::Url(url.clone()),
            None => DocumentSource::File(self.file.clone()),
        }
    }

    /// `prebuilt-invoice` becomes `prebuilt_invoice_analysis_result`.
    pub fn filename_prefix(&self) -> String {
        match self.prefix {
            Some(ref prefix) => prefix.clone(),
            None => format!("{}_analysis_result", self.analyzer.replace('-', "_")),
        }
    }
}

fn build_client(config: &Config) -> Result<ContentUnderstandingClient, AppError> {
    let credential = config.credential()?;
    let client = ContentUnderstandingClient::new(
        &config.endpoint,
        &config.api_version,
        credential,
        Some(config.user_agent.clone()),
    )?;
    Ok(client.with_polling(config.poll_interval, config.poll_timeout))
}

/// Runs one analysis: build client, submit, poll, print the report, save the result.
///
/// Console text goes to `out`; diagnostics go through `tracing`.
///
/// # Returns
///
/// * `Result<Option<PathBuf>, AppError>` - Path of the saved result, or `None`
///   when the service returned no `result`.
pub async fn run<W: Write>(
    cli: &Cli,
    config: &Config,
    out: &mut W,
) -> Result<Option<PathBuf>, AppError> {
    let client = match build_client(config) {
        Ok(client) => {
            writeln!(out, "✅ Client created successfully")?;
            writeln!(out, "   Endpoint: {}", config.endpoint)?;
            writeln!(out, "   Credential: {}", client.credential().kind())?;
            writeln!(out, "   API Version: {}", config.api_version)?;
            client
        }
        Err(e) => {
            tracing::error!("Failed to create Content Understanding client: {}", e);
            writeln!(out, "❌ Failed to create client")?;
            writeln!(out, "   Endpoint: {}", config.endpoint)?;
            writeln!(out, "   Credential: {}", config.credential_kind())?;
            writeln!(out, "   Error: {}", e)?;
            return Err(e);
        }
    };

    let processor = DocumentProcessor::new(client);
    writeln!(out, "✅ DocumentProcessor created successfully")?;

    let source = cli.source();
    writeln!(out, "🔍 Analyzing {} with {}...", source, cli.analyzer)?;
    let operation = processor.submit(&cli.analyzer, &source).await?;

    writeln!(out, "⏳ Waiting for document analysis to complete...")?;
    let outcome = processor.wait(&operation).await?;
    writeln!(out, "✅ Document analysis completed successfully!")?;

    if outcome.response.result.is_none() {
        writeln!(out, "No analysis result available")?;
        return Ok(None);
    }

    match outcome.first_content() {
        Some(content) => write!(out, "{}", report::render_content(content))?,
        None => tracing::warn!("Analysis result contains no contents"),
    }

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    let path = save_json_to_file(&outcome.raw, &output_dir, &cli.filename_prefix()).await?;
    writeln!(
        out,
        "💾 Full analysis result saved. Review the complete JSON at: {}",
        path.display()
    )?;

    Ok(Some(path))
}
