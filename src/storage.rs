use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::errors::AppError;

/// Writes `value` as pretty-printed JSON to `{output_dir}/{prefix}_{timestamp}.json`.
///
/// The directory is created if needed. The timestamp is local time,
/// formatted `YYYYmmdd_HHMMSS`.
///
/// # Returns
///
/// * `Result<PathBuf, AppError>` - Path of the written file.
pub async fn save_json_to_file<T: Serialize>(
    value: &T,
    output_dir: &Path,
    filename_prefix: &str,
) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = output_dir.join(format!("{}_{}.json", filename_prefix, timestamp));

    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|e| AppError::IoError(format!("Failed to write {}: {}", path.display(), e)))?;

    tracing::info!("Saved analysis result to {}", path.display());
    Ok(path)
}
