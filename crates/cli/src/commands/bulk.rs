//! Bulk product CSV commands.
//!
//! Files are checked with the same rules the dashboard applies before
//! anything is sent to the API.
//!
//! # Environment Variables
//!
//! `bulk-upload` reads the server configuration (`NEPOSTORE_API_URL`,
//! `NEPOSTORE_API_TOKEN`, ...), from `.env` when present.

use std::path::Path;

use nepostore_core::bulk::{BulkReport, BulkUploadError, parse_bulk_csv};
use nepostore_core::tenant::TenantToken;
use nepostore_server::api::{ApiClient, ApiError};
use nepostore_server::config::{ConfigError, ServerConfig};
use thiserror::Error;

/// Errors that can occur during bulk commands.
#[derive(Debug, Error)]
pub enum BulkCommandError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file as a whole was rejected.
    #[error("{0}")]
    Rejected(#[from] BulkUploadError),

    #[error("{0} rows have invalid values")]
    InvalidRows(usize),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Check a CSV already in memory and log every problem found.
///
/// # Errors
///
/// Returns [`BulkCommandError::Rejected`] for a malformed file and
/// [`BulkCommandError::InvalidRows`] when any row has a bad value.
pub fn check_bytes(contents: &[u8]) -> Result<BulkReport, BulkCommandError> {
    let report = parse_bulk_csv(contents)?;
    for error in &report.errors {
        tracing::warn!("line {} ({}): {}", error.line, error.column, error.message);
    }
    tracing::info!(
        "{} of {} rows are valid",
        report.rows.len(),
        report.total()
    );

    if report.is_valid() {
        Ok(report)
    } else {
        let mut lines: Vec<u64> = report.errors.iter().map(|e| e.line).collect();
        lines.dedup();
        Err(BulkCommandError::InvalidRows(lines.len()))
    }
}

fn read(path: &Path) -> Result<Vec<u8>, BulkCommandError> {
    std::fs::read(path).map_err(|source| BulkCommandError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Check a CSV file without uploading it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation.
pub fn check(path: &Path) -> Result<BulkReport, BulkCommandError> {
    tracing::info!("Checking {}", path.display());
    check_bytes(&read(path)?)
}

/// Check a CSV file, then upload it for `tenant`.
///
/// # Errors
///
/// Returns an error if validation fails, configuration is missing or the
/// API refuses the upload.
pub async fn upload(tenant: &str, path: &Path) -> Result<(), BulkCommandError> {
    let contents = read(path)?;
    check_bytes(&contents)?;

    let config = ServerConfig::from_env()?;
    let api = ApiClient::new(&config)?;
    let tenant = TenantToken::new(tenant);
    let file_name = path
        .file_name()
        .map_or_else(|| "products.csv".to_string(), |n| n.to_string_lossy().into_owned());

    tracing::info!("Uploading {file_name} to {tenant} via {}", api.base_url());
    let response = api
        .scoped(Some(&tenant), None)
        .bulk_upload(&file_name, contents)
        .await?;

    tracing::info!("Created {} products, {} failed", response.created, response.failed);
    for error in &response.errors {
        tracing::warn!("  {error}");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nepostore_core::bulk::bulk_template_csv;

    use super::*;

    #[test]
    fn test_template_passes_check() {
        let report = check_bytes(bulk_template_csv().as_bytes()).unwrap();
        assert!(!report.rows.is_empty());
    }

    #[test]
    fn test_bad_header_is_rejected() {
        let err = check_bytes(b"name,price\nTea,10\n").unwrap_err();
        assert!(matches!(err, BulkCommandError::Rejected(BulkUploadError::HeaderCount { .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = check(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.to_string().contains("here.csv"));
    }
}
