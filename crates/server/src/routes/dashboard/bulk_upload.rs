//! Bulk product upload from a CSV file.
//!
//! The file is checked here first. Rejected files and files with row
//! errors never reach the API; the screen lists every problem instead so
//! the user can fix them in one pass.

use askama::Template;
use askama_web::WebTemplate;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use nepostore_core::bulk::{BULK_COLUMNS, BulkReport, MAX_BULK_ROWS, bulk_template_csv, parse_bulk_csv};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::Chrome;
use crate::api::BulkUploadResponse;
use crate::error::AppError;
use crate::routes::Ctx;
use crate::uploads::UploadedForm;

const PATH: &str = "/bulk-upload";
const TEMPLATE_FILE_NAME: &str = "nepostore-products.csv";

#[derive(Debug, Default, Deserialize)]
struct BulkQuery {
    #[serde(default)]
    template: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RowProblem {
    pub line: u64,
    pub column: &'static str,
    pub message: String,
}

/// What happened to the last submitted file.
#[derive(Debug, Clone, Default)]
pub struct UploadOutcome {
    pub file_name: String,
    /// The whole file was rejected.
    pub rejected: Option<String>,
    pub valid_rows: usize,
    pub problems: Vec<RowProblem>,
    /// Reply from the API for a forwarded file.
    pub created: Option<usize>,
    pub failed: usize,
    pub api_errors: Vec<String>,
}

impl UploadOutcome {
    fn rejected(file_name: &str, reason: String) -> Self {
        Self {
            file_name: file_name.to_string(),
            rejected: Some(reason),
            ..Self::default()
        }
    }

    fn checked(file_name: &str, report: &BulkReport) -> Self {
        Self {
            file_name: file_name.to_string(),
            valid_rows: report.rows.len(),
            problems: report
                .errors
                .iter()
                .map(|e| RowProblem {
                    line: e.line,
                    column: e.column,
                    message: e.message.clone(),
                })
                .collect(),
            ..Self::default()
        }
    }

    fn with_reply(mut self, reply: BulkUploadResponse) -> Self {
        self.created = Some(reply.created);
        self.failed = reply.failed;
        self.api_errors = reply.errors;
        self
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard/bulk_upload.html")]
pub struct BulkUploadTemplate {
    pub chrome: Chrome,
    pub columns: Vec<&'static str>,
    pub max_rows: usize,
    pub outcome: Option<UploadOutcome>,
}

impl BulkUploadTemplate {
    fn new(ctx: &Ctx, outcome: Option<UploadOutcome>) -> Self {
        Self {
            chrome: Chrome::new(ctx, "Bulk upload"),
            columns: BULK_COLUMNS.to_vec(),
            max_rows: MAX_BULK_ROWS,
            outcome,
        }
    }
}

/// Instructions, or the CSV template with `?template=1`.
///
/// # Errors
///
/// Never fails; the signature matches the other screens.
pub fn page(ctx: Ctx) -> Result<Response, AppError> {
    let query: BulkQuery = ctx.query();
    if query.template.is_some() {
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{TEMPLATE_FILE_NAME}\""),
                ),
            ],
            bulk_template_csv(),
        )
            .into_response());
    }
    Ok(BulkUploadTemplate::new(&ctx, None).into_response())
}

#[instrument(skip(ctx, form))]
pub async fn action(ctx: Ctx, mut form: UploadedForm) -> Result<Response, AppError> {
    let Some(file) = form.take_files("file").into_iter().next() else {
        return Ok(ctx.failure(PATH, "Choose a CSV file to upload"));
    };

    let report = match parse_bulk_csv(file.bytes.as_slice()) {
        Ok(report) => report,
        Err(err) => {
            warn!(file = %file.file_name, error = %err, "Bulk file rejected");
            let outcome = UploadOutcome::rejected(&file.file_name, err.to_string());
            return Ok(BulkUploadTemplate::new(&ctx, Some(outcome)).into_response());
        }
    };

    let outcome = UploadOutcome::checked(&file.file_name, &report);
    if !report.is_valid() {
        info!(
            file = %file.file_name,
            rows = report.total(),
            errors = report.errors.len(),
            "Bulk file has row errors"
        );
        return Ok(BulkUploadTemplate::new(&ctx, Some(outcome)).into_response());
    }

    let reply = match ctx.api.bulk_upload(&file.file_name, file.bytes).await {
        Ok(reply) => reply,
        Err(err) => return ctx.finish(PATH, Err(err.into())),
    };
    info!(created = reply.created, failed = reply.failed, "Bulk upload finished");
    Ok(BulkUploadTemplate::new(&ctx, Some(outcome.with_reply(reply))).into_response())
}
