//! The bulk product upload CSV format.
//!
//! A bulk file has exactly [`BULK_COLUMNS`] in order. Header names are
//! compared loosely (`Crossed Price`, `crossed_price` and `crossedprice`
//! are the same column). A file whose header or column count is wrong is
//! rejected outright; value problems are reported per row so the user
//! can fix them all in one go.

use std::io::Read;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::{MAX_PRODUCT_IMAGES, ProductInput, ValidationError};
use crate::types::ProductStatus;

/// Column names, in file order.
pub const BULK_COLUMNS: [&str; 13] = [
    "name",
    "crossed_price",
    "cost_price",
    "selling_price",
    "status",
    "image_1",
    "image_2",
    "image_3",
    "image_4",
    "image_5",
    "image_6",
    "quantity",
    "section",
];

/// Largest number of data rows accepted in one file.
pub const MAX_BULK_ROWS: usize = 1000;

const FIRST_IMAGE: usize = 5;

/// Reasons a whole bulk file is rejected.
#[derive(Debug, Error)]
pub enum BulkUploadError {
    #[error("could not read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("expected {expected} columns, header has {found}")]
    HeaderCount { expected: usize, found: usize },
    #[error("column {position} should be '{expected}', found '{found}'")]
    HeaderName {
        position: usize,
        expected: &'static str,
        found: String,
    },
    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("file has no product rows")]
    Empty,
    #[error("file has more than {max} rows")]
    TooManyRows { max: usize },
}

/// A value problem in one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// 1-based line in the file, header included.
    pub line: u64,
    pub column: &'static str,
    pub message: String,
}

/// One valid data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkProductRow {
    pub line: u64,
    pub name: String,
    pub crossed_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Decimal,
    pub status: ProductStatus,
    pub images: Vec<String>,
    pub quantity: i64,
    pub section: Option<String>,
}

impl From<BulkProductRow> for ProductInput {
    fn from(row: BulkProductRow) -> Self {
        Self {
            name: row.name,
            description: None,
            crossed_price: row.crossed_price,
            cost_price: row.cost_price,
            selling_price: row.selling_price,
            status: row.status,
            quantity: row.quantity,
            section: row.section,
            category: None,
            images: row.images,
        }
    }
}

/// Outcome of checking a well-formed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub rows: Vec<BulkProductRow>,
    pub errors: Vec<RowError>,
}

impl BulkReport {
    /// Whether every row parsed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total data rows seen.
    #[must_use]
    pub fn total(&self) -> usize {
        let mut lines: Vec<u64> = self.errors.iter().map(|e| e.line).collect();
        lines.dedup();
        self.rows.len() + lines.len()
    }
}

fn normalize(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Parse and check a bulk upload file.
///
/// # Errors
///
/// Returns [`BulkUploadError`] when the file is unreadable, its header is
/// wrong, a row has the wrong number of columns, or it has no rows.
pub fn parse_bulk_csv<R: Read>(input: R) -> Result<BulkReport, BulkUploadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    if headers.len() != BULK_COLUMNS.len() {
        return Err(BulkUploadError::HeaderCount {
            expected: BULK_COLUMNS.len(),
            found: headers.len(),
        });
    }
    for (position, (found, expected)) in headers.iter().zip(BULK_COLUMNS).enumerate() {
        if normalize(found) != normalize(expected) {
            return Err(BulkUploadError::HeaderName {
                position: position + 1,
                expected,
                found: found.to_string(),
            });
        }
    }

    let mut report = BulkReport::default();
    let mut seen = 0usize;
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != BULK_COLUMNS.len() {
            return Err(BulkUploadError::ColumnCount {
                line,
                expected: BULK_COLUMNS.len(),
                found: record.len(),
            });
        }
        seen += 1;
        if seen > MAX_BULK_ROWS {
            return Err(BulkUploadError::TooManyRows { max: MAX_BULK_ROWS });
        }

        let fields: Vec<&str> = record.iter().collect();
        match parse_row(line, &fields).and_then(apply_form_rules) {
            Ok(row) => report.rows.push(row),
            Err(mut errors) => report.errors.append(&mut errors),
        }
    }

    if seen == 0 {
        return Err(BulkUploadError::Empty);
    }
    Ok(report)
}

fn parse_row(line: u64, fields: &[&str]) -> Result<BulkProductRow, Vec<RowError>> {
    let mut errors = Vec::new();
    let mut fail = |column: &'static str, message: String| {
        errors.push(RowError {
            line,
            column,
            message,
        });
    };

    let name = fields[0].to_string();
    if name.is_empty() {
        fail(BULK_COLUMNS[0], "is required".to_string());
    }

    let mut amount = |index: usize, required: bool| -> Option<Decimal> {
        let raw = fields[index].replace(',', "");
        if raw.is_empty() {
            if required {
                fail(BULK_COLUMNS[index], "is required".to_string());
            }
            return None;
        }
        match raw.parse::<Decimal>() {
            Ok(value) if value.is_sign_negative() && !value.is_zero() => {
                fail(BULK_COLUMNS[index], "cannot be negative".to_string());
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                fail(BULK_COLUMNS[index], format!("'{raw}' is not a number"));
                None
            }
        }
    };
    let crossed_price = amount(1, false);
    let cost_price = amount(2, false);
    let selling_price = amount(3, true);

    let status = if fields[4].is_empty() {
        Some(ProductStatus::default())
    } else {
        fields[4]
            .parse::<ProductStatus>()
            .map_err(|e| fail(BULK_COLUMNS[4], e))
            .ok()
    };

    let mut images = Vec::new();
    for (offset, raw) in fields[FIRST_IMAGE..FIRST_IMAGE + MAX_PRODUCT_IMAGES]
        .iter()
        .enumerate()
    {
        if raw.is_empty() {
            continue;
        }
        match url::Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                images.push((*raw).to_string());
            }
            _ => fail(
                BULK_COLUMNS[FIRST_IMAGE + offset],
                "must be an http(s) URL".to_string(),
            ),
        }
    }

    let quantity = if fields[11].is_empty() {
        Some(0)
    } else {
        match fields[11].parse::<i64>() {
            Ok(q) if q >= 0 => Some(q),
            Ok(_) => {
                fail(BULK_COLUMNS[11], "cannot be negative".to_string());
                None
            }
            Err(_) => {
                fail(BULK_COLUMNS[11], format!("'{}' is not a whole number", fields[11]));
                None
            }
        }
    };

    let section = Some(fields[12].to_string()).filter(|s| !s.is_empty());

    match (selling_price, status, quantity) {
        (Some(selling_price), Some(status), Some(quantity)) if errors.is_empty() => {
            Ok(BulkProductRow {
                line,
                name,
                crossed_price,
                cost_price,
                selling_price,
                status,
                images,
                quantity,
                section,
            })
        }
        _ => Err(errors),
    }
}

/// Hold a parsed row to the same rules as the product form.
fn apply_form_rules(row: BulkProductRow) -> Result<BulkProductRow, Vec<RowError>> {
    match validate_row(&row) {
        Ok(()) => Ok(row),
        Err(err) => {
            let field = err.field();
            let column = BULK_COLUMNS
                .iter()
                .find(|column| normalize(column) == normalize(field))
                .copied()
                .unwrap_or(field);
            let text = err.to_string();
            let message = text
                .strip_prefix(field)
                .map_or(text.as_str(), str::trim_start)
                .to_string();
            Err(vec![RowError {
                line: row.line,
                column,
                message,
            }])
        }
    }
}

/// A downloadable template: the header and one example row.
#[must_use]
pub fn bulk_template_csv() -> String {
    let example = [
        "Dhaka Topi",
        "1200",
        "600",
        "950",
        "active",
        "https://example.com/topi.jpg",
        "",
        "",
        "",
        "",
        "",
        "25",
        "New Arrivals",
    ];
    format!("{}\n{}\n", BULK_COLUMNS.join(","), example.join(","))
}

/// Check a parsed row against the product form rules.
///
/// # Errors
///
/// Returns the first rule the row breaks.
pub fn validate_row(row: &BulkProductRow) -> Result<(), ValidationError> {
    ProductInput::from(row.clone()).validate(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const HEADER: &str = "Name,Crossed Price,Cost Price,Selling Price,Status,Image 1,Image 2,Image 3,Image 4,Image 5,Image 6,Quantity,Section";

    fn csv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_template_parses() {
        let report = parse_bulk_csv(bulk_template_csv().as_bytes()).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].images.len(), 1);
        assert!(validate_row(&report.rows[0]).is_ok());
    }

    #[test]
    fn test_valid_rows() {
        let data = csv(&[
            "Topi,1000,500,800,active,https://cdn/a.jpg,https://cdn/b.jpg,,,,,4,Hats",
            "Shawl,,,\"1,500\",draft,,,,,,,,",
        ]);
        let report = parse_bulk_csv(data.as_bytes()).unwrap();
        assert!(report.is_valid());
        let shawl = &report.rows[1];
        assert_eq!(shawl.selling_price, Decimal::new(1500, 0));
        assert_eq!(shawl.status, ProductStatus::Draft);
        assert_eq!(shawl.quantity, 0);
        assert!(shawl.section.is_none());
        assert_eq!(shawl.line, 3);

        let input = ProductInput::from(report.rows[0].clone());
        assert_eq!(input.images.len(), 2);
    }

    #[test]
    fn test_form_rules_apply_to_rows() {
        let long_name = "x".repeat(300);
        let data = csv(&[
            &format!("{long_name},,,10,,,,,,,,,"),
            "Topi,,,10,,,,,,,,,",
        ]);
        let report = parse_bulk_csv(data.as_bytes()).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(
            report.errors,
            vec![RowError {
                line: 2,
                column: "name",
                message: "must be at most 200 characters".to_string(),
            }]
        );
    }

    #[test]
    fn test_wrong_header_name() {
        let data = HEADER.replace("Cost Price", "Weight") + "\nTopi,,,1,,,,,,,,,";
        let err = parse_bulk_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, BulkUploadError::HeaderName { position: 3, .. }));
    }

    #[test]
    fn test_wrong_header_count() {
        let err = parse_bulk_csv("name,selling_price\nTopi,1".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            BulkUploadError::HeaderCount {
                expected: 13,
                found: 2
            }
        ));
    }

    #[test]
    fn test_wrong_row_width() {
        let data = csv(&["Topi,1000,500,800"]);
        let err = parse_bulk_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, BulkUploadError::ColumnCount { line: 2, found: 4, .. }));
    }

    #[test]
    fn test_row_errors_are_collected() {
        let data = csv(&[
            ",abc,,-5,archived,ftp://x,,,,,,-1,",
            "Good,,,10,,,,,,,,,",
        ]);
        let report = parse_bulk_csv(data.as_bytes()).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.rows.len(), 1);
        let columns: Vec<_> = report.errors.iter().map(|e| e.column).collect();
        assert_eq!(
            columns,
            vec!["name", "crossed_price", "selling_price", "status", "image_1", "quantity"]
        );
        assert!(report.errors.iter().all(|e| e.line == 2));
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn test_empty_file() {
        let err = parse_bulk_csv(HEADER.as_bytes()).unwrap_err();
        assert!(matches!(err, BulkUploadError::Empty));
    }
}
