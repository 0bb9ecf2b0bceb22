//! Turn a parsed report into records, filling gaps from filename conventions.
//!
//! Precedence per field: text from the document, then the table row's file
//! token, then the report's own filename.

use fehler_core::normalize::DATE_FORMAT;
use fehler_core::{ConversionRules, Field, ReportRecord, first_of_month, parse_date};

use crate::filename::{FilenameHints, resolve_filename};
use crate::parsers::fehlerreport::{FehlerreportParser, ParsedReport, TableRow};

/// Build one record per table row, or a single record from the labelled
/// fields when the document has no table.
pub fn build_records(
    report: &ParsedReport,
    source_name: &str,
    rules: &ConversionRules,
) -> Vec<ReportRecord> {
    let report_hints = resolve_filename(source_name, rules);

    if report.rows.is_empty() {
        return vec![apply_hints(report.labelled.clone(), &[&report_hints])];
    }

    report
        .rows
        .iter()
        .map(|row| {
            let mut rec = row_record(row);
            rec.merge_missing(&report.labelled);
            let row_hints = resolve_filename(&row.file_token, rules);
            apply_hints(rec, &[&row_hints, &report_hints])
        })
        .collect()
}

/// Parse extracted lines and build records in one step.
pub fn records_from_lines(
    lines: &[String],
    source_name: &str,
    parser: &FehlerreportParser,
    rules: &ConversionRules,
) -> Vec<ReportRecord> {
    build_records(&parser.parse(lines), source_name, rules)
}

fn row_record(row: &TableRow) -> ReportRecord {
    let mut rec = ReportRecord::new();
    rec.set(Field::CustomerName, row.customer_name.as_str());
    rec.set(Field::CustomerId, row.customer_id.as_str());
    rec.set(Field::ErrorCode, row.error_code.as_str());
    rec
}

fn apply_hints(mut rec: ReportRecord, hints: &[&FilenameHints]) -> ReportRecord {
    if let Some(date) = hints.iter().find_map(|h| h.date) {
        rec.fill(Field::DueDate, &date.format(DATE_FORMAT).to_string());
    }
    if let Some(amount) = hints.iter().find_map(|h| h.amount.as_deref()) {
        rec.fill(Field::Amount, amount);
    }

    // `<customer id>-<first of month>`, the mandate-style reference
    if rec.is_blank(Field::TransactionInformation) && !rec.is_blank(Field::CustomerId) {
        let id = rec.get(Field::CustomerId).to_string();
        let info = match parse_date(rec.get(Field::DueDate)) {
            Some(date) => format!("{}-{}", id, first_of_month(date).format(DATE_FORMAT)),
            None => id,
        };
        rec.set(Field::TransactionInformation, info);
    }

    rec
}
