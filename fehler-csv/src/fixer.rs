//! Rewrite arbitrary or malformed CSV exports into the canonical header.
//!
//! Input columns are matched to canonical fields by normalized name
//! (case, whitespace, `_`, `-` and `.` ignored), then through a synonym
//! table. Unknown columns are dropped. Under the canonical header, rows
//! whose width does not match are repaired positionally; under any other
//! header the cells present are remapped by name. Every input row produces
//! exactly one output row, in input order.

use anyhow::{Context, Result};
use regex::Regex;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::OnceLock;

use fehler_core::{FIELD_COUNT, Field, ReportRecord};

use crate::writer::write_rows;

/// Known alternative column names, already normalized.
const SYNONYMS: &[(&str, Field)] = &[
    ("e2eid", Field::EndToEndId),
    ("endtoend", Field::EndToEndId),
    ("haendler", Field::Merchant),
    ("händler", Field::Merchant),
    ("glaeubiger", Field::Merchant),
    ("gläubiger", Field::Merchant),
    ("betrag", Field::Amount),
    ("faelligkeitsdatum", Field::DueDate),
    ("fälligkeitsdatum", Field::DueDate),
    ("faelligkeit", Field::DueDate),
    ("fälligkeit", Field::DueDate),
    ("bic", Field::CustomerBic),
    ("swift", Field::CustomerBic),
    ("iban", Field::CustomerIban),
    ("name", Field::CustomerName),
    ("kundenname", Field::CustomerName),
    ("kontoinhaber", Field::CustomerName),
    ("kundennummer", Field::CustomerId),
    ("kundenid", Field::CustomerId),
    ("importdatum", Field::ImportedDate),
    ("mandatsreferenz", Field::MandateReference),
    ("mandateref", Field::MandateReference),
    ("verwendungszweck", Field::TransactionInformation),
    ("transaktionsart", Field::TransactionTypeName),
    ("fehler", Field::ErrorCode),
    ("fehlercode", Field::ErrorCode),
    ("fehlergrund", Field::ErrorReason),
    ("reason", Field::ErrorReason),
    ("produkt", Field::MerchantProductName),
    ("product", Field::MerchantProductName),
    ("chargeback", Field::HasChargeback),
    ("ruecklastschrift", Field::HasChargeback),
    ("rücklastschrift", Field::HasChargeback),
];

/// Columns copied verbatim when a row has to be repaired (STATUS..CUSTOMER ID).
const STABLE_PREFIX: usize = 9;

fn mandate_like_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{6,}-\d{4}-\d{2}-\d{2}$").expect("static pattern"))
}

/// Lowercase, without whitespace, `_`, `-`, `.` or a leading BOM.
pub fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '-' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn lookup_field(name: &str) -> Option<Field> {
    if let Some(field) = Field::from_name(name) {
        return Some(field);
    }
    let norm = normalize_header(name);
    if norm.is_empty() {
        return None;
    }
    Field::ALL
        .iter()
        .copied()
        .find(|f| normalize_header(f.name()) == norm)
        .or_else(|| {
            SYNONYMS
                .iter()
                .find(|(syn, _)| *syn == norm)
                .map(|(_, f)| *f)
        })
}

/// Input column index -> canonical field
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMapping {
    targets: Vec<Option<Field>>,
    dropped: Vec<String>,
}

impl HeaderMapping {
    /// Resolve every input column. When two columns resolve to the same
    /// field, the first one keeps it.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Self {
        let mut taken = [false; FIELD_COUNT];
        let mut targets = Vec::with_capacity(header.len());
        let mut dropped = Vec::new();

        for name in header {
            let name = name.as_ref();
            match lookup_field(name) {
                Some(field) if !taken[field.index()] => {
                    taken[field.index()] = true;
                    targets.push(Some(field));
                }
                _ => {
                    dropped.push(name.trim_start_matches('\u{feff}').to_string());
                    targets.push(None);
                }
            }
        }

        Self { targets, dropped }
    }

    pub fn width(&self) -> usize {
        self.targets.len()
    }

    /// True when every column resolves, in order, to the canonical header.
    pub fn is_canonical(&self) -> bool {
        self.targets.len() == FIELD_COUNT
            && self
                .targets
                .iter()
                .zip(Field::ALL)
                .all(|(target, field)| *target == Some(field))
    }

    pub fn field_for(&self, column: usize) -> Option<Field> {
        self.targets.get(column).copied().flatten()
    }

    /// Input column names that map to nothing.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    /// Remap one row by column position. Values are copied verbatim; missing
    /// cells stay empty and cells past the header are ignored.
    pub fn apply<S: AsRef<str>>(&self, row: &[S]) -> ReportRecord {
        let mut values: [String; FIELD_COUNT] = Default::default();
        for (column, value) in row.iter().enumerate() {
            if let Some(field) = self.field_for(column) {
                values[field.index()] = value.as_ref().to_string();
            }
        }
        ReportRecord::from_values(values)
    }
}

/// Positional repair for a row of unexpected width.
///
/// The leading columns up to CUSTOMER ID are kept, a `<id>-YYYY-MM-DD`
/// value becomes TRANSACTION INFORMATION and the last two non-empty values
/// become ERROR CODE and ERROR REASON.
pub fn repair_row<S: AsRef<str>>(row: &[S]) -> ReportRecord {
    let values: Vec<&str> = row.iter().map(AsRef::as_ref).collect();
    let mut rec = ReportRecord::from_values(values.iter().take(STABLE_PREFIX).copied());

    if let Some(info) = values.iter().find(|v| mandate_like_re().is_match(v)) {
        rec.set(Field::TransactionInformation, *info);
    }

    let tail: Vec<&str> = values.iter().copied().filter(|v| !v.is_empty()).collect();
    match tail.as_slice() {
        [] => {}
        [only] => rec.set(Field::ErrorCode, *only),
        [.., code, reason] => {
            rec.set(Field::ErrorCode, *code);
            rec.set(Field::ErrorReason, *reason);
        }
    }

    rec
}

/// Outcome of one fixer run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixReport {
    pub rows: usize,
    /// Rows rebuilt by positional repair
    pub repaired: usize,
    pub dropped_columns: Vec<String>,
}

fn sniff_delimiter(first_line: &str) -> u8 {
    [b';', b',', b'\t']
        .into_iter()
        .find(|d| first_line.as_bytes().contains(d))
        .unwrap_or(b';')
}

fn fix_text<W: Write>(text: &str, output: W) -> Result<FixReport> {
    let text = text.trim_start_matches('\u{feff}');
    let delimiter = sniff_delimiter(text.lines().next().unwrap_or(""));

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = rdr.records();
    let mut report = FixReport::default();
    let mut rows: Vec<[String; FIELD_COUNT]> = Vec::new();

    let Some(header) = records.next() else {
        write_rows(output, &rows)?;
        return Ok(report);
    };
    let header = header.context("reading header row")?;
    let header: Vec<&str> = header.iter().collect();
    let mapping = HeaderMapping::from_header(&header);

    if !mapping.dropped().is_empty() {
        log::warn!("dropping unmatched column(s): {}", mapping.dropped().join(", "));
    }
    report.dropped_columns = mapping.dropped().to_vec();

    for (i, result) in records.enumerate() {
        let record = result.with_context(|| format!("reading row {}", i + 2))?;
        let fields: Vec<&str> = record.iter().collect();

        let rec = if fields.len() == mapping.width() || !mapping.is_canonical() {
            if fields.len() != mapping.width() {
                log::debug!(
                    "row {} has {} field(s) under a {}-column header",
                    i + 2,
                    fields.len(),
                    mapping.width()
                );
            }
            mapping.apply(&fields)
        } else {
            log::debug!("repairing row {} ({} fields)", i + 2, fields.len());
            report.repaired += 1;
            repair_row(&fields)
        };
        rows.push(rec.into_values());
    }

    report.rows = rows.len();
    write_rows(output, &rows)?;
    Ok(report)
}

/// Fix CSV text from `input` into `output`.
pub fn fix_reader<R: Read, W: Write>(input: R, output: W) -> Result<FixReport> {
    let text = std::io::read_to_string(input).context("reading CSV input")?;
    fix_text(&text, output)
}

/// Fix `input` into `output`. The input is read completely before the
/// output is created, so both may name the same file.
pub fn fix_csv(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<FixReport> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let text = std::fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;

    let file = std::fs::File::create(output).with_context(|| format!("create {}", output.display()))?;
    let report = fix_text(&text, std::io::BufWriter::new(file))
        .with_context(|| format!("fixing {} -> {}", input.display(), output.display()))?;

    log::info!(
        "fixed {} row(s) from {} ({} repaired)",
        report.rows,
        input.display(),
        report.repaired
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fehler_core::CSV_HEADER;

    fn fix(input: &str) -> (String, FixReport) {
        let mut out = Vec::new();
        let report = fix_reader(input.as_bytes(), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), report)
    }

    fn cells(line: &str) -> Vec<&str> {
        line.split(';').collect()
    }

    #[test]
    fn test_lowercase_reordered_synonyms() {
        let (out, report) = fix("Iban;Bic;Name\nDE02120300000000202051;BYLADEM1001;Max Mustermann\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], CSV_HEADER.join(";"));

        let row = cells(lines[1]);
        assert_eq!(row.len(), FIELD_COUNT);
        assert_eq!(row[Field::CustomerIban.index()], "DE02120300000000202051");
        assert_eq!(row[Field::CustomerBic.index()], "BYLADEM1001");
        assert_eq!(row[Field::CustomerName.index()], "Max Mustermann");
        let filled = row.iter().filter(|v| !v.is_empty()).count();
        assert_eq!(filled, 3);
        assert_eq!(report.rows, 1);
        assert!(report.dropped_columns.is_empty());
    }

    #[test]
    fn test_normalized_canonical_names() {
        let mapping = HeaderMapping::from_header(&["\u{feff}customer_iban", "End-To-End Id", " ERROR  CODE "]);
        assert_eq!(mapping.field_for(0), Some(Field::CustomerIban));
        assert_eq!(mapping.field_for(1), Some(Field::EndToEndId));
        assert_eq!(mapping.field_for(2), Some(Field::ErrorCode));
    }

    #[test]
    fn test_unknown_and_duplicate_columns_are_dropped() {
        let mapping = HeaderMapping::from_header(&["IBAN", "Notiz", "Customer IBAN"]);
        assert_eq!(mapping.field_for(0), Some(Field::CustomerIban));
        assert_eq!(mapping.field_for(1), None);
        assert_eq!(mapping.field_for(2), None);
        assert_eq!(mapping.dropped(), ["Notiz".to_string(), "Customer IBAN".to_string()]);
    }

    #[test]
    fn test_comma_delimited_input() {
        let (out, _) = fix("Kundennummer,Fehler\n100234,KC2-BL001\n");
        let row = cells(out.lines().nth(1).unwrap()).into_iter().map(str::to_string).collect::<Vec<_>>();
        assert_eq!(row[Field::CustomerId.index()], "100234");
        assert_eq!(row[Field::ErrorCode.index()], "KC2-BL001");
    }

    #[test]
    fn test_rows_keep_order_and_count() {
        let (out, report) = fix("Name\nA\nB\nC\n");
        let names: Vec<String> = out
            .lines()
            .skip(1)
            .map(|l| cells(l)[Field::CustomerName.index()].to_string())
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(report.rows, 3);
    }

    #[test]
    fn test_malformed_row_is_repaired() {
        let header = CSV_HEADER.join(";");
        // 13 fields instead of 19: trailing columns collapsed by a broken export
        let broken = "REJECTED;;PPS;54.90;;;DE02;Max Mustermann;100234;;100234-2025-03-01;KC2-BL001;User in the Blacklist";
        let (out, report) = fix(&format!("{header}\n{broken}\n"));

        let row = cells(out.lines().nth(1).unwrap()).into_iter().map(str::to_string).collect::<Vec<_>>();
        assert_eq!(row.len(), FIELD_COUNT);
        assert_eq!(row[Field::CustomerId.index()], "100234");
        assert_eq!(row[Field::TransactionInformation.index()], "100234-2025-03-01");
        assert_eq!(row[Field::ErrorCode.index()], "KC2-BL001");
        assert_eq!(row[Field::ErrorReason.index()], "User in the Blacklist");
        assert_eq!(report.repaired, 1);
    }

    #[test]
    fn test_short_and_long_rows_under_named_header() {
        let (out, report) = fix(
            "Iban;Bic;Name\n\
DE02120300000000202051;BYLADEM1001\n\
DE89370400440532013000;COBADEFFXXX;Erika Musterfrau;extra\n",
        );
        let rows: Vec<Vec<&str>> = out.lines().skip(1).map(cells).collect();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0][Field::CustomerIban.index()], "DE02120300000000202051");
        assert_eq!(rows[0][Field::CustomerBic.index()], "BYLADEM1001");
        assert_eq!(rows[0][Field::Status.index()], "");
        assert_eq!(rows[0][Field::ErrorCode.index()], "");

        assert_eq!(rows[1][Field::CustomerName.index()], "Erika Musterfrau");
        assert!(!rows[1].contains(&"extra"));
        assert_eq!(report.repaired, 0);
    }

    #[test]
    fn test_canonical_header_detection() {
        assert!(HeaderMapping::from_header(&CSV_HEADER).is_canonical());
        let lowered: Vec<String> = CSV_HEADER.iter().map(|h| h.to_lowercase()).collect();
        assert!(HeaderMapping::from_header(&lowered).is_canonical());

        let mut swapped = CSV_HEADER;
        swapped.swap(0, 1);
        assert!(!HeaderMapping::from_header(&swapped).is_canonical());
        assert!(!HeaderMapping::from_header(&["Iban", "Bic", "Name"]).is_canonical());
    }

    #[test]
    fn test_repair_with_single_value() {
        let rec = repair_row(&["", "", "only"]);
        assert_eq!(rec.get(Field::Merchant), "only");
        assert_eq!(rec.get(Field::ErrorCode), "only");
        assert_eq!(rec.get(Field::ErrorReason), "");
    }

    #[test]
    fn test_empty_input_gives_header_only() {
        let (out, report) = fix("");
        assert_eq!(out, format!("{}\n", CSV_HEADER.join(";")));
        assert_eq!(report, FixReport::default());
    }

    #[test]
    fn test_fix_csv_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        std::fs::write(&path, "IBAN;Name\nDE02;Max\n").unwrap();

        fix_csv(&path, &path).unwrap();
        let out = std::fs::read_to_string(&path).unwrap();
        assert!(out.starts_with("STATUS;END TO END ID;"));
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fix_csv(dir.path().join("nope.csv"), dir.path().join("out.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.csv"));
        assert!(!dir.path().join("out.csv").exists());
    }
}
