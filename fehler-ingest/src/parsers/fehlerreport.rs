//! Fehlerreport text parser (ARMANDA / NETRON)
//!
//! Two layouts show up after PDF-to-text:
//!
//! A rejection table, one rejected debit per line, each starting with the
//! debit file name:
//!   Dateiname                     Name              Kundennummer  Fehler
//!   PPS_DB_15new_20250301.xml     Max Mustermann    100234        KC2-BL001
//!
//! A labelled form, one field per label:
//!   IBAN: DE02 1203 0000 0000 2020 51   BIC: BYLADEM1001
//!   Fehlercode: KC2-BL001
//!
//! Labels are matched case-insensitively at the start of a line or after
//! whitespace. A value runs until the next label on the same line; a label
//! that ends its line takes the following line as value. The first value
//! seen for a field wins.

use regex::Regex;
use std::sync::OnceLock;

use fehler_core::{
    ConversionRules, Field, ReportRecord, normalize_amount, normalize_bic, normalize_date,
    normalize_iban,
};

/// Built-in label table. Extend through `ConversionRules::labels`.
pub const BUILTIN_LABELS: &[(&str, Field)] = &[
    ("Status:", Field::Status),
    ("End-to-End-ID:", Field::EndToEndId),
    ("End to End ID:", Field::EndToEndId),
    ("EndToEndId:", Field::EndToEndId),
    ("Händler:", Field::Merchant),
    ("Merchant:", Field::Merchant),
    ("Gläubiger:", Field::Merchant),
    ("Betrag:", Field::Amount),
    ("Amount:", Field::Amount),
    ("Fälligkeitsdatum:", Field::DueDate),
    ("Fällig am:", Field::DueDate),
    ("Due date:", Field::DueDate),
    ("BIC:", Field::CustomerBic),
    ("IBAN:", Field::CustomerIban),
    ("Kundenname:", Field::CustomerName),
    ("Kontoinhaber:", Field::CustomerName),
    ("Name:", Field::CustomerName),
    ("Kundennummer:", Field::CustomerId),
    ("Customer ID:", Field::CustomerId),
    ("Importdatum:", Field::ImportedDate),
    ("Eingelesen am:", Field::ImportedDate),
    ("Mandatsreferenz:", Field::MandateReference),
    ("Mandate reference:", Field::MandateReference),
    ("Verwendungszweck:", Field::TransactionInformation),
    ("Transaktionsart:", Field::TransactionTypeName),
    ("Fehlercode:", Field::ErrorCode),
    ("Error code:", Field::ErrorCode),
    ("Fehlergrund:", Field::ErrorReason),
    ("Fehlerbeschreibung:", Field::ErrorReason),
    ("Error reason:", Field::ErrorReason),
    ("Produkt:", Field::MerchantProductName),
    ("Rücklastschrift:", Field::HasChargeback),
    ("Chargeback:", Field::HasChargeback),
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct LabelRule {
    label: String,
    field: Field,
}

/// One line of the rejection table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Debit file the rejection refers to (carries date and product code)
    pub file_token: String,
    pub customer_name: String,
    pub customer_id: String,
    pub error_code: String,
}

/// Everything recognized in one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReport {
    /// Fields found through labels, normalized
    pub labelled: ReportRecord,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    start: usize,
    end: usize,
    field: Field,
}

#[derive(Debug, Clone)]
pub struct FehlerreportParser {
    labels: Vec<LabelRule>,
}

impl Default for FehlerreportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FehlerreportParser {
    pub fn new() -> Self {
        Self {
            labels: BUILTIN_LABELS
                .iter()
                .map(|(label, field)| LabelRule {
                    label: label.to_string(),
                    field: *field,
                })
                .collect(),
        }
    }

    /// Built-in labels plus the extra labels configured in `rules`.
    pub fn with_rules(rules: &ConversionRules) -> Self {
        let mut parser = Self::new();
        parser
            .labels
            .extend(rules.labels.iter().map(|(label, field)| LabelRule {
                label: label.trim().to_string(),
                field: *field,
            }));
        parser.labels.retain(|r| !r.label.is_empty());
        parser
    }

    /// Parse extracted lines. Never fails: unknown lines are ignored.
    pub fn parse(&self, lines: &[String]) -> ParsedReport {
        let mut report = ParsedReport::default();
        let mut skip_next = false;

        for (idx, raw) in lines.iter().enumerate() {
            if skip_next {
                skip_next = false;
                continue;
            }
            let line = raw.trim();
            let hits = self.find_hits(line);

            if hits.is_empty() {
                if let Some(row) = parse_table_row(line) {
                    report.rows.push(row);
                }
                continue;
            }

            for (k, hit) in hits.iter().enumerate() {
                let value_end = hits.get(k + 1).map_or(line.len(), |h| h.start);
                let mut value = line[hit.end..value_end].trim();

                if value.is_empty() && k + 1 == hits.len() {
                    if let Some(next) = lines.get(idx + 1).map(|l| l.trim()) {
                        if !next.is_empty() && self.find_hits(next).is_empty() {
                            value = next;
                            skip_next = true;
                        }
                    }
                }

                if !value.is_empty() {
                    report.labelled.fill(hit.field, &normalize_value(hit.field, value));
                }
            }
        }

        log::debug!(
            "parsed {} table row(s), {} labelled field(s)",
            report.rows.len(),
            Field::ALL.iter().filter(|f| !report.labelled.is_blank(**f)).count()
        );
        report
    }

    /// Label occurrences in `line`, ordered and non-overlapping.
    fn find_hits(&self, line: &str) -> Vec<Hit> {
        let mut hits: Vec<Hit> = Vec::new();

        for (start, _) in line.char_indices() {
            if hits.last().is_some_and(|h| start < h.end) {
                continue;
            }
            let at_boundary = line[..start]
                .chars()
                .next_back()
                .is_none_or(char::is_whitespace);
            if !at_boundary {
                continue;
            }

            let rest = &line[start..];
            let best = self
                .labels
                .iter()
                .filter_map(|rule| {
                    strip_prefix_ci(rest, &rule.label).map(|tail| (line.len() - tail.len(), rule.field))
                })
                .max_by_key(|(end, _)| *end);

            if let Some((end, field)) = best {
                hits.push(Hit { start, end, field });
            }
        }

        hits
    }
}

/// Case-insensitive `strip_prefix`.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = s.chars();
    for expected in prefix.chars() {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.as_str())
}

fn normalize_value(field: Field, raw: &str) -> String {
    match field {
        f if f.is_date() => normalize_date(raw),
        Field::Amount => normalize_amount(raw),
        Field::CustomerIban => normalize_iban(raw),
        Field::CustomerBic => normalize_bic(raw),
        _ => raw.trim().to_string(),
    }
}

fn table_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^Dateiname\s+Name\s+Kundennummer\s+Fehler$").expect("static pattern")
    })
}

/// Debit file names carry an extension or a `YYYYMMDD` stamp.
fn debit_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.[A-Za-z0-9]{2,4}$|20\d{6}").expect("static pattern"))
}

/// `<file> <name ...> <customer id> <error code>`
fn parse_table_row(line: &str) -> Option<TableRow> {
    if table_heading_re().is_match(line) {
        return None;
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }

    if !debit_file_re().is_match(parts[0]) {
        return None;
    }

    let n = parts.len();
    let customer_id = parts[n - 2];
    if !customer_id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(TableRow {
        file_token: parts[0].to_string(),
        customer_name: parts[1..n - 2].join(" "),
        customer_id: customer_id.to_string(),
        error_code: parts[n - 1].to_string(),
    })
}
