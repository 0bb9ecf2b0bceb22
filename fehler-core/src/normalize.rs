//! Value normalization: dates, amounts, IBAN/BIC.
//!
//! Every function here is total. Input that cannot be understood is
//! returned as the trimmed raw text instead of failing the record.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Canonical output format for every date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy)]
enum Order {
    Dmy,
    Ymd,
}

fn date_patterns() -> &'static [(Regex, Order)] {
    static PATTERNS: OnceLock<Vec<(Regex, Order)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // 15.03.2025 / 15.03.25
            (r"\b(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2})\b", Order::Dmy),
            // 2025-03-15
            (r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b", Order::Ymd),
            // 15/03/2025
            (r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b", Order::Dmy),
            // 20250315
            (r"\b(\d{4})(\d{2})(\d{2})\b", Order::Ymd),
        ]
        .into_iter()
        .map(|(p, o)| (Regex::new(p).expect("static date pattern"), o))
        .collect()
    })
}

fn expand_year(raw: &str) -> Option<i32> {
    let y: i32 = raw.parse().ok()?;
    Some(if raw.len() == 2 { 2000 + y } else { y })
}

/// Parse the first recognizable date in `raw`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for (re, order) in date_patterns() {
        let Some(caps) = re.captures(raw) else {
            continue;
        };
        let (y, m, d) = match order {
            Order::Dmy => (&caps[3], &caps[2], &caps[1]),
            Order::Ymd => (&caps[1], &caps[2], &caps[3]),
        };
        let date = NaiveDate::from_ymd_opt(expand_year(y)?, m.parse().ok()?, d.parse().ok()?);
        if date.is_some() {
            return date;
        }
    }
    None
}

/// Normalize a date to `YYYY-MM-DD`, or keep the raw text.
pub fn normalize_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(d) => d.format(DATE_FORMAT).to_string(),
        None => raw.trim().to_string(),
    }
}

/// First day of the month `date` falls in.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parse German (`1.234,56 €`) or plain (`54.90`) amount notation.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches("EUR")
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let canonical = match (last_comma, last_dot) {
        // 1.234,56
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        // 1,234.56
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // 1,234,567
        (Some(_), None) if cleaned.matches(',').count() > 1 && is_grouped(&cleaned, ',') => {
            cleaned.replace(',', "")
        }
        (Some(_), None) => cleaned.replace(',', "."),
        // 1.234 or 1.234.567
        (None, Some(_)) if is_grouped(&cleaned, '.') => cleaned.replace('.', ""),
        _ => cleaned,
    };
    canonical.parse().ok()
}

/// Thousands grouping: every group after the first has exactly three digits.
fn is_grouped(s: &str, sep: char) -> bool {
    let mut groups = s.split(sep);
    let lead = groups.next().unwrap_or("").trim_start_matches('-');
    !lead.is_empty()
        && lead.len() <= 3
        && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Normalize an amount to two decimals, or keep the raw text.
pub fn normalize_amount(raw: &str) -> String {
    match parse_amount(raw) {
        Some(v) => format!("{:.2}", v),
        None => raw.trim().to_string(),
    }
}

/// IBANs are printed in groups of four; drop the spacing.
pub fn normalize_iban(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

pub fn normalize_bic(raw: &str) -> String {
    raw.trim().to_uppercase()
}
