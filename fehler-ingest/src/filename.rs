//! Metadata encoded in report filenames.
//!
//! Reports are named like `ARMANDA_Fehlerreport_20250315.pdf`; rows inside a
//! report reference debit files such as `PPS_DB_15new_20250301.xml`. Both
//! carry a `YYYYMMDD` date token, and product files carry an amount code.

use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use fehler_core::ConversionRules;

/// Values recovered from a filename. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilenameHints {
    pub date: Option<NaiveDate>,
    pub amount: Option<String>,
}

fn date_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(20\d{6})").expect("static pattern"))
}

fn product_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{2})new").expect("static pattern"))
}

fn base_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
}

/// Decode the first `20YYMMDD` token.
pub fn date_from_filename(name: &str) -> Option<NaiveDate> {
    let caps = date_token_re().captures(base_name(name))?;
    NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok()
}

/// Explicit prefixes first, then the two-digit `NNnew` product code.
pub fn amount_from_filename(name: &str, rules: &ConversionRules) -> Option<String> {
    let name = base_name(name);
    if let Some(amount) = rules.amount_for_prefix(name) {
        return Some(amount.to_string());
    }
    let caps = product_code_re().captures(name)?;
    rules.amount_for_code(&caps[1]).map(str::to_string)
}

pub fn resolve_filename(name: &str, rules: &ConversionRules) -> FilenameHints {
    FilenameHints {
        date: date_from_filename(name),
        amount: amount_from_filename(name, rules),
    }
}
