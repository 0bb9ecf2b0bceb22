//! fehler-core: canonical CSV schema, report records and conversion rules for Fehlerreport exports

pub mod header;
pub mod normalize;
pub mod record;
pub mod rules;

pub use header::{CSV_HEADER, FIELD_COUNT, Field};
pub use normalize::{first_of_month, normalize_amount, normalize_bic, normalize_date, normalize_iban, parse_date};
pub use record::ReportRecord;
pub use rules::{ConversionRules, ProductAmounts};
