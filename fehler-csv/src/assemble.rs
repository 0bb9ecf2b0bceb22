//! Map a record onto the canonical columns, applying configured defaults.

use fehler_core::{ConversionRules, FIELD_COUNT, Field, ReportRecord};

/// Produce the 19 output values for `record`, in header order.
///
/// STATUS and MERCHANT fall back to the configured defaults; ERROR REASON
/// is looked up from the error code when the document gave none.
pub fn assemble_row(record: &ReportRecord, rules: &ConversionRules) -> [String; FIELD_COUNT] {
    let mut rec = record.clone();
    rec.fill(Field::Status, &rules.status);
    rec.fill(Field::Merchant, &rules.merchant);
    if let Some(reason) = rules.error_reason(record.get(Field::ErrorCode)) {
        rec.fill(Field::ErrorReason, reason);
    }
    rec.into_values()
}
