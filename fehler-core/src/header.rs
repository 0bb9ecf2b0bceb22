//! The fixed 19-column schema every output CSV is written in.
//!
//! The header text is bit-exact and shared by the converter and the fixer.

use serde::{Deserialize, Serialize};

pub const FIELD_COUNT: usize = 19;

/// Canonical header, in column order.
pub const CSV_HEADER: [&str; FIELD_COUNT] = [
    "STATUS",
    "END TO END ID",
    "MERCHANT",
    "AMOUNT",
    "DUE DATE",
    "CUSTOMER BIC",
    "CUSTOMER IBAN",
    "CUSTOMER NAME",
    "CUSTOMER ID",
    "ADDITIONAL INFO 1",
    "ADDITIONAL INFO 2",
    "IMPORTED DATE",
    "MANDATE REFERENCE",
    "TRANSACTION INFORMATION",
    "TRANSACTION TYPE NAME",
    "ERROR CODE",
    "ERROR REASON",
    "MERCHANT PRODUCT NAME",
    "HAS CHARGEBACK",
];

/// One column of the canonical header. The discriminant is the column index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    #[serde(rename = "STATUS")]
    Status = 0,
    #[serde(rename = "END TO END ID")]
    EndToEndId,
    #[serde(rename = "MERCHANT")]
    Merchant,
    #[serde(rename = "AMOUNT")]
    Amount,
    #[serde(rename = "DUE DATE")]
    DueDate,
    #[serde(rename = "CUSTOMER BIC")]
    CustomerBic,
    #[serde(rename = "CUSTOMER IBAN")]
    CustomerIban,
    #[serde(rename = "CUSTOMER NAME")]
    CustomerName,
    #[serde(rename = "CUSTOMER ID")]
    CustomerId,
    #[serde(rename = "ADDITIONAL INFO 1")]
    AdditionalInfo1,
    #[serde(rename = "ADDITIONAL INFO 2")]
    AdditionalInfo2,
    #[serde(rename = "IMPORTED DATE")]
    ImportedDate,
    #[serde(rename = "MANDATE REFERENCE")]
    MandateReference,
    #[serde(rename = "TRANSACTION INFORMATION")]
    TransactionInformation,
    #[serde(rename = "TRANSACTION TYPE NAME")]
    TransactionTypeName,
    #[serde(rename = "ERROR CODE")]
    ErrorCode,
    #[serde(rename = "ERROR REASON")]
    ErrorReason,
    #[serde(rename = "MERCHANT PRODUCT NAME")]
    MerchantProductName,
    #[serde(rename = "HAS CHARGEBACK")]
    HasChargeback,
}

impl Field {
    /// All fields in header order
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Status,
        Field::EndToEndId,
        Field::Merchant,
        Field::Amount,
        Field::DueDate,
        Field::CustomerBic,
        Field::CustomerIban,
        Field::CustomerName,
        Field::CustomerId,
        Field::AdditionalInfo1,
        Field::AdditionalInfo2,
        Field::ImportedDate,
        Field::MandateReference,
        Field::TransactionInformation,
        Field::TransactionTypeName,
        Field::ErrorCode,
        Field::ErrorReason,
        Field::MerchantProductName,
        Field::HasChargeback,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Header text for this column
    pub fn name(self) -> &'static str {
        CSV_HEADER[self.index()]
    }

    /// Exact lookup by header text.
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Columns holding dates, normalized to `YYYY-MM-DD`.
    pub fn is_date(self) -> bool {
        matches!(self, Field::DueDate | Field::ImportedDate)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
