//! Conversion rules: defaults and lookup tables applied while assembling rows.
//!
//! Everything here is data. The built-in values describe the
//! PPS / ARMANDA / NETRON reports; a config file can replace or extend them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::header::Field;

pub const DEFAULT_STATUS: &str = "REJECTED";
pub const DEFAULT_MERCHANT: &str = "PPS Perfunctio Payment Services GmbH";

/// Product amounts keyed by filename conventions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProductAmounts {
    /// Filename prefix -> amount. The longest matching prefix wins.
    pub by_prefix: BTreeMap<String, String>,
    /// Two-digit product code (as in `15new`) -> amount.
    pub by_code: BTreeMap<String, String>,
}

impl Default for ProductAmounts {
    fn default() -> Self {
        let by_prefix = [
            ("PPS_DB_VPLUS1new", "54.90"),
            ("PPS_DB_VPLUS2new", "39.90"),
            ("PPS_DB_VPLUS3", "39.90"),
        ];
        let by_code = [("35", "39.90"), ("15", "54.90"), ("25", "54.90")];
        Self {
            by_prefix: by_prefix
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            by_code: by_code
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Defaults and tables used by the parser and the row assembler
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionRules {
    /// STATUS for rows whose document carries none
    pub status: String,
    /// MERCHANT for rows whose document carries none
    pub merchant: String,
    /// ERROR CODE -> ERROR REASON
    pub error_reasons: BTreeMap<String, String>,
    pub product_amounts: ProductAmounts,
    /// Extra text labels, e.g. `"Kontoinhaber:" = "CUSTOMER NAME"`.
    pub labels: BTreeMap<String, Field>,
}

impl Default for ConversionRules {
    fn default() -> Self {
        let mut error_reasons = BTreeMap::new();
        error_reasons.insert("KC2-BL001".to_string(), "User in the Blacklist".to_string());

        Self {
            status: DEFAULT_STATUS.to_string(),
            merchant: DEFAULT_MERCHANT.to_string(),
            error_reasons,
            product_amounts: ProductAmounts::default(),
            labels: BTreeMap::new(),
        }
    }
}

impl ConversionRules {
    pub fn error_reason(&self, code: &str) -> Option<&str> {
        self.error_reasons.get(code.trim()).map(String::as_str)
    }

    pub fn amount_for_prefix(&self, filename: &str) -> Option<&str> {
        self.product_amounts
            .by_prefix
            .iter()
            .filter(|(prefix, _)| filename.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, amount)| amount.as_str())
    }

    pub fn amount_for_code(&self, code: &str) -> Option<&str> {
        self.product_amounts.by_code.get(code).map(String::as_str)
    }
}
