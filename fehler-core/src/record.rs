//! Flat report record: one string per canonical column.

use crate::header::{FIELD_COUNT, Field};

/// A single output row before serialization. Missing data is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRecord {
    values: [String; FIELD_COUNT],
}

impl ReportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    /// Overwrite a field. Surrounding whitespace is dropped.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value: String = value.into();
        self.values[field.index()] = value.trim().to_string();
    }

    /// Set a field only if it is still empty and `value` is not.
    /// Returns true when the value was taken.
    pub fn fill(&mut self, field: Field, value: &str) -> bool {
        if !self.is_blank(field) || value.trim().is_empty() {
            return false;
        }
        self.set(field, value);
        true
    }

    pub fn is_blank(&self, field: Field) -> bool {
        self.values[field.index()].is_empty()
    }

    /// Fill every blank field of `self` from `other`.
    pub fn merge_missing(&mut self, other: &ReportRecord) {
        for field in Field::ALL {
            self.fill(field, other.get(field));
        }
    }

    /// Build from positional values. Short input is padded with empty
    /// strings, extra values are ignored.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rec = Self::default();
        for (slot, v) in rec.values.iter_mut().zip(values) {
            *slot = v.into();
        }
        rec
    }

    /// Values in canonical header order.
    pub fn into_values(self) -> [String; FIELD_COUNT] {
        self.values
    }
}
