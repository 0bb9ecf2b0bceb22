//! Vendor-specific document parsers.

pub mod fehlerreport;
