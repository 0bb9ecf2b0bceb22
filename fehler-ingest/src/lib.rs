//! fehler-ingest: PDF text extraction, the Fehlerreport parser and filename conventions.

pub mod types;
pub mod extract;
pub mod filename;
pub mod parsers;
pub mod report;

pub use types::{TextSource, ExtractError};
pub use extract::PdfTextSource;
pub use filename::{FilenameHints, resolve_filename};
pub use parsers::fehlerreport::{FehlerreportParser, ParsedReport, TableRow};
pub use report::{build_records, records_from_lines};
