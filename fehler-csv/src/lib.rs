//! fehler-csv: canonical row assembly, the semicolon CSV writer and the CSV fixer

pub mod assemble;
pub mod writer;
pub mod fixer;

pub use assemble::assemble_row;
pub use writer::{write_csv, write_rows};
pub use fixer::{FixReport, HeaderMapping, fix_csv, fix_reader};
