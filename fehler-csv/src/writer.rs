//! Semicolon-delimited CSV output with the canonical header.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fehler_core::CSV_HEADER;

/// `;` delimiter, `\n` line ends, quoting only where needed.
pub(crate) fn csv_writer<W: Write>(w: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(w)
}

/// Write the header followed by `rows`.
pub fn write_rows<W, R>(w: W, rows: &[R]) -> Result<()>
where
    W: Write,
    R: AsRef<[String]>,
{
    let mut wtr = csv_writer(w);
    wtr.write_record(CSV_HEADER)?;
    for row in rows {
        wtr.write_record(row.as_ref())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write the CSV into it.
pub fn write_csv<R: AsRef<[String]>>(path: impl AsRef<Path>, rows: &[R]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_rows(BufWriter::new(file), rows).with_context(|| format!("write {}", path.display()))?;
    log::debug!("wrote {} row(s) to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fehler_core::{FIELD_COUNT, Field};

    fn row_with(field: Field, value: &str) -> [String; FIELD_COUNT] {
        let mut row: [String; FIELD_COUNT] = Default::default();
        row[field.index()] = value.to_string();
        row
    }

    #[test]
    fn test_header_only_output() {
        let mut buf = Vec::new();
        write_rows::<_, [String; FIELD_COUNT]>(&mut buf, &[]).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out, format!("{}\n", CSV_HEADER.join(";")));
    }

    #[test]
    fn test_rows_have_nineteen_fields() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[row_with(Field::CustomerName, "Max Mustermann")]).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].split(';').count(), FIELD_COUNT);
        assert!(lines[1].contains("Max Mustermann"));
        assert!(out.ends_with('\n') && !out.contains('\r'));
    }

    #[test]
    fn test_delimiter_and_quotes_are_escaped() {
        let mut buf = Vec::new();
        write_rows(&mut buf, &[row_with(Field::ErrorReason, r#"Konto; "gesperrt""#)]).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains(r#""Konto; ""gesperrt""""#), "got: {out}");
    }

    #[test]
    fn test_write_csv_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content that is much longer than the header\n".repeat(20)).unwrap();

        let rows: [[String; FIELD_COUNT]; 0] = [];
        write_csv(&path, &rows).unwrap();
        let out = std::fs::read_to_string(&path).unwrap();
        assert_eq!(out, format!("{}\n", CSV_HEADER.join(";")));
    }

    #[test]
    fn test_write_csv_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.csv");
        let rows: [[String; FIELD_COUNT]; 0] = [];
        let err = write_csv(&path, &rows).unwrap_err();
        assert!(format!("{err:#}").contains("out.csv"));
    }
}
