//! Convert one PDF or a directory of PDFs, one file at a time.
//!
//! A failing file is logged and counted; it never stops the remaining files.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use fehler_core::ConversionRules;
use fehler_csv::{assemble_row, write_csv};
use fehler_ingest::{FehlerreportParser, TextSource, records_from_lines};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Output CSV (single input only)
    pub out: Option<PathBuf>,
    /// Directory for `<stem>.csv` outputs
    pub out_dir: Option<PathBuf>,
    /// Raw text dump (single input only)
    pub dump_text: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
    pub records: usize,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Converter<'a, S: TextSource> {
    source: &'a S,
    rules: &'a ConversionRules,
    parser: FehlerreportParser,
}

impl<'a, S: TextSource> Converter<'a, S> {
    pub fn new(source: &'a S, rules: &'a ConversionRules) -> Self {
        Self {
            source,
            rules,
            parser: FehlerreportParser::with_rules(rules),
        }
    }

    /// Convert a single PDF into `out`. Returns the number of rows written.
    pub fn convert_file(&self, pdf: &Path, out: &Path, dump_text: Option<&Path>) -> Result<usize> {
        let lines = self.source.extract(pdf)?;

        if let Some(dump) = dump_text {
            fs::write(dump, lines.join("\n")).with_context(|| format!("write {}", dump.display()))?;
            log::info!("Wrote text dump to {}", dump.display());
        }

        let name = pdf.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let records = records_from_lines(&lines, name, &self.parser, self.rules);
        let rows: Vec<_> = records.iter().map(|r| assemble_row(r, self.rules)).collect();

        write_csv(out, &rows)?;
        Ok(rows.len())
    }

    /// Convert `input`, a PDF file or a directory of PDFs.
    pub fn run(&self, input: &Path, opts: &ConvertOptions) -> Result<BatchSummary> {
        if !input.exists() {
            bail!("Input not found: {}", input.display());
        }

        let mut summary = BatchSummary::default();

        if input.is_dir() {
            if opts.out.is_some() || opts.dump_text.is_some() {
                bail!("--out and --dump-text take a single PDF; use --out-dir for directories");
            }
            let out_dir = opts.out_dir.clone().unwrap_or_else(|| input.to_path_buf());
            fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir.display()))?;

            let pdfs = list_pdfs(input)?;
            log::info!("Found {} PDF(s) in {}", pdfs.len(), input.display());
            for pdf in pdfs {
                let out = out_dir.join(csv_name(&pdf));
                let result = self.convert_file(&pdf, &out, None);
                summary.record(pdf, out, result);
            }
        } else {
            let out = match (&opts.out, &opts.out_dir) {
                (Some(out), _) => out.clone(),
                (None, Some(dir)) => {
                    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
                    dir.join(csv_name(input))
                }
                (None, None) => input.with_extension("csv"),
            };
            let result = self.convert_file(input, &out, opts.dump_text.as_deref());
            summary.record(input.to_path_buf(), out, result);
        }

        Ok(summary)
    }
}

impl BatchSummary {
    fn record(&mut self, pdf: PathBuf, out: PathBuf, result: Result<usize>) {
        match result {
            Ok(n) => {
                log::info!("Wrote CSV to {} with {} records", out.display(), n);
                self.records += n;
                self.written.push(out);
            }
            Err(e) => {
                log::error!("{}: {:#}", pdf.display(), e);
                self.failed.push((pdf, e));
            }
        }
    }
}

fn csv_name(pdf: &Path) -> PathBuf {
    PathBuf::from(pdf.file_name().unwrap_or_default()).with_extension("csv")
}

/// `*.pdf` files (any case) directly inside `dir`, sorted by name.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if path.is_file() && is_pdf {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fehler_ingest::{ExtractError, PdfTextSource};

    /// Files starting with `%TEXT` hold their lines in plain text; anything
    /// else goes through the real PDF extractor.
    struct FixtureSource;

    impl TextSource for FixtureSource {
        fn extract(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
            let bytes = fs::read(path).map_err(|source| ExtractError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            match std::str::from_utf8(&bytes).ok().and_then(|s| s.strip_prefix("%TEXT\n")) {
                Some(text) => Ok(text.lines().map(str::to_string).collect()),
                None => PdfTextSource.extract_bytes(path, &bytes),
            }
        }
    }

    const TABLE: &str = "%TEXT\nDateiname Name Kundennummer Fehler\n\
PPS_DB_15new_20250301.xml Max Mustermann 100234 KC2-BL001\n";

    #[test]
    fn test_directory_with_one_corrupt_pdf() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ARMANDA_Fehlerreport_20250301.pdf"), TABLE).unwrap();
        fs::write(dir.path().join("NETRON_Fehlerreport_20250302.PDF"), TABLE).unwrap();
        fs::write(dir.path().join("broken.pdf"), b"not a pdf at all").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let out_dir = dir.path().join("csv");
        let rules = ConversionRules::default();
        let summary = Converter::new(&FixtureSource, &rules)
            .run(
                dir.path(),
                &ConvertOptions {
                    out_dir: Some(out_dir.clone()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(summary.written.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].0.ends_with("broken.pdf"));
        assert!(!summary.is_success());

        assert!(out_dir.join("ARMANDA_Fehlerreport_20250301.csv").exists());
        assert!(out_dir.join("NETRON_Fehlerreport_20250302.csv").exists());
        assert!(!out_dir.join("broken.csv").exists());
    }

    #[test]
    fn test_single_file_defaults_to_sibling_csv() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("ARMANDA_Fehlerreport_20250301.pdf");
        fs::write(&pdf, TABLE).unwrap();
        let dump = dir.path().join("dump.txt");

        let rules = ConversionRules::default();
        let summary = Converter::new(&FixtureSource, &rules)
            .run(
                &pdf,
                &ConvertOptions {
                    dump_text: Some(dump.clone()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.records, 1);

        let csv = fs::read_to_string(dir.path().join("ARMANDA_Fehlerreport_20250301.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("STATUS;END TO END ID;MERCHANT;"));
        assert_eq!(
            lines[1],
            "REJECTED;;PPS Perfunctio Payment Services GmbH;54.90;2025-03-01;;;Max Mustermann;\
100234;;;;;100234-2025-03-01;;KC2-BL001;User in the Blacklist;;"
        );

        let dumped = fs::read_to_string(&dump).unwrap();
        assert!(dumped.starts_with("Dateiname Name Kundennummer Fehler\n"));
    }

    #[test]
    fn test_explicit_out_path() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("report.pdf");
        fs::write(&pdf, TABLE).unwrap();
        let out = dir.path().join("result.csv");

        let rules = ConversionRules::default();
        Converter::new(&FixtureSource, &rules)
            .run(
                &pdf,
                &ConvertOptions {
                    out: Some(out.clone()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(out.exists());
        assert!(!dir.path().join("report.csv").exists());
    }

    #[test]
    fn test_directory_rejects_out_and_dump() {
        let dir = tempfile::tempdir().unwrap();
        let rules = ConversionRules::default();
        let err = Converter::new(&FixtureSource, &rules)
            .run(
                dir.path(),
                &ConvertOptions {
                    out: Some(dir.path().join("x.csv")),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.to_string().contains("--out-dir"));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let rules = ConversionRules::default();
        let err = Converter::new(&FixtureSource, &rules)
            .run(&dir.path().join("nope.pdf"), &ConvertOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("Input not found"));
    }

    #[test]
    fn test_list_pdfs_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "c.csv"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let names: Vec<String> = list_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.PDF", "b.pdf"]);
    }
}
