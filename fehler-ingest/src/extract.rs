//! PDF text extraction backed by `pdf-extract`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use crate::types::{ExtractError, TextSource, clean_lines};

/// Reads digital PDFs with an embedded text layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextSource;

impl PdfTextSource {
    /// Extract lines from PDF bytes already in memory.
    pub fn extract_bytes(&self, path: &Path, bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
        // pdf-extract panics on some malformed files instead of returning an error.
        let pages = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| ExtractError::Pdf {
            path: path.to_path_buf(),
            reason: "extractor panicked".to_string(),
        })?
        .map_err(|e| ExtractError::Pdf {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        log::debug!("{}: {} page(s)", path.display(), pages.len());

        Ok(pages.iter().flat_map(|page| clean_lines(page)).collect())
    }
}

impl TextSource for PdfTextSource {
    fn extract(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let lines = self.extract_bytes(path, &bytes)?;
        log::debug!("{}: extracted {} line(s)", path.display(), lines.len());
        Ok(lines)
    }
}
