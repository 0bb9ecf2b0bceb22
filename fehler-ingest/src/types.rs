use std::path::{Path, PathBuf};

/// Errors raised while turning a source document into text lines
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a readable PDF: {reason}", path.display())]
    Pdf { path: PathBuf, reason: String },
}

/// Anything that can produce the ordered text lines of a document.
///
/// Lines are trimmed and never empty; pages are concatenated in order.
pub trait TextSource {
    fn extract(&self, path: &Path) -> Result<Vec<String>, ExtractError>;
}

/// Split raw page text into trimmed, non-empty lines.
pub fn clean_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}
