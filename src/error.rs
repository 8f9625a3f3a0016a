//! Error types for table ingestion.
//!
//! Only the normalizer and the remote-sheet path can fail. Classification,
//! chart suggestion, color resolution and dataset mapping are total.

/// Hint shown alongside fetch failures; private sheets answer with a login page or 4xx.
pub const PUBLIC_SHEET_HINT: &str =
    "make sure the sheet is shared publicly (\"Anyone with the link can view\")";

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("failed to parse table: {message}")]
    Parse { message: String },

    #[error("unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("failed to fetch {url}: {message}")]
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NormalizeError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Human-readable remedy for the caller to surface, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Fetch { .. } => Some(PUBLIC_SHEET_HINT),
            _ => None,
        }
    }
}

impl From<csv::Error> for NormalizeError {
    fn from(e: csv::Error) -> Self {
        let message = match e.position() {
            Some(pos) => format!("line {}: {}", pos.line(), e),
            None => e.to_string(),
        };
        Self::Parse { message }
    }
}

impl From<calamine::Error> for NormalizeError {
    fn from(e: calamine::Error) -> Self {
        Self::Parse {
            message: format!("spreadsheet: {e}"),
        }
    }
}
