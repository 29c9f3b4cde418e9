//! Converter trait and types.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConversionConfig;
use crate::error::ConvertResult;

/// Target format of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    Odt,
    Html,
    Docx,
}

impl OutputFormat {
    pub fn all() -> &'static [OutputFormat] {
        &[
            OutputFormat::Pdf,
            OutputFormat::Odt,
            OutputFormat::Html,
            OutputFormat::Docx,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Odt => "odt",
            Self::Html => "html",
            Self::Docx => "docx",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "odt" => Some(Self::Odt),
            "html" | "htm" => Some(Self::Html),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// File extension of converted files.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Guess the format from an output path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_str)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// Name of the converter that ran
    pub converter: String,
    /// Final location of the converted file
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Exit code of the external process
    pub exit_code: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ConversionOutcome {
    pub(crate) fn finish(
        converter: &str,
        output: &Path,
        format: OutputFormat,
        exit_code: i64,
        started_at: DateTime<Utc>,
    ) -> Self {
        let finished_at = Utc::now();
        Self {
            converter: converter.to_string(),
            output: output.to_path_buf(),
            format,
            exit_code,
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
        }
    }
}

/// An external tool able to turn a `.docx` into another format.
///
/// Probes are evaluated on every call and never cached.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Stable name used in logs and ignore lists.
    fn name(&self) -> &str;

    /// Whether the tool is installed right now.
    fn is_available(&self) -> bool;

    /// Whether the tool's application authored `document`.
    fn is_document_created_by(&self, document: &Path) -> bool;

    /// Convert `input` to `format`, placing the result at `output`.
    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        config: &ConversionConfig,
    ) -> ConvertResult<ConversionOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str("PDF"), Some(OutputFormat::Pdf));
        assert_eq!(OutputFormat::from_str("htm"), Some(OutputFormat::Html));
        assert_eq!(OutputFormat::from_str("rtf"), None);
        assert_eq!(
            OutputFormat::from_path(Path::new("out/list.odt")),
            Some(OutputFormat::Odt)
        );
        for format in OutputFormat::all() {
            assert_eq!(OutputFormat::from_str(format.as_str()), Some(*format));
        }
    }
}
