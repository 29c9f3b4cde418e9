//! Microsoft Word backend (Windows only).
//!
//! Word is driven through COM automation from a short PowerShell script.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::info;

use crate::config::ConversionConfig;
use crate::converter::{ConversionOutcome, DocumentConverter, OutputFormat};
use crate::error::{ConvertError, ConvertResult};
use crate::process::{move_into_place, run_process, work_dir};
use crate::provenance;

/// Substring of `<Application>` in documents Word saved.
pub const WORD_APPLICATION: &str = "Microsoft Office Word";

const CONVERT_SCRIPT: &str = r#"param([string]$InputPath, [string]$OutputPath, [int]$Format)
$ErrorActionPreference = 'Stop'
$word = New-Object -ComObject Word.Application
$word.Visible = $false
$word.DisplayAlerts = 0
try {
    $doc = $word.Documents.Open($InputPath, $false, $true)
    try {
        $doc.SaveAs2($OutputPath, $Format)
    } finally {
        $doc.Close(0)
    }
} finally {
    $word.Quit()
    [void][System.Runtime.InteropServices.Marshal]::ReleaseComObject($word)
}
"#;

/// `WdSaveFormat` value for a target format.
pub fn word_format_code(format: OutputFormat) -> i32 {
    match format {
        OutputFormat::Pdf => 17,
        OutputFormat::Odt => 23,
        OutputFormat::Html => 8,
        OutputFormat::Docx => 16,
    }
}

/// Converter driving an installed Microsoft Word.
#[derive(Debug, Clone, Default)]
pub struct WordConverter;

impl WordConverter {
    pub fn new() -> Self {
        Self
    }

    fn is_registered() -> bool {
        std::process::Command::new("reg")
            .args(["query", r"HKCR\Word.Application\CurVer"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl DocumentConverter for WordConverter {
    fn name(&self) -> &str {
        "word"
    }

    fn is_available(&self) -> bool {
        cfg!(windows) && Self::is_registered()
    }

    fn is_document_created_by(&self, document: &Path) -> bool {
        provenance::created_by(document, WORD_APPLICATION)
    }

    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        config: &ConversionConfig,
    ) -> ConvertResult<ConversionOutcome> {
        if !input.is_file() {
            return Err(ConvertError::InputNotFound(input.to_path_buf()));
        }
        if !self.is_available() {
            return Err(ConvertError::ConverterNotAvailable(self.name().to_string()));
        }

        let work = work_dir()?;
        let script = work.path().join("convert.ps1");
        std::fs::write(&script, CONVERT_SCRIPT)?;
        let produced = work.path().join(format!("converted.{}", format.extension()));
        let input = std::path::absolute(input)?;

        info!("Converting {:?} to {} with Word", input, format);
        let started_at = Utc::now();

        let mut command = Command::new("powershell");
        command
            .args(["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-File"])
            .arg(&script)
            .arg(&input)
            .arg(&produced)
            .arg(word_format_code(format).to_string());
        let result = run_process(self.name(), command, config.timeout_seconds).await?;

        if !result.success() {
            return Err(ConvertError::ConversionFailed {
                converter: self.name().to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr.trim().to_string(),
            });
        }
        if !produced.is_file() {
            return Err(ConvertError::OutputMissing {
                converter: self.name().to_string(),
                expected: produced,
            });
        }

        move_into_place(&produced, output)?;
        Ok(ConversionOutcome::finish(
            self.name(),
            output,
            format,
            result.exit_code,
            started_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_codes() {
        assert_eq!(word_format_code(OutputFormat::Pdf), 17);
        assert_eq!(word_format_code(OutputFormat::Docx), 16);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_unavailable_off_windows() {
        assert!(!WordConverter::new().is_available());
    }
}
