//! LibreOffice backend.
//!
//! Runs `soffice` headless with a throwaway user profile, so conversions do
//! not interfere with (or get blocked by) a running desktop instance.

use std::env;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ConversionConfig;
use crate::converter::{ConversionOutcome, DocumentConverter, OutputFormat};
use crate::error::{ConvertError, ConvertResult};
use crate::process::{move_into_place, run_process, work_dir};
use crate::provenance;

/// Environment variable naming the `soffice` executable.
pub const SOFFICE_ENV: &str = "HEATSHEET_SOFFICE";

/// Substring of `<Application>` in documents LibreOffice saved.
pub const LIBREOFFICE_APPLICATION: &str = "LibreOffice";

const EXECUTABLE_NAMES: &[&str] = &["soffice", "libreoffice"];

#[cfg(windows)]
const INSTALL_PATTERNS: &[&str] = &[
    "C:/Program Files/LibreOffice*/program/soffice.exe",
    "C:/Program Files (x86)/LibreOffice*/program/soffice.exe",
];

#[cfg(target_os = "macos")]
const INSTALL_PATTERNS: &[&str] = &["/Applications/LibreOffice*.app/Contents/MacOS/soffice"];

#[cfg(not(any(windows, target_os = "macos")))]
const INSTALL_PATTERNS: &[&str] = &[
    "/usr/lib/libreoffice/program/soffice",
    "/usr/lib64/libreoffice/program/soffice",
    "/opt/libreoffice*/program/soffice",
    "/snap/bin/libreoffice",
];

/// Converter driving a local LibreOffice installation.
#[derive(Debug, Clone, Default)]
pub struct LibreOfficeConverter {
    executable: Option<PathBuf>,
}

impl LibreOfficeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit `soffice` executable instead of searching for one.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Find the executable: explicit option, environment, `PATH`, then
    /// well-known install locations.
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(explicit) = &self.executable {
            return explicit.is_file().then(|| explicit.clone());
        }

        if let Some(from_env) = env::var_os(SOFFICE_ENV).map(PathBuf::from) {
            if from_env.is_file() {
                return Some(from_env);
            }
            debug!("{} points to a missing file: {:?}", SOFFICE_ENV, from_env);
        }

        Self::search_path().or_else(Self::search_install_locations)
    }

    fn search_path() -> Option<PathBuf> {
        let path = env::var_os("PATH")?;
        env::split_paths(&path).find_map(|dir| {
            EXECUTABLE_NAMES.iter().find_map(|name| {
                let candidate = dir.join(name).with_extension(env::consts::EXE_EXTENSION);
                candidate.is_file().then_some(candidate)
            })
        })
    }

    fn search_install_locations() -> Option<PathBuf> {
        INSTALL_PATTERNS.iter().find_map(|pattern| {
            glob::glob(pattern)
                .ok()?
                .filter_map(Result::ok)
                .find(|candidate| candidate.is_file())
        })
    }

    /// Command-line arguments for one conversion.
    pub fn build_args(
        &self,
        input: &Path,
        out_dir: &Path,
        profile_dir: &Path,
        format: OutputFormat,
    ) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--norestore".to_string(),
            format!("-env:UserInstallation={}", file_url(profile_dir)),
            "--convert-to".to_string(),
            format.extension().to_string(),
            "--outdir".to_string(),
            out_dir.to_string_lossy().to_string(),
            input.to_string_lossy().to_string(),
        ]
    }
}

/// `file://` URL of an absolute path.
fn file_url(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{}", text)
    } else {
        format!("file:///{}", text)
    }
}

#[async_trait]
impl DocumentConverter for LibreOfficeConverter {
    fn name(&self) -> &str {
        "libreoffice"
    }

    fn is_available(&self) -> bool {
        self.locate().is_some()
    }

    fn is_document_created_by(&self, document: &Path) -> bool {
        provenance::created_by(document, LIBREOFFICE_APPLICATION)
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
        let executable = self
            .locate()
            .ok_or_else(|| ConvertError::ConverterNotAvailable(self.name().to_string()))?;

        let work = work_dir()?;
        let out_dir = work.path().join("out");
        let profile_dir = work.path().join("profile");
        std::fs::create_dir(&out_dir)?;

        info!("Converting {:?} to {} with {:?}", input, format, executable);
        let started_at = Utc::now();

        let mut command = Command::new(&executable);
        command.args(self.build_args(input, &out_dir, &profile_dir, format));
        let result = run_process(self.name(), command, config.timeout_seconds).await?;

        if !result.success() {
            return Err(ConvertError::ConversionFailed {
                converter: self.name().to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr.trim().to_string(),
            });
        }

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let produced = out_dir.join(format!("{}.{}", stem, format.extension()));
        if !produced.is_file() {
            return Err(ConvertError::OutputMissing {
                converter: self.name().to_string(),
                expected: produced,
            });
        }

        move_into_place(&produced, output)?;
        let outcome = ConversionOutcome::finish(self.name(), output, format, result.exit_code, started_at);
        info!("Converted {:?} in {}ms", output, outcome.duration_ms);
        Ok(outcome)
    }
}
