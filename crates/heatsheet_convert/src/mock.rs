//! Mock converter for testing.
//!
//! Provides a configurable implementation of the DocumentConverter trait
//! for use in tests without an office suite installed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::config::ConversionConfig;
use crate::converter::{ConversionOutcome, DocumentConverter, OutputFormat};
use crate::error::{ConvertError, ConvertResult};

/// Predefined mock response for a conversion.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i64,
    pub stderr: String,
    /// Whether the converted file is written.
    pub write_output: bool,
}

impl MockResponse {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            stderr: String::new(),
            write_output: true,
        }
    }

    pub fn failure(exit_code: i64, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stderr: stderr.into(),
            write_output: false,
        }
    }

    /// Exit successfully without producing a file.
    pub fn missing_output() -> Self {
        Self {
            exit_code: 0,
            stderr: String::new(),
            write_output: false,
        }
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub method: String,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
}

impl CapturedCall {
    fn probe(method: &str, document: Option<&Path>) -> Self {
        Self {
            method: method.to_string(),
            input: document.map(Path::to_path_buf),
            output: None,
            format: None,
        }
    }
}

/// Mock converter for testing.
///
/// Clones share state, so a test can keep a handle while the selector owns
/// another.
#[derive(Clone)]
pub struct MockConverter {
    name: String,
    available: Arc<RwLock<bool>>,
    created_by: Arc<RwLock<bool>>,
    responses: Arc<RwLock<Vec<MockResponse>>>,
    response_index: Arc<AtomicUsize>,
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Simulated failure to return (as a spawn failure message).
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl MockConverter {
    /// Create an available mock converter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            available: Arc::new(RwLock::new(true)),
            created_by: Arc::new(RwLock::new(false)),
            responses: Arc::new(RwLock::new(Vec::new())),
            response_index: Arc::new(AtomicUsize::new(0)),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Set whether the converter is available.
    pub fn set_available(self, available: bool) -> Self {
        self.toggle_available(available);
        self
    }

    /// Change availability on a shared handle.
    pub fn toggle_available(&self, available: bool) {
        *self.available.write() = available;
    }

    /// Set whether the provenance probe recognizes every document.
    pub fn set_created_by(self, created_by: bool) -> Self {
        *self.created_by.write() = created_by;
        self
    }

    /// Add a mock response for the next convert call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Set multiple responses.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses;
        self
    }

    /// Set a failure to simulate.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Clear all captured calls.
    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Check if a specific method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.captured_calls
            .read()
            .iter()
            .any(|c| c.method == method)
    }

    /// Get calls to a specific method.
    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    fn record_call(&self, call: CapturedCall) {
        self.captured_calls.write().push(call);
    }

    /// Get the next response; responses cycle once exhausted.
    fn next_response(&self) -> MockResponse {
        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success();
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(MockResponse::success)
    }

    fn check_failure(&self) -> ConvertResult<()> {
        if let Some(message) = self.simulate_failure.read().clone() {
            return Err(ConvertError::SpawnFailed {
                converter: self.name.clone(),
                message,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentConverter for MockConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.record_call(CapturedCall::probe("is_available", None));
        *self.available.read()
    }

    fn is_document_created_by(&self, document: &Path) -> bool {
        self.record_call(CapturedCall::probe("is_document_created_by", Some(document)));
        *self.created_by.read()
    }

    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        _config: &ConversionConfig,
    ) -> ConvertResult<ConversionOutcome> {
        self.record_call(CapturedCall {
            method: "convert".to_string(),
            input: Some(input.to_path_buf()),
            output: Some(output.to_path_buf()),
            format: Some(format),
        });

        self.check_failure()?;

        let started_at = Utc::now();
        let response = self.next_response();
        if response.exit_code != 0 {
            return Err(ConvertError::ConversionFailed {
                converter: self.name.clone(),
                exit_code: response.exit_code,
                stderr: response.stderr,
            });
        }
        if !response.write_output {
            return Err(ConvertError::OutputMissing {
                converter: self.name.clone(),
                expected: output.to_path_buf(),
            });
        }

        std::fs::write(
            output,
            format!("converted by {} to {}", self.name, format),
        )?;
        Ok(ConversionOutcome::finish(&self.name, output, format, 0, started_at))
    }
}
