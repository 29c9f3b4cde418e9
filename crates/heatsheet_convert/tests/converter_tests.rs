//! Integration tests for converter selection.
//!
//! These tests use mock converters and real `.docx` packages so no office
//! suite needs to be installed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heatsheet_convert::{
    ConversionConfig, ConvertError, ConverterSelector, DocumentConverter, LibreOfficeConverter,
    MockConverter, MockResponse, OutputFormat,
};
use heatsheet_templates::document::document_xml_from_body;
use heatsheet_templates::DocxPackage;
use tempfile::{tempdir, TempDir};

fn selector(converters: &[MockConverter]) -> ConverterSelector {
    ConverterSelector::new(
        converters
            .iter()
            .map(|c| Arc::new(c.clone()) as Arc<dyn DocumentConverter>)
            .collect(),
    )
}

fn docx(temp: &TempDir, name: &str, application: &str) -> PathBuf {
    let path = temp.path().join(name);
    DocxPackage::from_document_xml(&document_xml_from_body(""))
        .with_application(application)
        .save(&path)
        .unwrap();
    path
}

/// Test conversion through the first available converter.
#[tokio::test]
async fn test_selector_converts_with_first_available() {
    let temp = tempdir().unwrap();
    let input = docx(&temp, "list.docx", "heatsheet");
    let output = temp.path().join("list.pdf");

    let offline = MockConverter::new("offline").set_available(false);
    let online = MockConverter::new("online");
    let selector = selector(&[offline.clone(), online.clone()]);

    let outcome = selector
        .convert(&input, &output, OutputFormat::Pdf, &ConversionConfig::default(), &[])
        .await
        .unwrap();

    assert_eq!(outcome.converter, "online");
    assert!(output.is_file());
    assert!(!offline.was_called("convert"));
    assert_eq!(online.get_method_calls("convert").len(), 1);
}

/// Test that a caller can retry with the failed backend ignored.
#[tokio::test]
async fn test_retry_with_ignore_set() {
    let temp = tempdir().unwrap();
    let input = docx(&temp, "list.docx", "heatsheet");
    let output = temp.path().join("list.pdf");
    let config = ConversionConfig::default();

    let flaky = MockConverter::new("flaky").add_response(MockResponse::failure(77, "crashed"));
    let steady = MockConverter::new("steady");
    let selector = selector(&[flaky, steady]);

    let first = selector
        .convert(&input, &output, OutputFormat::Pdf, &config, &[])
        .await;
    let failed = match first {
        Err(ConvertError::ConversionFailed { converter, .. }) => converter,
        other => panic!("expected a conversion failure, got {:?}", other),
    };

    let outcome = selector
        .convert(&input, &output, OutputFormat::Pdf, &config, &[failed])
        .await
        .unwrap();
    assert_eq!(outcome.converter, "steady");

    let exhausted = selector
        .convert(
            &input,
            &output,
            OutputFormat::Pdf,
            &config,
            &["flaky".to_string(), "steady".to_string()],
        )
        .await;
    assert!(matches!(exhausted, Err(ConvertError::NoConverterAvailable)));
}

/// Test that a LibreOffice-authored document prefers the LibreOffice backend.
#[tokio::test]
async fn test_libreoffice_provenance_probe() {
    let temp = tempdir().unwrap();
    let by_libreoffice = docx(&temp, "a.docx", "LibreOffice/24.2.1.2$Linux_X86_64");
    let by_word = docx(&temp, "b.docx", "Microsoft Office Word");

    let converter = LibreOfficeConverter::new();
    assert!(converter.is_document_created_by(&by_libreoffice));
    assert!(!converter.is_document_created_by(&by_word));
    assert!(!converter.is_document_created_by(Path::new("/nonexistent.docx")));
}

/// Test the selector never returns an ignored backend.
#[test]
fn test_selector_never_returns_ignored() {
    let converters: Vec<MockConverter> = ["a", "b", "c"]
        .iter()
        .map(|name| MockConverter::new(*name).set_created_by(*name == "b"))
        .collect();
    let selector = selector(&converters);
    let names = ["a", "b", "c"];

    for mask in 0..8u8 {
        let ignore: Vec<String> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, n)| n.to_string())
            .collect();

        let selected = selector.select(Path::new("doc.docx"), &ignore);
        match selected {
            Some(converter) => assert!(!ignore.iter().any(|i| i == converter.name())),
            None => assert_eq!(ignore.len(), names.len()),
        }
    }
}
