//! Converter selection.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ConversionConfig;
use crate::converter::{ConversionOutcome, DocumentConverter, OutputFormat};
use crate::error::{ConvertError, ConvertResult};
use crate::libreoffice::LibreOfficeConverter;
use crate::word::WordConverter;

/// Probe results for one converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConverterStatus {
    pub name: String,
    pub available: bool,
    /// Provenance probe result, when a document was given.
    pub created_document: Option<bool>,
}

/// Picks a converter for a document.
///
/// Declaration order is the fallback preference. No availability or
/// provenance result is cached between calls.
#[derive(Clone)]
pub struct ConverterSelector {
    converters: Vec<Arc<dyn DocumentConverter>>,
}

impl ConverterSelector {
    pub fn new(converters: Vec<Arc<dyn DocumentConverter>>) -> Self {
        Self { converters }
    }

    /// Word first, then LibreOffice.
    pub fn standard(libreoffice: LibreOfficeConverter) -> Self {
        Self::new(vec![
            Arc::new(WordConverter::new()),
            Arc::new(libreoffice),
        ])
    }

    pub fn converters(&self) -> &[Arc<dyn DocumentConverter>] {
        &self.converters
    }

    /// Names of all configured converters.
    pub fn names(&self) -> Vec<String> {
        self.converters.iter().map(|c| c.name().to_string()).collect()
    }

    /// Choose a converter for `document`.
    ///
    /// Only available converters not named in `ignore` qualify. One whose
    /// application authored the document wins; otherwise the first qualifying
    /// converter is used. Returns `None` when nothing qualifies.
    pub fn select(&self, document: &Path, ignore: &[String]) -> Option<Arc<dyn DocumentConverter>> {
        let candidates: Vec<&Arc<dyn DocumentConverter>> = self
            .converters
            .iter()
            .filter(|c| !is_ignored(c.name(), ignore))
            .filter(|c| {
                let available = c.is_available();
                if !available {
                    debug!("Converter {} is not available", c.name());
                }
                available
            })
            .collect();

        if let Some(native) = candidates
            .iter()
            .find(|c| c.is_document_created_by(document))
        {
            debug!("{:?} was created by {}", document, native.name());
            return Some(Arc::clone(native));
        }

        candidates.first().map(|c| Arc::clone(c))
    }

    /// Select a converter and run it.
    pub async fn convert(
        &self,
        input: &Path,
        output: &Path,
        format: OutputFormat,
        config: &ConversionConfig,
        ignore: &[String],
    ) -> ConvertResult<ConversionOutcome> {
        let Some(converter) = self.select(input, ignore) else {
            warn!("No converter available for {:?} (ignored: {:?})", input, ignore);
            return Err(ConvertError::NoConverterAvailable);
        };

        info!("Using converter: {}", converter.name());
        converter.convert(input, output, format, config).await
    }

    /// Probe every converter, optionally against a document.
    pub fn statuses(&self, document: Option<&Path>) -> Vec<ConverterStatus> {
        self.converters
            .iter()
            .map(|c| ConverterStatus {
                name: c.name().to_string(),
                available: c.is_available(),
                created_document: document.map(|d| c.is_document_created_by(d)),
            })
            .collect()
    }
}

impl std::fmt::Debug for ConverterSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterSelector")
            .field("converters", &self.names())
            .finish()
    }
}

fn is_ignored(name: &str, ignore: &[String]) -> bool {
    ignore.iter().any(|i| i.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockConverter;

    fn selector(converters: &[&MockConverter]) -> ConverterSelector {
        ConverterSelector::new(
            converters
                .iter()
                .map(|c| Arc::new((*c).clone()) as Arc<dyn DocumentConverter>)
                .collect(),
        )
    }

    #[test]
    fn test_first_available_in_declaration_order() {
        let a = MockConverter::new("a").set_available(false);
        let b = MockConverter::new("b");
        let c = MockConverter::new("c");
        let selected = selector(&[&a, &b, &c]).select(Path::new("doc.docx"), &[]);
        assert_eq!(selected.map(|s| s.name().to_string()).as_deref(), Some("b"));
    }

    #[test]
    fn test_provenance_wins() {
        let a = MockConverter::new("a");
        let b = MockConverter::new("b").set_created_by(true);
        let selected = selector(&[&a, &b]).select(Path::new("doc.docx"), &[]);
        assert_eq!(selected.map(|s| s.name().to_string()).as_deref(), Some("b"));
    }

    #[test]
    fn test_unavailable_author_is_skipped() {
        let a = MockConverter::new("a");
        let b = MockConverter::new("b").set_created_by(true).set_available(false);
        let selected = selector(&[&a, &b]).select(Path::new("doc.docx"), &[]);
        assert_eq!(selected.map(|s| s.name().to_string()).as_deref(), Some("a"));
    }

    #[test]
    fn test_ignore_set() {
        let a = MockConverter::new("a").set_created_by(true);
        let b = MockConverter::new("b");
        let selector = selector(&[&a, &b]);

        let selected = selector.select(Path::new("doc.docx"), &["A".to_string()]);
        assert_eq!(selected.map(|s| s.name().to_string()).as_deref(), Some("b"));

        let none = selector.select(Path::new("doc.docx"), &["a".to_string(), "b".to_string()]);
        assert!(none.is_none());
    }

    #[test]
    fn test_availability_is_not_cached() {
        let a = MockConverter::new("a");
        let selector = selector(&[&a]);
        assert!(selector.select(Path::new("doc.docx"), &[]).is_some());

        a.toggle_available(false);
        assert!(selector.select(Path::new("doc.docx"), &[]).is_none());
    }

    #[test]
    fn test_statuses() {
        let a = MockConverter::new("a").set_available(false);
        let b = MockConverter::new("b").set_created_by(true);
        let statuses = selector(&[&a, &b]).statuses(Some(Path::new("doc.docx")));

        assert_eq!(statuses.len(), 2);
        assert!(!statuses[0].available);
        assert_eq!(statuses[1].created_document, Some(true));
    }
}
