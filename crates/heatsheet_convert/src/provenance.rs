//! Authoring-application detection.

use std::path::Path;

use heatsheet_templates::DocxPackage;
use tracing::debug;

/// Application recorded in a document's `docProps/app.xml`.
///
/// Unreadable documents and documents without the part yield `None`.
pub fn document_application(document: &Path) -> Option<String> {
    match DocxPackage::open(document) {
        Ok(package) => package.application(),
        Err(e) => {
            debug!("Cannot read application of {:?}: {}", document, e);
            None
        }
    }
}

/// Whether `document` was authored by an application whose name contains `needle`.
pub fn created_by(document: &Path, needle: &str) -> bool {
    document_application(document).is_some_and(|app| app.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatsheet_templates::document::document_xml_from_body;
    use tempfile::tempdir;

    #[test]
    fn test_created_by() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("doc.docx");
        DocxPackage::from_document_xml(&document_xml_from_body(""))
            .with_application("LibreOffice/7.6.4.1$Linux_X86_64")
            .save(&path)
            .unwrap();

        assert!(created_by(&path, "LibreOffice"));
        assert!(!created_by(&path, "Microsoft Office Word"));
    }

    #[test]
    fn test_unreadable_document() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.docx");
        std::fs::write(&path, b"not a zip").unwrap();

        assert_eq!(document_application(&path), None);
        assert!(!created_by(&path, "LibreOffice"));
    }
}
