//! Template discovery and validation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::engine::SubstitutionEngine;
use crate::error::{TemplateError, TemplateResult};
use crate::placeholders::SupportedKeys;

/// Report produced by [`TemplateLoader::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateValidation {
    pub path: PathBuf,
    /// Number of token occurrences found.
    pub tokens: usize,
    /// Tokens that are not aliases of any key.
    pub unknown: Vec<String>,
    /// Tokens whose key the document kind cannot fill.
    pub unsupported: Vec<String>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl TemplateValidation {
    pub fn is_valid(&self) -> bool {
        self.unknown.is_empty() && self.unsupported.is_empty()
    }

    /// Human-readable list of every finding.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.unknown.iter().map(|t| format!("Unknown placeholder: {}", t)));
        issues.extend(
            self.unsupported
                .iter()
                .map(|t| format!("Placeholder not supported by this document: {}", t)),
        );
        issues.extend(self.warnings.iter().cloned());
        issues
    }
}

/// Template loader.
pub struct TemplateLoader {
    templates_path: PathBuf,
}

impl TemplateLoader {
    /// Create a new template loader.
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        Self {
            templates_path: templates_path.into(),
        }
    }

    pub fn templates_path(&self) -> &Path {
        &self.templates_path
    }

    /// Resolve a template file name against the templates directory.
    ///
    /// `Path::join` replaces the base when `file` is absolute, so absolute
    /// paths come back unchanged.
    pub fn template_path(&self, file: impl AsRef<Path>) -> PathBuf {
        self.templates_path.join(file)
    }

    /// List every `.docx` file below the templates directory.
    pub fn list(&self) -> TemplateResult<Vec<PathBuf>> {
        if !self.templates_path.exists() {
            warn!("Templates directory does not exist: {:?}", self.templates_path);
            return Ok(Vec::new());
        }

        let mut templates: Vec<PathBuf> = WalkDir::new(&self.templates_path)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_template_file(p))
            .collect();
        templates.sort();

        info!("Found {} template(s) in {:?}", templates.len(), self.templates_path);
        Ok(templates)
    }

    /// Check a template's placeholders against the keys a document kind can fill.
    ///
    /// A token is supported only if its exact slot form is: `%Name2%` needs a
    /// slotted `Name`, `%Name%` a plain one. `table_mode` states whether the
    /// document renders its items as table rows.
    pub fn validate(
        &self,
        path: &Path,
        engine: &SubstitutionEngine,
        supported: &SupportedKeys,
        table_mode: bool,
    ) -> TemplateResult<TemplateValidation> {
        if !path.is_file() {
            return Err(TemplateError::NotFound(path.to_path_buf()));
        }
        debug!("Validating template {:?}", path);

        let tokens = engine.scan_template(path)?;
        let mut unknown = BTreeSet::new();
        let mut unsupported = BTreeSet::new();
        let mut warnings = BTreeSet::new();

        for token in &tokens {
            let literal = engine.placeholder(&token.literal);
            if token.row_index {
                if !table_mode {
                    warnings.insert(format!(
                        "{} only has a value in table documents",
                        literal
                    ));
                } else if !token.in_table {
                    warnings.insert(format!("{} appears outside any table", literal));
                }
                continue;
            }

            match token.resolved {
                None => {
                    unknown.insert(literal);
                }
                Some(slot) if !supported.supports(&slot) => {
                    unsupported.insert(literal);
                }
                Some(_) => {}
            }
        }

        if table_mode && !tokens.iter().any(|t| t.in_table) {
            warnings.insert("No placeholders inside a table; no rows will be generated".to_string());
        }

        let validation = TemplateValidation {
            path: path.to_path_buf(),
            tokens: tokens.len(),
            unknown: unknown.into_iter().collect(),
            unsupported: unsupported.into_iter().collect(),
            warnings: warnings.into_iter().collect(),
        };

        if !validation.is_valid() {
            warn!(
                "Template {:?} has {} unknown and {} unsupported placeholder(s)",
                path,
                validation.unknown.len(),
                validation.unsupported.len()
            );
        }
        Ok(validation)
    }
}

fn is_template_file(path: &Path) -> bool {
    let is_docx = path
        .extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("docx"));
    // Word keeps `~$name.docx` lock files next to open documents.
    let is_lock = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with("~$"));
    is_docx && !is_lock
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{document_xml_from_body, DocxPackage};
    use crate::engine::SubstitutionOptions;
    use crate::placeholders::{PlaceholderKey, PlaceholderRegistry};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn engine() -> SubstitutionEngine {
        let registry = Arc::new(PlaceholderRegistry::with_defaults().unwrap());
        SubstitutionEngine::new(registry, SubstitutionOptions::default()).unwrap()
    }

    fn write_template(path: &Path, body: &str) {
        DocxPackage::from_document_xml(&document_xml_from_body(body))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_loader_empty_dir() {
        let temp = tempdir().unwrap();
        let loader = TemplateLoader::new(temp.path());
        assert!(loader.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_lock_files() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("nested")).unwrap();
        write_template(&temp.path().join("b.docx"), "");
        write_template(&temp.path().join("nested/a.DOCX"), "");
        std::fs::write(temp.path().join("~$b.docx"), b"lock").unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"x").unwrap();

        let loader = TemplateLoader::new(temp.path());
        let names: Vec<String> = loader
            .list()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["b.docx", "a.DOCX"]);
    }

    #[test]
    fn test_validate_reports_unknown_and_unsupported() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("certificates.docx");
        write_template(
            &path,
            "<w:p><w:r><w:t>%Name% %Bogus% %Lane% %ID%</w:t></w:r></w:p>",
        );

        let loader = TemplateLoader::new(temp.path());
        let report = loader
            .validate(&path, &engine(), &SupportedKeys::new([PlaceholderKey::Name]), false)
            .unwrap();

        assert!(!report.is_valid());
        assert_eq!(report.tokens, 4);
        assert_eq!(report.unknown, vec!["%Bogus%"]);
        assert_eq!(report.unsupported, vec!["%Lane%"]);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_validate_table_mode_without_table() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("result-list.docx");
        write_template(&path, "<w:p><w:r><w:t>%Name%</w:t></w:r></w:p>");

        let report = TemplateLoader::new(temp.path())
            .validate(&path, &engine(), &SupportedKeys::new([PlaceholderKey::Name]), true)
            .unwrap();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_validate_missing_file() {
        let temp = tempdir().unwrap();
        let loader = TemplateLoader::new(temp.path());
        let result = loader.validate(
            &temp.path().join("nope.docx"),
            &engine(),
            &SupportedKeys::default(),
            false,
        );
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_validate_checks_slot_form() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("race-cards.docx");
        write_template(
            &path,
            "<w:p><w:r><w:t>%RaceNumber%: %Name1% %Name% %Club2%</w:t></w:r></w:p>",
        );
        let supported = SupportedKeys::new([PlaceholderKey::RaceNumber])
            .with_slotted([PlaceholderKey::Name, PlaceholderKey::Club]);

        let report = TemplateLoader::new(temp.path())
            .validate(&path, &engine(), &supported, false)
            .unwrap();
        assert_eq!(report.unsupported, vec!["%Name%"]);

        write_template(&path, "<w:p><w:r><w:t>%Name% %Name2%</w:t></w:r></w:p>");
        let report = TemplateLoader::new(temp.path())
            .validate(&path, &engine(), &SupportedKeys::new([PlaceholderKey::Name]), false)
            .unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.unsupported, vec!["%Name2%"]);
    }

    #[test]
    fn test_template_path_keeps_absolute_paths() {
        let temp = tempdir().unwrap();
        let loader = TemplateLoader::new(temp.path().join("templates"));
        let absolute = temp.path().join("elsewhere").join("urkunde.docx");

        assert_eq!(loader.template_path(&absolute), absolute);
        assert_eq!(
            loader.template_path("urkunde.docx"),
            temp.path().join("templates").join("urkunde.docx")
        );
    }
}
